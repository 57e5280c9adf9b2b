//! fOS Media State
//!
//! State mediation for media playback UIs. A fixed registry of state keys,
//! each deriving one value from a caller-supplied bundle of owners (playback
//! device, document, fullscreen target, options, preference store), turning
//! UI intents into device commands, and declaring what may invalidate it.
//!
//! The registry is a plain table of descriptors; it holds no state of its
//! own and never subscribes to anything. Callers wire the declared events
//! and install update handlers themselves.

pub mod availability;
pub mod descriptor;
pub mod device;
pub mod event;
pub mod mediator;
pub mod overlay;
pub mod owners;
pub mod platform;
pub mod preferences;
pub mod remote;
pub mod simulated;
pub mod subtitles;
pub mod tracks;

pub use availability::{Availability, AvailabilityState, VolumeSupportProbe, volume_support};
pub use descriptor::{
    DescriptorEntry, ErasedDescriptor, MutableState, Notify, SetCompletion, StateDescriptor,
    StateUpdate, StateValue, Teardown, UpdateHandler,
};
pub use device::{
    DeviceError, DeviceRequest, MediaDevice, PreloadHint, ReadyState, StreamType, TimeRanges,
    Transport,
};
pub use event::{EventListener, EventSource, EventTarget, ListenerId, MediaEvent, RelevantEvents};
pub use mediator::{STATE_MEDIATOR, StateMediator, VolumeLevel};
pub use owners::{MediaOptions, StateOwners, prepare_state_owners};
pub use platform::{FixedPlatform, Platform, platform, set_platform};
pub use preferences::{
    JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore, StorageError, VOLUME_PREF_KEY,
};
pub use remote::{RemotePlayback, RemotePlaybackState};
pub use tracks::{AudioTrackInfo, ChapterCue, Rendition, TextTrackInfo, TextTrackKind, TextTrackMode};

/// Failures surfaced by awaiting a `SetCompletion`
#[derive(Debug, thiserror::Error)]
pub enum MediaStateError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}
