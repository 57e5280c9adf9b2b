//! State Descriptors
//!
//! The per-key contract: `get`, optional `set`, the events that may
//! invalidate a value, and update-handler factories for monitoring that
//! cannot be named as a plain event.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde::Serialize;

use crate::MediaStateError;
use crate::availability::AvailabilityState;
use crate::device::StreamType;
use crate::event::{MediaEvent, RelevantEvents};
use crate::mediator::VolumeLevel;
use crate::owners::StateOwners;
use crate::tracks::{AudioTrackInfo, ChapterCue, Rendition, TextTrackInfo};

/// Callback handed to update handlers
pub type Notify = Arc<dyn Fn(StateUpdate) + Send + Sync>;

/// What an update handler reports
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    /// Re-derive the key through `get`, passing this signal
    Signal(MediaEvent),
    /// Use this value as-is
    Value(StateValue),
}

/// Cancellation handle returned by an update handler.
///
/// Consumed by `run`, so it can only ever run once.
pub struct Teardown(Box<dyn FnOnce() + Send>);

impl Teardown {
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn run(self) {
        (self.0)()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Teardown")
    }
}

/// Update-handler factory.
///
/// Installing twice is safe; each installation gets its own teardown.
pub type UpdateHandler = fn(Notify, &StateOwners) -> Option<Teardown>;

/// Read side of a state key
pub trait StateDescriptor: Send + Sync + 'static {
    const NAME: &'static str;

    type Value: Into<StateValue>;

    /// Derive the value from the owners' current snapshot
    fn get(&self, owners: &StateOwners, signal: Option<&MediaEvent>) -> Self::Value;

    fn events(&self) -> &'static RelevantEvents {
        &RelevantEvents::NONE
    }

    fn update_handlers(&self) -> &'static [UpdateHandler] {
        &[]
    }
}

/// Write side; only implemented by mutable keys
pub trait MutableState: StateDescriptor {
    type Input;

    /// Issue commands to the owners. Absent owners make this a no-op.
    fn set(&self, value: Self::Input, owners: &StateOwners) -> SetCompletion;
}

type BoxedCompletion = Pin<Box<dyn Future<Output = Result<(), MediaStateError>> + Send + 'static>>;

/// Outcome of a `set`.
///
/// The commands have already been issued when `set` returns. Awaiting the
/// completion surfaces unrecognized host failures; recognized rejections
/// resolve to `Ok`.
#[must_use = "dropping a pending completion abandons its retry path"]
pub struct SetCompletion {
    inner: Option<BoxedCompletion>,
}

impl SetCompletion {
    pub fn done() -> Self {
        Self { inner: None }
    }

    pub fn pending(future: impl Future<Output = Result<(), MediaStateError>> + Send + 'static) -> Self {
        Self { inner: Some(Box::pin(future)) }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.is_some()
    }

    /// Drive to completion on smol's global executor, logging failures
    pub fn detach(self) {
        if let Some(future) = self.inner {
            smol::spawn(async move {
                if let Err(e) = future.await {
                    tracing::warn!("Detached state change failed: {}", e);
                }
            })
            .detach();
        }
    }
}

impl Future for SetCompletion {
    type Output = Result<(), MediaStateError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut().inner.as_mut() {
            Some(future) => future.as_mut().poll(cx),
            None => Poll::Ready(Ok(())),
        }
    }
}

impl fmt::Debug for SetCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetCompletion")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Type-erased state value, for snapshots and generic consumers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Unset,
    Bool(bool),
    Number(f64),
    Text(String),
    StreamType(StreamType),
    VolumeLevel(VolumeLevel),
    Availability(AvailabilityState),
    Range(f64, f64),
    Ranges(Vec<(f64, f64)>),
    TextTracks(Vec<TextTrackInfo>),
    Cues(Vec<ChapterCue>),
    Renditions(Vec<Rendition>),
    AudioTracks(Vec<AudioTrackInfo>),
}

impl StateValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, StateValue::Unset)
    }
}

macro_rules! state_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for StateValue {
                fn from(value: $ty) -> Self {
                    StateValue::$variant(value)
                }
            }
        )*
    };
}

state_value_from! {
    bool => Bool,
    f64 => Number,
    String => Text,
    StreamType => StreamType,
    VolumeLevel => VolumeLevel,
    AvailabilityState => Availability,
    Vec<(f64, f64)> => Ranges,
    Vec<TextTrackInfo> => TextTracks,
    Vec<ChapterCue> => Cues,
    Vec<Rendition> => Renditions,
    Vec<AudioTrackInfo> => AudioTracks,
}

impl From<u32> for StateValue {
    fn from(value: u32) -> Self {
        StateValue::Number(value.into())
    }
}

impl From<(f64, f64)> for StateValue {
    fn from((start, end): (f64, f64)) -> Self {
        StateValue::Range(start, end)
    }
}

impl<T: Into<StateValue>> From<Option<T>> for StateValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StateValue::Unset, Into::into)
    }
}

/// Object-safe view of a descriptor
pub trait ErasedDescriptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn get_value(&self, owners: &StateOwners, signal: Option<&MediaEvent>) -> StateValue;

    fn relevant_events(&self) -> &'static RelevantEvents;

    fn handlers(&self) -> &'static [UpdateHandler];
}

impl<D: StateDescriptor> ErasedDescriptor for D {
    fn name(&self) -> &'static str {
        D::NAME
    }

    fn get_value(&self, owners: &StateOwners, signal: Option<&MediaEvent>) -> StateValue {
        self.get(owners, signal).into()
    }

    fn relevant_events(&self) -> &'static RelevantEvents {
        self.events()
    }

    fn handlers(&self) -> &'static [UpdateHandler] {
        self.update_handlers()
    }
}

/// Registry entry. Only `mutable` entries implement `MutableState`; the
/// erased view offers no setter at all.
#[derive(Clone, Copy)]
pub struct DescriptorEntry {
    pub name: &'static str,
    pub mutable: bool,
    pub descriptor: &'static dyn ErasedDescriptor,
}

impl DescriptorEntry {
    pub fn read_only<D: StateDescriptor>(descriptor: &'static D) -> Self {
        Self {
            name: D::NAME,
            mutable: false,
            descriptor,
        }
    }

    pub fn mutable<D: MutableState>(descriptor: &'static D) -> Self {
        Self {
            name: D::NAME,
            mutable: true,
            descriptor,
        }
    }
}

impl fmt::Debug for DescriptorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorEntry")
            .field("name", &self.name)
            .field("mutable", &self.mutable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_completion_done_is_ready() {
        let completion = SetCompletion::done();
        assert!(!completion.is_pending());
        assert!(smol::block_on(completion).is_ok());
    }

    #[test]
    fn test_completion_pending_surfaces_error() {
        let completion = SetCompletion::pending(async {
            Err(MediaStateError::Device(crate::device::DeviceError::Other("boom".into())))
        });
        assert!(completion.is_pending());
        assert!(smol::block_on(completion).is_err());
    }

    #[test]
    fn test_teardown_runs_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let teardown = Teardown::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        teardown.run();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_state_value_conversions() {
        assert_eq!(StateValue::from(true), StateValue::Bool(true));
        assert_eq!(StateValue::from(Some(2.5)), StateValue::Number(2.5));
        assert_eq!(StateValue::from(None::<String>), StateValue::Unset);
        assert_eq!(StateValue::from((1.0, 2.0)), StateValue::Range(1.0, 2.0));
        assert_eq!(StateValue::from(640u32), StateValue::Number(640.0));
    }

    #[test]
    fn test_state_value_serializes_plainly() {
        let json = serde_json::to_string(&StateValue::from(Some(StreamType::OnDemand))).unwrap();
        assert_eq!(json, "\"on-demand\"");
        assert_eq!(serde_json::to_string(&StateValue::Unset).unwrap(), "null");
        assert_eq!(serde_json::to_string(&StateValue::Range(0.0, 5.5)).unwrap(), "[0.0,5.5]");
    }
}
