//! Playback Device
//!
//! The contract a playback device fulfils, split into capability groups.
//! Only the core group is mandatory; every other group is reached through an
//! accessor that returns `None` when the device lacks it.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::event::EventTarget;
use crate::overlay::HostElement;
use crate::remote::RemotePlayback;
use crate::tracks::{AudioTrackList, RenditionList, TextTrackList};

/// Ready state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

/// Preload hint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreloadHint {
    None,
    #[default]
    Metadata,
    Auto,
}

/// Stream type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamType {
    Live,
    OnDemand,
    Unknown,
}

impl StreamType {
    /// Whether this value can stand in as a configured default
    pub fn is_definite(self) -> bool {
        matches!(self, StreamType::Live | StreamType::OnDemand)
    }
}

/// Presentation mode reported by the legacy (webkit) video API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    Inline,
    Fullscreen,
    PictureInPicture,
}

/// Media error
#[derive(Debug, Clone, PartialEq)]
pub struct MediaError {
    pub code: MediaErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    SrcNotSupported = 4,
}

/// Time ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRanges {
    ranges: Vec<(f64, f64)>,
}

impl TimeRanges {
    pub fn new() -> Self { Self::default() }

    pub fn from_ranges(ranges: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self { ranges: ranges.into_iter().collect() }
    }

    pub fn add(&mut self, start: f64, end: f64) {
        self.ranges.push((start, end));
    }

    pub fn length(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn start(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(s, _)| *s)
    }

    pub fn end(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(_, e)| *e)
    }

    /// End of the last range
    pub fn last_end(&self) -> Option<f64> {
        self.ranges.last().map(|(_, e)| *e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ranges.iter().copied()
    }
}

/// Rejection signatures reported by host operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Not allowed: {0}")]
    NotAllowed(String),

    #[error("Aborted: {0}")]
    Aborted(String),

    #[error("Device error: {0}")]
    Other(String),
}

/// Pending host operation (play, fullscreen, PiP, prompt)
pub type DeviceRequest = Pin<Box<dyn Future<Output = Result<(), DeviceError>> + Send + 'static>>;

/// An already fulfilled request
pub fn fulfilled() -> DeviceRequest {
    Box::pin(std::future::ready(Ok(())))
}

/// An already rejected request
pub fn rejected(error: DeviceError) -> DeviceRequest {
    Box::pin(std::future::ready(Err(error)))
}

/// Core playback device
pub trait MediaDevice: EventTarget {
    /// Request playback; the request may be rejected (autoplay policy)
    fn play(&self) -> DeviceRequest;

    fn pause(&self);

    fn paused(&self) -> bool;

    fn transport(&self) -> Option<&dyn Transport> { None }

    fn live_stream(&self) -> Option<&dyn LiveStream> { None }

    fn text_tracks(&self) -> Option<&dyn TextTrackList> { None }

    fn video_renditions(&self) -> Option<&dyn RenditionList> { None }

    fn audio_tracks(&self) -> Option<&dyn AudioTrackList> { None }

    fn remote(&self) -> Option<&dyn RemotePlayback> { None }

    /// Remote playback explicitly switched off on this device
    fn remote_playback_disabled(&self) -> bool { false }

    fn wireless_target(&self) -> Option<&dyn WirelessPlaybackTarget> { None }

    fn picture_in_picture(&self) -> Option<&dyn PictureInPicture> { None }

    fn legacy_fullscreen(&self) -> Option<&dyn LegacyFullscreen> { None }

    /// The device as a presentable element
    fn element(&self) -> Option<&dyn HostElement> { None }
}

/// Extended transport properties.
///
/// Implementations must apply a mutation before emitting the event that
/// announces it.
pub trait Transport: Send + Sync {
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);

    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);

    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);

    fn current_time(&self) -> f64;
    fn set_current_time(&self, time: f64);

    fn duration(&self) -> f64;

    fn ready_state(&self) -> ReadyState;

    fn preload(&self) -> PreloadHint;
    fn set_preload(&self, preload: PreloadHint);

    /// Current source, if any
    fn src(&self) -> Option<String>;

    /// `None` when the device exposes no seekable object at all
    fn seekable(&self) -> Option<TimeRanges>;

    fn buffered(&self) -> TimeRanges;

    fn ended(&self) -> bool { false }

    fn error(&self) -> Option<MediaError> { None }

    /// Intrinsic video width and height
    fn video_size(&self) -> (u32, u32) { (0, 0) }
}

/// Streaming metadata published by adaptive-streaming devices
pub trait LiveStream: Send + Sync {
    fn stream_type(&self) -> Option<StreamType>;

    /// `None` when not published; NaN when published but unknown
    fn target_live_window(&self) -> Option<f64> { None }

    /// Start of the live edge window, when published directly
    fn live_edge_start(&self) -> Option<f64> { None }
}

pub trait PictureInPicture: Send + Sync {
    fn request_picture_in_picture(&self) -> DeviceRequest;
}

/// Mobile-only fullscreen API on the video surface
pub trait LegacyFullscreen: Send + Sync {
    fn supports_fullscreen(&self) -> bool;

    fn displaying_fullscreen(&self) -> bool;

    fn presentation_mode(&self) -> Option<PresentationMode> { None }

    fn enter_fullscreen(&self);
}

/// AirPlay-style wireless playback target picker
pub trait WirelessPlaybackTarget: Send + Sync {
    fn current_target_is_wireless(&self) -> bool;

    fn show_playback_target_picker(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_ranges() {
        let mut ranges = TimeRanges::new();
        assert!(ranges.is_empty());
        assert_eq!(ranges.last_end(), None);

        ranges.add(0.0, 10.0);
        ranges.add(20.0, 30.0);

        assert_eq!(ranges.length(), 2);
        assert_eq!(ranges.start(1), Some(20.0));
        assert_eq!(ranges.end(0), Some(10.0));
        assert_eq!(ranges.last_end(), Some(30.0));
        assert_eq!(ranges.iter().count(), 2);
    }

    #[test]
    fn test_ready_state_ordering() {
        assert!(ReadyState::HaveMetadata < ReadyState::HaveFutureData);
        assert!(ReadyState::HaveEnoughData > ReadyState::HaveFutureData);
        assert_eq!(ReadyState::default(), ReadyState::HaveNothing);
    }

    #[test]
    fn test_stream_type_serde() {
        let parsed: StreamType = serde_json::from_str("\"on-demand\"").unwrap();
        assert_eq!(parsed, StreamType::OnDemand);
        assert!(parsed.is_definite());
        assert!(!StreamType::Unknown.is_definite());
    }

    #[test]
    fn test_ready_requests() {
        assert_eq!(smol::block_on(fulfilled()), Ok(()));

        let err = DeviceError::NotAllowed("autoplay".into());
        assert_eq!(smol::block_on(rejected(err.clone())), Err(err));
    }
}
