//! Media Events
//!
//! Event-like signals, the listener contract shared by every event source,
//! and the per-source event declarations descriptors expose.

use std::sync::Arc;

use crate::availability::Availability;
use crate::tracks::TextTrackKind;

pub const LOADED_METADATA: &str = "loadedmetadata";
pub const PLAYING: &str = "playing";
pub const ADD_TRACK: &str = "addtrack";
pub const REMOVE_TRACK: &str = "removetrack";
pub const LOAD: &str = "load";
pub const WEBKIT_BEGIN_FULLSCREEN: &str = "webkitbeginfullscreen";
pub const WEBKIT_END_FULLSCREEN: &str = "webkitendfullscreen";
pub const CAST_AVAILABILITY_CHANGE: &str = "castavailabilitychange";

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Event listener callback
pub type EventListener = Arc<dyn Fn(&MediaEvent) + Send + Sync>;

/// Event-like record delivered to listeners and optionally passed to `get`
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub event_type: String,
    /// Remote target availability carried by availability-change signals
    pub availability: Option<Availability>,
    /// Kind of the track an add/remove signal refers to
    pub track_kind: Option<TextTrackKind>,
}

impl MediaEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            availability: None,
            track_kind: None,
        }
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn with_track_kind(mut self, kind: TextTrackKind) -> Self {
        self.track_kind = Some(kind);
        self
    }

    pub fn is(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }
}

/// Anything that delivers named events
pub trait EventTarget: Send + Sync {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) -> ListenerId;

    fn remove_event_listener(&self, event_type: &str, id: ListenerId);
}

/// Event source categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    Media,
    TextTracks,
    VideoRenditions,
    AudioTracks,
    Remote,
    Root,
}

/// Events that may invalidate a key, grouped by source.
///
/// Descriptors only declare these; subscribing is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevantEvents {
    pub media: &'static [&'static str],
    pub text_tracks: &'static [&'static str],
    pub video_renditions: &'static [&'static str],
    pub audio_tracks: &'static [&'static str],
    pub remote: &'static [&'static str],
    pub root: &'static [&'static str],
}

impl RelevantEvents {
    pub const NONE: RelevantEvents = RelevantEvents {
        media: &[],
        text_tracks: &[],
        video_renditions: &[],
        audio_tracks: &[],
        remote: &[],
        root: &[],
    };

    /// Declared events for one source
    pub fn for_source(&self, source: EventSource) -> &'static [&'static str] {
        match source {
            EventSource::Media => self.media,
            EventSource::TextTracks => self.text_tracks,
            EventSource::VideoRenditions => self.video_renditions,
            EventSource::AudioTracks => self.audio_tracks,
            EventSource::Remote => self.remote,
            EventSource::Root => self.root,
        }
    }

    /// Non-empty (source, events) pairs
    pub fn sources(&self) -> impl Iterator<Item = (EventSource, &'static [&'static str])> + '_ {
        [
            EventSource::Media,
            EventSource::TextTracks,
            EventSource::VideoRenditions,
            EventSource::AudioTracks,
            EventSource::Remote,
            EventSource::Root,
        ]
        .into_iter()
        .map(|source| (source, self.for_source(source)))
        .filter(|(_, events)| !events.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.sources().next().is_none()
    }

    pub fn contains(&self, source: EventSource, event_type: &str) -> bool {
        self.for_source(source).contains(&event_type)
    }
}
