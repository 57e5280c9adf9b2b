//! Live-stream keys: stream type, target live window, live-edge detection.

use crate::descriptor::StateDescriptor;
use crate::device::StreamType;
use crate::event::{MediaEvent, RelevantEvents};
use crate::owners::StateOwners;

const STREAM_TYPE_EVENTS: RelevantEvents = RelevantEvents {
    media: &["emptied", "durationchange", "loadedmetadata", "streamtypechange"],
    ..RelevantEvents::NONE
};

/// Live or on-demand, from device metadata, duration, or the configured default
pub struct MediaStreamType;

impl StateDescriptor for MediaStreamType {
    const NAME: &'static str = "media_stream_type";
    type Value = Option<StreamType>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<StreamType> {
        let fallback = owners.options.usable_default_stream_type();
        let Some(media) = owners.media.as_deref() else {
            return fallback;
        };

        match media.live_stream().and_then(|live| live.stream_type()) {
            Some(stream_type) if stream_type.is_definite() => return Some(stream_type),
            Some(StreamType::Unknown) if fallback.is_some() => return fallback,
            _ => {}
        }

        match media.transport().map(|t| t.duration()) {
            Some(duration) if duration == f64::INFINITY => Some(StreamType::Live),
            Some(duration) if duration.is_finite() => Some(StreamType::OnDemand),
            _ => fallback,
        }
    }

    fn events(&self) -> &'static RelevantEvents {
        &STREAM_TYPE_EVENTS
    }
}

const TARGET_LIVE_WINDOW_EVENTS: RelevantEvents = RelevantEvents {
    media: &["emptied", "durationchange", "loadedmetadata", "streamtypechange", "targetlivewindowchange"],
    ..RelevantEvents::NONE
};

/// Seconds of DVR window behind the live edge; 0 for live without one
pub struct MediaTargetLiveWindow;

impl StateDescriptor for MediaTargetLiveWindow {
    const NAME: &'static str = "media_target_live_window";
    type Value = f64;

    fn get(&self, owners: &StateOwners, signal: Option<&MediaEvent>) -> f64 {
        let Some(media) = owners.media.as_deref() else {
            return f64::NAN;
        };
        let window = media.live_stream().and_then(|live| live.target_live_window());
        match window {
            Some(window) if !window.is_nan() => window,
            _ if MediaStreamType.get(owners, signal) == Some(StreamType::Live) => 0.0,
            _ => f64::NAN,
        }
    }

    fn events(&self) -> &'static RelevantEvents {
        &TARGET_LIVE_WINDOW_EVENTS
    }
}

const TIME_IS_LIVE_EVENTS: RelevantEvents = RelevantEvents {
    media: &["playing", "timeupdate", "progress", "waiting", "emptied"],
    ..RelevantEvents::NONE
};

/// Whether playback sits at the live edge
pub struct MediaTimeIsLive;

impl StateDescriptor for MediaTimeIsLive {
    const NAME: &'static str = "media_time_is_live";
    type Value = bool;

    fn get(&self, owners: &StateOwners, signal: Option<&MediaEvent>) -> bool {
        let Some(media) = owners.media.as_deref() else {
            return false;
        };
        let current_time = media.transport().map_or(0.0, |t| t.current_time());

        if let Some(edge_start) = media.live_stream().and_then(|live| live.live_edge_start()) {
            return !edge_start.is_nan() && current_time >= edge_start;
        }

        if MediaStreamType.get(owners, signal) != Some(StreamType::Live) {
            return false;
        }

        let Some(seekable) = media.transport().and_then(|t| t.seekable()) else {
            return true;
        };
        let Some(end) = seekable.last_end() else {
            return false;
        };
        current_time >= end - owners.options.live_edge_offset_or_default()
    }

    fn events(&self) -> &'static RelevantEvents {
        &TIME_IS_LIVE_EVENTS
    }
}
