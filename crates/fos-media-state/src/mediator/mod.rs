//! State Mediator
//!
//! The fixed registry of state descriptors. Each field is a zero-sized
//! descriptor; mutable keys also implement `MutableState`, so writing a
//! read-only key does not compile.
//!
//! ```ignore
//! let owners = StateOwners::new().with_media(device);
//! let paused = STATE_MEDIATOR.media_paused.get(&owners, None);
//! STATE_MEDIATOR.media_paused.set(!paused, &owners).detach();
//! ```

mod availability;
mod live;
mod presentation;
mod tracks;
mod transport;

use std::collections::BTreeMap;

use crate::descriptor::{DescriptorEntry, StateValue};
use crate::owners::StateOwners;

pub use availability::{
    MediaAirplayUnavailable, MediaCastUnavailable, MediaFullscreenUnavailable, MediaPipUnavailable,
    airplay_availability, cast_availability, fullscreen_availability, pip_availability,
};
pub use live::{MediaStreamType, MediaTargetLiveWindow, MediaTimeIsLive};
pub use presentation::{
    MediaIsAirplaying, MediaIsCasting, MediaIsFullscreen, MediaIsPip, enter_picture_in_picture,
    show_airplay_picker,
};
pub use tracks::{
    MediaAudioTrackEnabled, MediaAudioTrackList, MediaAudioTrackUnavailable, MediaChaptersCues,
    MediaRenditionList, MediaRenditionSelected, MediaRenditionUnavailable, MediaSubtitlesList,
    MediaSubtitlesShowing,
};
pub use transport::{
    MediaBuffered, MediaCurrentTime, MediaDuration, MediaEnded, MediaErrorCode, MediaErrorMessage,
    MediaHasPlayed, MediaLoading, MediaMuted, MediaPaused, MediaPlaybackRate, MediaSeekable,
    MediaVideoHeight, MediaVideoWidth, MediaVolume, MediaVolumeLevel, MediaVolumeUnavailable,
    VolumeLevel, volume_availability,
};

/// Registry of every state key
pub struct StateMediator {
    // Transport
    pub media_paused: MediaPaused,
    pub media_has_played: MediaHasPlayed,
    pub media_ended: MediaEnded,
    pub media_playback_rate: MediaPlaybackRate,
    pub media_muted: MediaMuted,
    pub media_volume: MediaVolume,
    pub media_volume_level: MediaVolumeLevel,
    pub media_current_time: MediaCurrentTime,
    pub media_duration: MediaDuration,
    pub media_loading: MediaLoading,
    pub media_seekable: MediaSeekable,
    pub media_buffered: MediaBuffered,
    pub media_error_code: MediaErrorCode,
    pub media_error_message: MediaErrorMessage,
    pub media_video_width: MediaVideoWidth,
    pub media_video_height: MediaVideoHeight,

    // Live
    pub media_stream_type: MediaStreamType,
    pub media_target_live_window: MediaTargetLiveWindow,
    pub media_time_is_live: MediaTimeIsLive,

    // Tracks
    pub media_subtitles_list: MediaSubtitlesList,
    pub media_subtitles_showing: MediaSubtitlesShowing,
    pub media_chapters_cues: MediaChaptersCues,
    pub media_rendition_list: MediaRenditionList,
    pub media_rendition_selected: MediaRenditionSelected,
    pub media_audio_track_list: MediaAudioTrackList,
    pub media_audio_track_enabled: MediaAudioTrackEnabled,

    // Presentation
    pub media_is_fullscreen: MediaIsFullscreen,
    pub media_is_pip: MediaIsPip,
    pub media_is_casting: MediaIsCasting,
    pub media_is_airplaying: MediaIsAirplaying,

    // Availability
    pub media_fullscreen_unavailable: MediaFullscreenUnavailable,
    pub media_pip_unavailable: MediaPipUnavailable,
    pub media_volume_unavailable: MediaVolumeUnavailable,
    pub media_cast_unavailable: MediaCastUnavailable,
    pub media_airplay_unavailable: MediaAirplayUnavailable,
    pub media_rendition_unavailable: MediaRenditionUnavailable,
    pub media_audio_track_unavailable: MediaAudioTrackUnavailable,
}

/// The process-wide registry
pub static STATE_MEDIATOR: StateMediator = StateMediator {
    media_paused: MediaPaused,
    media_has_played: MediaHasPlayed,
    media_ended: MediaEnded,
    media_playback_rate: MediaPlaybackRate,
    media_muted: MediaMuted,
    media_volume: MediaVolume,
    media_volume_level: MediaVolumeLevel,
    media_current_time: MediaCurrentTime,
    media_duration: MediaDuration,
    media_loading: MediaLoading,
    media_seekable: MediaSeekable,
    media_buffered: MediaBuffered,
    media_error_code: MediaErrorCode,
    media_error_message: MediaErrorMessage,
    media_video_width: MediaVideoWidth,
    media_video_height: MediaVideoHeight,
    media_stream_type: MediaStreamType,
    media_target_live_window: MediaTargetLiveWindow,
    media_time_is_live: MediaTimeIsLive,
    media_subtitles_list: MediaSubtitlesList,
    media_subtitles_showing: MediaSubtitlesShowing,
    media_chapters_cues: MediaChaptersCues,
    media_rendition_list: MediaRenditionList,
    media_rendition_selected: MediaRenditionSelected,
    media_audio_track_list: MediaAudioTrackList,
    media_audio_track_enabled: MediaAudioTrackEnabled,
    media_is_fullscreen: MediaIsFullscreen,
    media_is_pip: MediaIsPip,
    media_is_casting: MediaIsCasting,
    media_is_airplaying: MediaIsAirplaying,
    media_fullscreen_unavailable: MediaFullscreenUnavailable,
    media_pip_unavailable: MediaPipUnavailable,
    media_volume_unavailable: MediaVolumeUnavailable,
    media_cast_unavailable: MediaCastUnavailable,
    media_airplay_unavailable: MediaAirplayUnavailable,
    media_rendition_unavailable: MediaRenditionUnavailable,
    media_audio_track_unavailable: MediaAudioTrackUnavailable,
};

impl StateMediator {
    /// Type-erased view of every key, in declaration order
    pub fn entries(&'static self) -> [DescriptorEntry; 37] {
        [
            DescriptorEntry::mutable(&self.media_paused),
            DescriptorEntry::read_only(&self.media_has_played),
            DescriptorEntry::read_only(&self.media_ended),
            DescriptorEntry::mutable(&self.media_playback_rate),
            DescriptorEntry::mutable(&self.media_muted),
            DescriptorEntry::mutable(&self.media_volume),
            DescriptorEntry::read_only(&self.media_volume_level),
            DescriptorEntry::mutable(&self.media_current_time),
            DescriptorEntry::read_only(&self.media_duration),
            DescriptorEntry::read_only(&self.media_loading),
            DescriptorEntry::read_only(&self.media_seekable),
            DescriptorEntry::read_only(&self.media_buffered),
            DescriptorEntry::read_only(&self.media_error_code),
            DescriptorEntry::read_only(&self.media_error_message),
            DescriptorEntry::read_only(&self.media_video_width),
            DescriptorEntry::read_only(&self.media_video_height),
            DescriptorEntry::read_only(&self.media_stream_type),
            DescriptorEntry::read_only(&self.media_target_live_window),
            DescriptorEntry::read_only(&self.media_time_is_live),
            DescriptorEntry::read_only(&self.media_subtitles_list),
            DescriptorEntry::read_only(&self.media_subtitles_showing),
            DescriptorEntry::read_only(&self.media_chapters_cues),
            DescriptorEntry::read_only(&self.media_rendition_list),
            DescriptorEntry::mutable(&self.media_rendition_selected),
            DescriptorEntry::read_only(&self.media_audio_track_list),
            DescriptorEntry::mutable(&self.media_audio_track_enabled),
            DescriptorEntry::mutable(&self.media_is_fullscreen),
            DescriptorEntry::mutable(&self.media_is_pip),
            DescriptorEntry::mutable(&self.media_is_casting),
            DescriptorEntry::mutable(&self.media_is_airplaying),
            DescriptorEntry::read_only(&self.media_fullscreen_unavailable),
            DescriptorEntry::read_only(&self.media_pip_unavailable),
            DescriptorEntry::read_only(&self.media_volume_unavailable),
            DescriptorEntry::read_only(&self.media_cast_unavailable),
            DescriptorEntry::read_only(&self.media_airplay_unavailable),
            DescriptorEntry::read_only(&self.media_rendition_unavailable),
            DescriptorEntry::read_only(&self.media_audio_track_unavailable),
        ]
    }

    /// Look up a key by name
    pub fn entry(&'static self, name: &str) -> Option<DescriptorEntry> {
        self.entries().into_iter().find(|entry| entry.name == name)
    }

    /// Read every key at once
    pub fn snapshot(&'static self, owners: &StateOwners) -> BTreeMap<&'static str, StateValue> {
        self.entries()
            .into_iter()
            .map(|entry| (entry.name, entry.descriptor.get_value(owners, None)))
            .collect()
    }
}
