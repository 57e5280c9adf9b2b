//! Text Track Queries
//!
//! Filtering the device's text tracks by kind and mode, and the captions
//! toggle used by the default-subtitles behaviour.

use std::sync::Arc;

use crate::device::MediaDevice;
use crate::owners::StateOwners;
use crate::tracks::{TextTrack, TextTrackKind, TextTrackMode};

/// All text tracks of the device, in device order
pub fn text_tracks(media: &dyn MediaDevice) -> Vec<Arc<dyn TextTrack>> {
    media.text_tracks().map(|list| list.tracks()).unwrap_or_default()
}

/// Text tracks of one kind
pub fn tracks_of_kind(media: &dyn MediaDevice, kind: TextTrackKind) -> Vec<Arc<dyn TextTrack>> {
    text_tracks(media)
        .into_iter()
        .filter(|track| track.kind() == kind)
        .collect()
}

/// Captions and subtitles tracks
pub fn subtitle_tracks(owners: &StateOwners) -> Vec<Arc<dyn TextTrack>> {
    let Some(media) = owners.media.as_deref() else {
        return Vec::new();
    };
    text_tracks(media)
        .into_iter()
        .filter(|track| track.kind().is_subtitle_like())
        .collect()
}

/// Captions and subtitles tracks currently showing
pub fn showing_subtitle_tracks(owners: &StateOwners) -> Vec<Arc<dyn TextTrack>> {
    subtitle_tracks(owners)
        .into_iter()
        .filter(|track| track.mode() == TextTrackMode::Showing)
        .collect()
}

/// Show or hide captions.
///
/// `force` of `None` flips the current state. Showing enables the first
/// captions/subtitles track; hiding disables every showing one. Tracks
/// already in the requested mode are left alone.
pub fn toggle_subtitle_tracks(owners: &StateOwners, force: Option<bool>) {
    let tracks = subtitle_tracks(owners);
    let Some(first) = tracks.first() else {
        return;
    };

    let showing: Vec<_> = tracks
        .iter()
        .filter(|track| track.mode() == TextTrackMode::Showing)
        .collect();
    let show = force.unwrap_or(showing.is_empty());

    if show {
        if first.mode() != TextTrackMode::Showing {
            tracing::debug!("Showing subtitles track '{}'", first.label());
            first.set_mode(TextTrackMode::Showing);
        }
    } else {
        for track in showing {
            track.set_mode(TextTrackMode::Disabled);
        }
    }
}
