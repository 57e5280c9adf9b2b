//! Media Tracks
//!
//! Text tracks, audio tracks and video renditions as exposed by a device,
//! plus the plain projections handed out to consumers so live host objects
//! never leak through the mediator.

use std::sync::Arc;

use serde::Serialize;

use crate::event::EventTarget;

/// Text track kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTrackKind {
    Subtitles,
    #[default]
    Captions,
    Descriptions,
    Chapters,
    Metadata,
}

impl TextTrackKind {
    /// Captions and subtitles are the user-selectable kinds
    pub fn is_subtitle_like(self) -> bool {
        matches!(self, TextTrackKind::Captions | TextTrackKind::Subtitles)
    }
}

/// Text track mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextTrackMode {
    #[default]
    Disabled,
    Hidden,
    Showing,
}

/// Text track cue
#[derive(Debug, Clone, PartialEq)]
pub struct TextTrackCue {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

/// Live text track owned by the device
pub trait TextTrack: Send + Sync {
    fn kind(&self) -> TextTrackKind;
    fn label(&self) -> String;
    fn language(&self) -> String;
    fn mode(&self) -> TextTrackMode;
    fn set_mode(&self, mode: TextTrackMode);

    fn cues(&self) -> Vec<TextTrackCue> { Vec::new() }

    /// Source element of an out-of-band track; fires `load` once cues arrive
    fn load_events(&self) -> Option<&dyn EventTarget> { None }
}

pub trait TextTrackList: EventTarget {
    fn tracks(&self) -> Vec<Arc<dyn TextTrack>>;
}

/// Public projection of a text track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextTrackInfo {
    pub kind: TextTrackKind,
    pub label: String,
    pub language: String,
}

impl TextTrackInfo {
    pub fn of(track: &dyn TextTrack) -> Self {
        Self {
            kind: track.kind(),
            label: track.label(),
            language: track.language(),
        }
    }
}

/// Public projection of a chapter cue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterCue {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl From<&TextTrackCue> for ChapterCue {
    fn from(cue: &TextTrackCue) -> Self {
        Self {
            text: cue.text.clone(),
            start_time: cue.start_time,
            end_time: cue.end_time,
        }
    }
}

/// Live audio track owned by the device
pub trait AudioTrack: Send + Sync {
    fn id(&self) -> String;
    fn kind(&self) -> String;
    fn label(&self) -> String;
    fn language(&self) -> String;
    fn enabled(&self) -> bool;
    fn set_enabled(&self, enabled: bool);
}

pub trait AudioTrackList: EventTarget {
    fn tracks(&self) -> Vec<Arc<dyn AudioTrack>>;
}

/// Public projection of an audio track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioTrackInfo {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub language: String,
    pub enabled: bool,
}

impl AudioTrackInfo {
    pub fn of(track: &dyn AudioTrack) -> Self {
        Self {
            id: track.id(),
            kind: track.kind(),
            label: track.label(),
            language: track.language(),
            enabled: track.enabled(),
        }
    }
}

/// Video rendition record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rendition {
    pub id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bitrate: Option<u64>,
    pub frame_rate: Option<f64>,
    pub codec: Option<String>,
}

impl Rendition {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }
}

/// Array-like rendition collection with a selection index.
///
/// `None` as the selected index means automatic selection.
pub trait RenditionList: EventTarget {
    fn renditions(&self) -> Vec<Rendition>;
    fn selected_index(&self) -> Option<usize>;
    fn set_selected_index(&self, index: Option<usize>);
}
