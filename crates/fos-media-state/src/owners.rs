//! State Owners
//!
//! The caller-assembled bundle of collaborators every descriptor reads from
//! and writes to, plus the author/user options record.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::device::{MediaDevice, StreamType};
use crate::overlay::{ElementId, HostElement, RootContext};
use crate::preferences::PreferenceStore;

/// Live edge offset used when none is configured
pub const DEFAULT_LIVE_EDGE_OFFSET: f64 = 10.0;

/// How long PiP entry waits for metadata before giving up
pub const DEFAULT_PIP_READY_TIMEOUT: Duration = Duration::from_secs(1);

/// Author/user preferences; an absent field means the built-in default
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediaOptions {
    /// Show the first captions/subtitles track automatically
    pub default_subtitles: bool,
    pub default_stream_type: Option<StreamType>,
    /// Duration reported until the device knows a usable one
    pub default_duration: Option<f64>,
    pub live_edge_offset: Option<f64>,
    /// Opt out of persisting and restoring the volume
    pub no_volume_pref: bool,
    pub pip_ready_timeout_ms: Option<u64>,
}

impl MediaOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn live_edge_offset_or_default(&self) -> f64 {
        self.live_edge_offset.unwrap_or(DEFAULT_LIVE_EDGE_OFFSET)
    }

    pub fn pip_ready_timeout(&self) -> Duration {
        self.pip_ready_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PIP_READY_TIMEOUT)
    }

    /// Configured stream type, if it is `Live` or `OnDemand`
    pub fn usable_default_stream_type(&self) -> Option<StreamType> {
        self.default_stream_type.filter(|t| t.is_definite())
    }

    /// Configured duration, if non-zero and not NaN
    pub fn usable_default_duration(&self) -> Option<f64> {
        self.default_duration.filter(|d| *d != 0.0 && !d.is_nan())
    }
}

/// Per-call bundle of state owners.
///
/// Built and discarded by the caller; descriptors only borrow it.
#[derive(Clone, Default)]
pub struct StateOwners {
    pub media: Option<Arc<dyn MediaDevice>>,
    pub document: Option<Arc<dyn RootContext>>,
    /// Element entering fullscreen; the device's element when unset
    pub fullscreen_element: Option<Arc<dyn HostElement>>,
    pub options: MediaOptions,
    pub preferences: Option<Arc<dyn PreferenceStore>>,
}

impl StateOwners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(mut self, media: Arc<dyn MediaDevice>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_document(mut self, document: Arc<dyn RootContext>) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_fullscreen_element(mut self, element: Arc<dyn HostElement>) -> Self {
        self.fullscreen_element = Some(element);
        self
    }

    pub fn with_options(mut self, options: MediaOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn media_element_id(&self) -> Option<ElementId> {
        self.media.as_ref()?.element().map(|e| e.element_id())
    }

    /// The fullscreen target, defaulting to the device's element
    pub fn overlay_target_id(&self) -> Option<ElementId> {
        self.fullscreen_element
            .as_ref()
            .map(|e| e.element_id())
            .or_else(|| self.media_element_id())
    }
}

impl fmt::Debug for StateOwners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateOwners")
            .field("media", &self.media.is_some())
            .field("document", &self.document.is_some())
            .field("fullscreen_element", &self.overlay_target_id())
            .field("options", &self.options)
            .field("preferences", &self.preferences.is_some())
            .finish()
    }
}

/// Wait until composite owners are upgraded and usable.
///
/// Rejections are logged and ignored; the owners are used as they are.
pub async fn prepare_state_owners(owners: &StateOwners) {
    let mut pending = Vec::new();
    if let Some(element) = owners.media.as_ref().and_then(|m| m.element()) {
        if element.is_composite() {
            pending.extend(element.when_defined());
        }
    }
    if let Some(element) = &owners.fullscreen_element {
        if element.is_composite() {
            pending.extend(element.when_defined());
        }
    }

    tracing::trace!("Waiting for {} composite owners", pending.len());
    for request in pending {
        if let Err(e) = request.await {
            tracing::debug!("Owner upgrade failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = MediaOptions::default();
        assert_eq!(options.live_edge_offset_or_default(), DEFAULT_LIVE_EDGE_OFFSET);
        assert_eq!(options.pip_ready_timeout(), DEFAULT_PIP_READY_TIMEOUT);
        assert_eq!(options.usable_default_stream_type(), None);
        assert_eq!(options.usable_default_duration(), None);
    }

    #[test]
    fn test_options_from_json() {
        let options = MediaOptions::from_json(
            r#"{
                "default_stream_type": "live",
                "default_duration": 120.5,
                "live_edge_offset": 4,
                "no_volume_pref": true,
                "pip_ready_timeout_ms": 250
            }"#,
        )
        .unwrap();

        assert_eq!(options.usable_default_stream_type(), Some(StreamType::Live));
        assert_eq!(options.usable_default_duration(), Some(120.5));
        assert_eq!(options.live_edge_offset_or_default(), 4.0);
        assert!(options.no_volume_pref);
        assert!(!options.default_subtitles);
        assert_eq!(options.pip_ready_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_unusable_defaults() {
        let options = MediaOptions {
            default_stream_type: Some(StreamType::Unknown),
            default_duration: Some(0.0),
            ..Default::default()
        };
        assert_eq!(options.usable_default_stream_type(), None);
        assert_eq!(options.usable_default_duration(), None);
    }

    #[test]
    fn test_empty_owners() {
        let owners = StateOwners::new();
        assert_eq!(owners.media_element_id(), None);
        assert_eq!(owners.overlay_target_id(), None);
        smol::block_on(prepare_state_owners(&owners));
    }
}
