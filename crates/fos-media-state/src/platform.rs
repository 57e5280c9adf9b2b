//! Platform Capabilities
//!
//! Capability predicates evaluated against the host platform, with a
//! process-wide installable backend.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, RwLock};

use crate::device::MediaDevice;

/// Boxed capability probe
pub type CapabilityProbe = Pin<Box<dyn Future<Output = bool> + Send + 'static>>;

/// Host platform capabilities
pub trait Platform: Send + Sync {
    /// Document-level fullscreen API is available and allowed
    fn fullscreen_enabled(&self) -> bool;

    fn picture_in_picture_enabled(&self) -> bool;

    fn cast_supported(&self) -> bool;

    fn airplay_supported(&self) -> bool;

    /// Probe whether volume can actually be changed (some mobile platforms
    /// expose a read-only volume)
    fn probe_volume_support(&self) -> CapabilityProbe;
}

/// Platform with fixed answers; the default answers "no" everywhere
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedPlatform {
    pub fullscreen: bool,
    pub picture_in_picture: bool,
    pub cast: bool,
    pub airplay: bool,
    pub volume: bool,
}

impl FixedPlatform {
    /// Headless host: no capabilities
    pub fn headless() -> Self {
        Self::default()
    }

    /// Desktop-class host: everything but AirPlay
    pub fn desktop() -> Self {
        Self {
            fullscreen: true,
            picture_in_picture: true,
            cast: true,
            airplay: false,
            volume: true,
        }
    }
}

impl Platform for FixedPlatform {
    fn fullscreen_enabled(&self) -> bool {
        self.fullscreen
    }

    fn picture_in_picture_enabled(&self) -> bool {
        self.picture_in_picture
    }

    fn cast_supported(&self) -> bool {
        self.cast
    }

    fn airplay_supported(&self) -> bool {
        self.airplay
    }

    fn probe_volume_support(&self) -> CapabilityProbe {
        Box::pin(std::future::ready(self.volume))
    }
}

static PLATFORM: OnceLock<RwLock<Arc<dyn Platform>>> = OnceLock::new();

fn platform_slot() -> &'static RwLock<Arc<dyn Platform>> {
    PLATFORM.get_or_init(|| RwLock::new(Arc::new(FixedPlatform::headless())))
}

/// Install the process-wide platform backend.
///
/// Install before the first volume-availability read; the volume probe
/// runs against whichever platform is installed at that moment.
pub fn set_platform(platform: Arc<dyn Platform>) {
    *platform_slot().write().unwrap_or_else(|e| e.into_inner()) = platform;
}

/// Current platform backend
pub fn platform() -> Arc<dyn Platform> {
    platform_slot().read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Fullscreen is possible on this platform or through the device's own API
pub fn has_fullscreen_support(platform: &dyn Platform, media: Option<&dyn MediaDevice>) -> bool {
    platform.fullscreen_enabled()
        || media
            .and_then(|m| m.legacy_fullscreen())
            .is_some_and(|legacy| legacy.supports_fullscreen())
}

/// Picture-in-picture is enabled on the platform and requestable on the device
pub fn has_pip_support(platform: &dyn Platform, media: Option<&dyn MediaDevice>) -> bool {
    platform.picture_in_picture_enabled() && media.is_some_and(|m| m.picture_in_picture().is_some())
}
