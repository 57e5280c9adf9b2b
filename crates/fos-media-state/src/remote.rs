//! Remote Playback
//!
//! Cast-style remote playback handle and the availability watch shared by
//! the cast and AirPlay availability keys.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::availability::Availability;
use crate::descriptor::{Notify, StateUpdate, Teardown};
use crate::device::{DeviceError, DeviceRequest};
use crate::event::{CAST_AVAILABILITY_CHANGE, EventTarget, MediaEvent};
use crate::owners::StateOwners;

/// Remote playback connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemotePlaybackState {
    Connecting,
    Connected,
    Disconnected,
}

/// Availability watch registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Called with `true` while at least one remote target is reachable
pub type AvailabilityCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Remote playback handle of a device
pub trait RemotePlayback: EventTarget {
    fn state(&self) -> RemotePlaybackState;

    /// Start watching for remote targets.
    ///
    /// Fails with `DeviceError::NotSupported` when the platform cannot
    /// monitor availability continuously.
    fn watch_availability(&self, callback: AvailabilityCallback) -> Result<WatchId, DeviceError>;

    fn cancel_watch_availability(&self, id: Option<WatchId>) -> Result<(), DeviceError>;

    /// Show the device picker; `None` when prompting is unsupported
    fn prompt(&self) -> Option<DeviceRequest> { None }
}

fn availability_signal(availability: Availability) -> StateUpdate {
    StateUpdate::Signal(MediaEvent::new(CAST_AVAILABILITY_CHANGE).with_availability(availability))
}

/// Update handler: watch remote target availability on the device.
///
/// Registration failures become signals rather than errors. After the
/// teardown runs, nothing further reaches `notify`, even if the host keeps
/// firing the watch callback.
pub fn watch_remote_availability(notify: Notify, owners: &StateOwners) -> Option<Teardown> {
    let media = owners.media.clone()?;
    let remote = media.remote()?;

    if media.remote_playback_disabled() {
        tracing::trace!("Remote playback disabled, not watching availability");
        return None;
    }

    let active = Arc::new(AtomicBool::new(true));
    let gate = active.clone();
    let forward = notify.clone();
    let callback: AvailabilityCallback = Arc::new(move |available| {
        if gate.load(Ordering::SeqCst) {
            forward(availability_signal(Availability::from(available)));
        }
    });

    let watch = match remote.watch_availability(callback) {
        Ok(id) => Some(id),
        Err(DeviceError::NotSupported(reason)) => {
            tracing::debug!("Availability monitoring unsupported: {}", reason);
            notify(availability_signal(Availability::Indeterminate));
            None
        }
        Err(e) => {
            tracing::debug!("Availability watch failed: {}", e);
            notify(availability_signal(Availability::NotAvailable));
            None
        }
    };

    Some(Teardown::new(move || {
        active.store(false, Ordering::SeqCst);
        let Some(id) = watch else { return };
        if let Some(remote) = media.remote() {
            if let Err(e) = remote.cancel_watch_availability(Some(id)) {
                tracing::debug!("Cancelling availability watch failed: {}", e);
            }
        }
    }))
}
