//! Capability Availability
//!
//! Tri-state availability flags and the process-wide volume support probe.
//!
//! The probe is the only process-wide mutable state in the crate. It starts
//! on first access, runs once on smol's global executor, and then answers
//! synchronously for the rest of the process. Callers that arrive before it
//! settles can subscribe and are called back exactly once.

use std::sync::Mutex;

use serde::Serialize;

use crate::platform::platform;

/// Why a capability cannot be exercised; `None` means available or unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityState {
    /// The platform or device lacks the capability entirely
    Unsupported,
    /// Supported, but no eligible target is reachable right now
    Unavailable,
}

/// Remote target availability carried by watch signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    Available,
    NotAvailable,
    /// The platform cannot monitor availability
    Indeterminate,
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Availability::Available
        } else {
            Availability::NotAvailable
        }
    }
}

type ProbeCallback = Box<dyn FnOnce(bool) + Send>;

enum ProbeState {
    NotStarted,
    Pending(Vec<ProbeCallback>),
    Resolved(bool),
}

/// One-shot capability probe with a resolved cache and pending callbacks
pub struct VolumeSupportProbe {
    state: Mutex<ProbeState>,
}

impl VolumeSupportProbe {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(ProbeState::NotStarted),
        }
    }

    /// Resolved answer, `None` while unknown
    pub fn supported(&self) -> Option<bool> {
        match *self.lock() {
            ProbeState::Resolved(supported) => Some(supported),
            _ => None,
        }
    }

    /// Mark the probe as running; `true` only for the call that should run it
    pub fn begin(&self) -> bool {
        let mut state = self.lock();
        if matches!(*state, ProbeState::NotStarted) {
            *state = ProbeState::Pending(Vec::new());
            true
        } else {
            false
        }
    }

    /// Register for the result.
    ///
    /// Returns `false` without registering when the answer is already known.
    pub fn subscribe(&self, callback: impl FnOnce(bool) + Send + 'static) -> bool {
        let mut state = self.lock();
        match &mut *state {
            ProbeState::Resolved(_) => false,
            ProbeState::Pending(callbacks) => {
                callbacks.push(Box::new(callback));
                true
            }
            ProbeState::NotStarted => {
                *state = ProbeState::Pending(vec![Box::new(callback)]);
                true
            }
        }
    }

    /// Store the answer and fan it out; later resolutions are ignored
    pub fn resolve(&self, supported: bool) {
        let callbacks = {
            let mut state = self.lock();
            if matches!(*state, ProbeState::Resolved(_)) {
                return;
            }
            match std::mem::replace(&mut *state, ProbeState::Resolved(supported)) {
                ProbeState::Pending(callbacks) => callbacks,
                _ => Vec::new(),
            }
        };

        tracing::debug!("Volume support resolved: {} ({} waiting)", supported, callbacks.len());
        for callback in callbacks {
            callback(supported);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProbeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for VolumeSupportProbe {
    fn default() -> Self {
        Self::new()
    }
}

static VOLUME_SUPPORT: VolumeSupportProbe = VolumeSupportProbe::new();

/// Process-wide volume support probe, started on first access
pub fn volume_support() -> &'static VolumeSupportProbe {
    if VOLUME_SUPPORT.begin() {
        let probe = platform().probe_volume_support();
        smol::spawn(async move {
            VOLUME_SUPPORT.resolve(probe.await);
        })
        .detach();
    }
    &VOLUME_SUPPORT
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_probe_fans_out_once() {
        let probe = VolumeSupportProbe::new();
        let calls = Arc::new(AtomicUsize::new(0));

        assert!(probe.begin());
        assert!(!probe.begin());
        assert_eq!(probe.supported(), None);

        for _ in 0..3 {
            let calls = calls.clone();
            assert!(probe.subscribe(move |supported| {
                assert!(!supported);
                calls.fetch_add(1, Ordering::SeqCst);
            }));
        }

        probe.resolve(false);
        probe.resolve(true);

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(probe.supported(), Some(false));
        assert!(!probe.subscribe(|_| panic!("already resolved")));
    }

    #[test]
    fn test_availability_from_bool() {
        assert_eq!(Availability::from(true), Availability::Available);
        assert_eq!(Availability::from(false), Availability::NotAvailable);
    }

    #[test]
    fn test_global_probe_settles() {
        let probe = volume_support();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while probe.supported().is_none() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(probe.supported().is_some());
    }
}
