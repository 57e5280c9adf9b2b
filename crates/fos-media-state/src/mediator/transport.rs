//! Transport keys: play/pause, rate, volume, time, duration, buffering,
//! and the plain media-element facts (ended, error, intrinsic size).

use serde::Serialize;

use crate::availability::{AvailabilityState, volume_support};
use crate::descriptor::{
    MutableState, Notify, SetCompletion, StateDescriptor, StateUpdate, StateValue, Teardown,
    UpdateHandler,
};
use crate::device::{ReadyState, TimeRanges, Transport};
use crate::event::{MediaEvent, PLAYING, RelevantEvents};
use crate::owners::StateOwners;
use crate::preferences::VOLUME_PREF_KEY;

pub(crate) fn transport(owners: &StateOwners) -> Option<&dyn Transport> {
    owners.media.as_deref()?.transport()
}

/// Round to millisecond precision
fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

fn rounded_ranges(ranges: &TimeRanges) -> Vec<(f64, f64)> {
    ranges
        .iter()
        .map(|(start, end)| (round_millis(start), round_millis(end)))
        .collect()
}

/// Coarse loudness bucket for volume icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeLevel {
    Off,
    Low,
    Medium,
    High,
}

impl VolumeLevel {
    pub fn classify(muted: bool, volume: f64) -> Self {
        if muted || volume == 0.0 {
            VolumeLevel::Off
        } else if volume < 0.5 {
            VolumeLevel::Low
        } else if volume < 0.75 {
            VolumeLevel::Medium
        } else {
            VolumeLevel::High
        }
    }
}

// ============================================================================
// Play state
// ============================================================================

const PAUSED_EVENTS: RelevantEvents = RelevantEvents {
    media: &["play", "playing", "pause", "emptied"],
    ..RelevantEvents::NONE
};

pub struct MediaPaused;

impl StateDescriptor for MediaPaused {
    const NAME: &'static str = "media_paused";
    type Value = bool;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> bool {
        owners.media.as_ref().is_none_or(|media| media.paused())
    }

    fn events(&self) -> &'static RelevantEvents {
        &PAUSED_EVENTS
    }
}

impl MutableState for MediaPaused {
    type Input = bool;

    fn set(&self, paused: bool, owners: &StateOwners) -> SetCompletion {
        let Some(media) = &owners.media else {
            return SetCompletion::done();
        };
        if paused {
            media.pause();
            return SetCompletion::done();
        }

        let request = media.play();
        SetCompletion::pending(async move {
            // Autoplay-policy rejections are expected
            if let Err(e) = request.await {
                tracing::debug!("Play request rejected: {}", e);
            }
            Ok(())
        })
    }
}

const HAS_PLAYED_EVENTS: RelevantEvents = RelevantEvents {
    media: &["playing", "emptied"],
    ..RelevantEvents::NONE
};

/// Whether playback has started since the last source change
pub struct MediaHasPlayed;

impl StateDescriptor for MediaHasPlayed {
    const NAME: &'static str = "media_has_played";
    type Value = bool;

    fn get(&self, owners: &StateOwners, signal: Option<&MediaEvent>) -> bool {
        let Some(media) = &owners.media else {
            return false;
        };
        match signal {
            Some(event) => event.is(PLAYING),
            None => !media.paused(),
        }
    }

    fn events(&self) -> &'static RelevantEvents {
        &HAS_PLAYED_EVENTS
    }
}

const ENDED_EVENTS: RelevantEvents = RelevantEvents {
    media: &["seeked", "ended", "emptied"],
    ..RelevantEvents::NONE
};

pub struct MediaEnded;

impl StateDescriptor for MediaEnded {
    const NAME: &'static str = "media_ended";
    type Value = bool;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> bool {
        transport(owners).is_some_and(|t| t.ended())
    }

    fn events(&self) -> &'static RelevantEvents {
        &ENDED_EVENTS
    }
}

// ============================================================================
// Rate and volume
// ============================================================================

const PLAYBACK_RATE_EVENTS: RelevantEvents = RelevantEvents {
    media: &["ratechange", "loadstart"],
    ..RelevantEvents::NONE
};

pub struct MediaPlaybackRate;

impl StateDescriptor for MediaPlaybackRate {
    const NAME: &'static str = "media_playback_rate";
    type Value = f64;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> f64 {
        transport(owners).map_or(1.0, |t| t.playback_rate())
    }

    fn events(&self) -> &'static RelevantEvents {
        &PLAYBACK_RATE_EVENTS
    }
}

impl MutableState for MediaPlaybackRate {
    type Input = f64;

    fn set(&self, rate: f64, owners: &StateOwners) -> SetCompletion {
        if let Some(t) = transport(owners) {
            if rate.is_finite() {
                t.set_playback_rate(rate);
            }
        }
        SetCompletion::done()
    }
}

const VOLUME_EVENTS: RelevantEvents = RelevantEvents {
    media: &["volumechange"],
    ..RelevantEvents::NONE
};

pub struct MediaMuted;

impl StateDescriptor for MediaMuted {
    const NAME: &'static str = "media_muted";
    type Value = bool;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> bool {
        transport(owners).is_some_and(|t| t.muted())
    }

    fn events(&self) -> &'static RelevantEvents {
        &VOLUME_EVENTS
    }
}

impl MutableState for MediaMuted {
    type Input = bool;

    fn set(&self, muted: bool, owners: &StateOwners) -> SetCompletion {
        if let Some(t) = transport(owners) {
            t.set_muted(muted);
        }
        SetCompletion::done()
    }
}

/// Restore the persisted volume onto the device
fn restore_volume_preference(notify: Notify, owners: &StateOwners) -> Option<Teardown> {
    if owners.options.no_volume_pref {
        return None;
    }
    let store = owners.preferences.as_ref()?;
    let transport = transport(owners)?;

    let stored = match store.get_item(VOLUME_PREF_KEY) {
        Ok(stored) => stored?,
        Err(e) => {
            tracing::debug!("Volume preference unreadable: {}", e);
            return None;
        }
    };
    let volume = match stored.trim().parse::<f64>() {
        Ok(volume) if volume.is_finite() => volume,
        _ => {
            tracing::debug!("Ignoring malformed volume preference {:?}", stored);
            return None;
        }
    };

    tracing::trace!("Restoring volume {} from preferences", volume);
    transport.set_volume(volume);
    notify(StateUpdate::Value(volume.into()));
    None
}

pub struct MediaVolume;

impl StateDescriptor for MediaVolume {
    const NAME: &'static str = "media_volume";
    type Value = f64;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> f64 {
        transport(owners).map_or(1.0, |t| t.volume())
    }

    fn events(&self) -> &'static RelevantEvents {
        &VOLUME_EVENTS
    }

    fn update_handlers(&self) -> &'static [UpdateHandler] {
        &[restore_volume_preference]
    }
}

impl MutableState for MediaVolume {
    type Input = f64;

    fn set(&self, volume: f64, owners: &StateOwners) -> SetCompletion {
        let Some(t) = transport(owners) else {
            return SetCompletion::done();
        };
        if !volume.is_finite() {
            return SetCompletion::done();
        }
        t.set_volume(volume);

        if owners.options.no_volume_pref {
            return SetCompletion::done();
        }
        if let Some(store) = &owners.preferences {
            // Storage may be blocked or full
            if let Err(e) = store.set_item(VOLUME_PREF_KEY, &volume.to_string()) {
                tracing::debug!("Volume preference not saved: {}", e);
            }
        }
        SetCompletion::done()
    }
}

pub struct MediaVolumeLevel;

impl StateDescriptor for MediaVolumeLevel {
    const NAME: &'static str = "media_volume_level";
    type Value = VolumeLevel;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> VolumeLevel {
        match transport(owners) {
            Some(t) => VolumeLevel::classify(t.muted(), t.volume()),
            None => VolumeLevel::High,
        }
    }

    fn events(&self) -> &'static RelevantEvents {
        &VOLUME_EVENTS
    }
}

/// Report the probe result once it settles, if it had not yet
fn await_volume_support(notify: Notify, _owners: &StateOwners) -> Option<Teardown> {
    let probe = volume_support();
    let waiting = probe.subscribe(move |supported| {
        let value = if supported {
            StateValue::Unset
        } else {
            AvailabilityState::Unsupported.into()
        };
        notify(StateUpdate::Value(value));
    });
    if waiting {
        tracing::trace!("Volume support still probing");
    }
    None
}

pub struct MediaVolumeUnavailable;

impl StateDescriptor for MediaVolumeUnavailable {
    const NAME: &'static str = "media_volume_unavailable";
    type Value = Option<AvailabilityState>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<AvailabilityState> {
        volume_availability(volume_support().supported(), owners)
    }

    fn update_handlers(&self) -> &'static [UpdateHandler] {
        &[await_volume_support]
    }
}

/// Volume availability given the probe's answer so far
pub fn volume_availability(supported: Option<bool>, owners: &StateOwners) -> Option<AvailabilityState> {
    if supported == Some(false) || transport(owners).is_none() {
        Some(AvailabilityState::Unsupported)
    } else {
        None
    }
}

// ============================================================================
// Time and loading
// ============================================================================

const CURRENT_TIME_EVENTS: RelevantEvents = RelevantEvents {
    media: &["timeupdate", "loadedmetadata"],
    ..RelevantEvents::NONE
};

pub struct MediaCurrentTime;

impl StateDescriptor for MediaCurrentTime {
    const NAME: &'static str = "media_current_time";
    type Value = f64;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> f64 {
        transport(owners).map_or(0.0, |t| t.current_time())
    }

    fn events(&self) -> &'static RelevantEvents {
        &CURRENT_TIME_EVENTS
    }
}

impl MutableState for MediaCurrentTime {
    type Input = f64;

    fn set(&self, time: f64, owners: &StateOwners) -> SetCompletion {
        let Some(t) = transport(owners) else {
            return SetCompletion::done();
        };
        if !time.is_finite() || t.ready_state() == ReadyState::HaveNothing {
            tracing::trace!("Ignoring seek to {} at {:?}", time, t.ready_state());
            return SetCompletion::done();
        }
        t.set_current_time(time);
        SetCompletion::done()
    }
}

const DURATION_EVENTS: RelevantEvents = RelevantEvents {
    media: &["durationchange", "loadedmetadata", "emptied"],
    ..RelevantEvents::NONE
};

pub struct MediaDuration;

impl StateDescriptor for MediaDuration {
    const NAME: &'static str = "media_duration";
    type Value = f64;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> f64 {
        let duration = transport(owners).map(|t| t.duration());
        if let Some(default) = owners.options.usable_default_duration() {
            if duration.is_none_or(|d| d == 0.0 || !d.is_finite()) {
                return default;
            }
        }
        duration.filter(|d| d.is_finite()).unwrap_or(f64::NAN)
    }

    fn events(&self) -> &'static RelevantEvents {
        &DURATION_EVENTS
    }
}

const LOADING_EVENTS: RelevantEvents = RelevantEvents {
    media: &["waiting", "playing", "emptied"],
    ..RelevantEvents::NONE
};

pub struct MediaLoading;

impl StateDescriptor for MediaLoading {
    const NAME: &'static str = "media_loading";
    type Value = bool;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> bool {
        transport(owners).is_some_and(|t| t.ready_state() < ReadyState::HaveFutureData)
    }

    fn events(&self) -> &'static RelevantEvents {
        &LOADING_EVENTS
    }
}

const SEEKABLE_EVENTS: RelevantEvents = RelevantEvents {
    media: &["loadedmetadata", "emptied", "progress", "seekablechange"],
    ..RelevantEvents::NONE
};

/// Overall seekable span, first start to last end
pub struct MediaSeekable;

impl StateDescriptor for MediaSeekable {
    const NAME: &'static str = "media_seekable";
    type Value = Option<(f64, f64)>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<(f64, f64)> {
        let seekable = transport(owners)?.seekable()?;
        let start = seekable.start(0)?;
        let end = seekable.last_end()?;

        let blank = |x: f64| x == 0.0 || x.is_nan();
        if blank(start) && blank(end) {
            return None;
        }
        Some((round_millis(start), round_millis(end)))
    }

    fn events(&self) -> &'static RelevantEvents {
        &SEEKABLE_EVENTS
    }
}

const BUFFERED_EVENTS: RelevantEvents = RelevantEvents {
    media: &["progress", "emptied"],
    ..RelevantEvents::NONE
};

pub struct MediaBuffered;

impl StateDescriptor for MediaBuffered {
    const NAME: &'static str = "media_buffered";
    type Value = Vec<(f64, f64)>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Vec<(f64, f64)> {
        transport(owners)
            .map(|t| rounded_ranges(&t.buffered()))
            .unwrap_or_default()
    }

    fn events(&self) -> &'static RelevantEvents {
        &BUFFERED_EVENTS
    }
}

// ============================================================================
// Element facts
// ============================================================================

const ERROR_EVENTS: RelevantEvents = RelevantEvents {
    media: &["emptied", "error"],
    ..RelevantEvents::NONE
};

/// Numeric media error code (1-4), unset when there is no error
pub struct MediaErrorCode;

impl StateDescriptor for MediaErrorCode {
    const NAME: &'static str = "media_error_code";
    type Value = Option<u32>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<u32> {
        transport(owners)?.error().map(|e| e.code as u32)
    }

    fn events(&self) -> &'static RelevantEvents {
        &ERROR_EVENTS
    }
}

pub struct MediaErrorMessage;

impl StateDescriptor for MediaErrorMessage {
    const NAME: &'static str = "media_error_message";
    type Value = String;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> String {
        transport(owners)
            .and_then(|t| t.error())
            .map(|e| e.message)
            .unwrap_or_default()
    }

    fn events(&self) -> &'static RelevantEvents {
        &ERROR_EVENTS
    }
}

const SIZE_EVENTS: RelevantEvents = RelevantEvents {
    media: &["resize", "loadedmetadata"],
    ..RelevantEvents::NONE
};

pub struct MediaVideoWidth;

impl StateDescriptor for MediaVideoWidth {
    const NAME: &'static str = "media_video_width";
    type Value = u32;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> u32 {
        transport(owners).map_or(0, |t| t.video_size().0)
    }

    fn events(&self) -> &'static RelevantEvents {
        &SIZE_EVENTS
    }
}

pub struct MediaVideoHeight;

impl StateDescriptor for MediaVideoHeight {
    const NAME: &'static str = "media_video_height";
    type Value = u32;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> u32 {
        transport(owners).map_or(0, |t| t.video_size().1)
    }

    fn events(&self) -> &'static RelevantEvents {
        &SIZE_EVENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceError, MediaError, MediaErrorCode as Code, MediaDevice};
    use crate::owners::MediaOptions;
    use crate::preferences::{MemoryPreferenceStore, PreferenceStore, StorageError};
    use crate::simulated::SimulatedMedia;
    use std::sync::{Arc, Mutex};

    fn owners_for(media: &Arc<SimulatedMedia>) -> StateOwners {
        StateOwners::new().with_media(media.clone())
    }

    #[test]
    fn test_absent_device_defaults() {
        let owners = StateOwners::new();
        assert!(MediaPaused.get(&owners, None));
        assert!(!MediaHasPlayed.get(&owners, None));
        assert_eq!(MediaPlaybackRate.get(&owners, None), 1.0);
        assert_eq!(MediaVolume.get(&owners, None), 1.0);
        assert!(!MediaMuted.get(&owners, None));
        assert_eq!(MediaVolumeLevel.get(&owners, None), VolumeLevel::High);
        assert_eq!(MediaCurrentTime.get(&owners, None), 0.0);
        assert!(MediaDuration.get(&owners, None).is_nan());
        assert!(!MediaLoading.get(&owners, None));
        assert_eq!(MediaSeekable.get(&owners, None), None);
        assert!(MediaBuffered.get(&owners, None).is_empty());
        assert_eq!(MediaErrorCode.get(&owners, None), None);
        assert_eq!(MediaErrorMessage.get(&owners, None), "");
    }

    #[test]
    fn test_setters_without_device_are_noops() {
        let owners = StateOwners::new();
        assert!(!MediaPaused.set(false, &owners).is_pending());
        assert!(!MediaVolume.set(0.5, &owners).is_pending());
        assert!(!MediaCurrentTime.set(3.0, &owners).is_pending());
    }

    #[test]
    fn test_has_played_follows_signal() {
        let media = SimulatedMedia::new(1);
        let owners = owners_for(&media);

        assert!(!MediaHasPlayed.get(&owners, None));
        assert!(MediaHasPlayed.get(&owners, Some(&MediaEvent::new(PLAYING))));
        assert!(!MediaHasPlayed.get(&owners, Some(&MediaEvent::new("emptied"))));

        smol::block_on(MediaPaused.set(false, &owners)).unwrap();
        assert!(MediaHasPlayed.get(&owners, None));
    }

    #[test]
    fn test_rejected_play_resolves_ok() {
        let media = SimulatedMedia::new(1);
        media.queue_play_result(Err(DeviceError::NotAllowed("autoplay".into())));
        let owners = owners_for(&media);

        let completion = MediaPaused.set(false, &owners);
        assert!(smol::block_on(completion).is_ok());
        assert!(MediaPaused.get(&owners, None));

        let _ = MediaPaused.set(true, &owners);
        assert_eq!(media.play_requests(), 1);
    }

    #[test]
    fn test_volume_level_buckets() {
        assert_eq!(VolumeLevel::classify(true, 1.0), VolumeLevel::Off);
        assert_eq!(VolumeLevel::classify(false, 0.0), VolumeLevel::Off);
        assert_eq!(VolumeLevel::classify(false, 0.3), VolumeLevel::Low);
        assert_eq!(VolumeLevel::classify(false, 0.5), VolumeLevel::Medium);
        assert_eq!(VolumeLevel::classify(false, 0.74), VolumeLevel::Medium);
        assert_eq!(VolumeLevel::classify(false, 0.75), VolumeLevel::High);
    }

    #[test]
    fn test_volume_set_persists() {
        let media = SimulatedMedia::new(1);
        let store = Arc::new(MemoryPreferenceStore::new());
        let owners = owners_for(&media).with_preferences(store.clone());

        let _ = MediaVolume.set(0.4, &owners);
        assert_eq!(MediaVolume.get(&owners, None), 0.4);
        assert_eq!(store.get_item(VOLUME_PREF_KEY).unwrap().as_deref(), Some("0.4"));

        let _ = MediaVolume.set(f64::NAN, &owners);
        assert_eq!(MediaVolume.get(&owners, None), 0.4);
    }

    struct BlockedStore;

    impl PreferenceStore for BlockedStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("blocked".into()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("blocked".into()))
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("blocked".into()))
        }
    }

    #[test]
    fn test_blocked_storage_never_fails_volume() {
        let media = SimulatedMedia::new(1);
        let owners = owners_for(&media).with_preferences(Arc::new(BlockedStore));

        let completion = MediaVolume.set(0.7, &owners);
        assert!(!completion.is_pending());
        assert!(smol::block_on(completion).is_ok());
        assert_eq!(MediaVolume.get(&owners, None), 0.7);

        let (notify, seen) = {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = seen.clone();
            let notify: Notify = Arc::new(move |update| sink.lock().unwrap().push(update));
            (notify, seen)
        };
        assert!(restore_volume_preference(notify, &owners).is_none());
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(MediaVolume.get(&owners, None), 0.7);
    }

    #[test]
    fn test_volume_set_respects_opt_out() {
        let media = SimulatedMedia::new(1);
        let store = Arc::new(MemoryPreferenceStore::new());
        let options = MediaOptions { no_volume_pref: true, ..Default::default() };
        let owners = owners_for(&media).with_preferences(store.clone()).with_options(options);

        let _ = MediaVolume.set(0.2, &owners);
        assert_eq!(MediaVolume.get(&owners, None), 0.2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_volume_preference_restored() {
        let media = SimulatedMedia::new(1);
        let store = Arc::new(MemoryPreferenceStore::new());
        store.set_item(VOLUME_PREF_KEY, "0.3").unwrap();
        let owners = owners_for(&media).with_preferences(store);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let notify: Notify = Arc::new(move |update| sink.lock().unwrap().push(update));

        for handler in MediaVolume.update_handlers() {
            assert!(handler(notify.clone(), &owners).is_none());
        }

        assert_eq!(MediaVolume.get(&owners, None), 0.3);
        assert_eq!(*seen.lock().unwrap(), vec![StateUpdate::Value(StateValue::Number(0.3))]);
    }

    #[test]
    fn test_malformed_preference_ignored() {
        let media = SimulatedMedia::new(1);
        let store = Arc::new(MemoryPreferenceStore::new());
        store.set_item(VOLUME_PREF_KEY, "loud").unwrap();
        let owners = owners_for(&media).with_preferences(store);
        let notify: Notify = Arc::new(|_| panic!("nothing to report"));

        assert!(restore_volume_preference(notify, &owners).is_none());
        assert_eq!(MediaVolume.get(&owners, None), 1.0);
    }

    #[test]
    fn test_volume_availability() {
        let media = SimulatedMedia::new(1);
        let owners = owners_for(&media);

        assert_eq!(volume_availability(Some(false), &owners), Some(AvailabilityState::Unsupported));
        assert_eq!(volume_availability(None, &owners), None);
        assert_eq!(volume_availability(Some(true), &owners), None);

        let bare = StateOwners::new().with_media(SimulatedMedia::without_transport(2));
        assert_eq!(volume_availability(Some(true), &bare), Some(AvailabilityState::Unsupported));
    }

    #[test]
    fn test_seek_gated_on_ready_state() {
        let media = SimulatedMedia::new(1);
        let owners = owners_for(&media);

        let _ = MediaCurrentTime.set(12.0, &owners);
        assert_eq!(MediaCurrentTime.get(&owners, None), 0.0);

        media.set_ready_state(ReadyState::HaveMetadata);
        let _ = MediaCurrentTime.set(f64::INFINITY, &owners);
        assert_eq!(MediaCurrentTime.get(&owners, None), 0.0);

        let _ = MediaCurrentTime.set(12.0, &owners);
        assert_eq!(MediaCurrentTime.get(&owners, None), 12.0);
    }

    #[test]
    fn test_duration_default() {
        let media = SimulatedMedia::new(1);
        let options = MediaOptions { default_duration: Some(90.0), ..Default::default() };
        let owners = owners_for(&media).with_options(options.clone());

        assert_eq!(MediaDuration.get(&owners, None), 90.0);
        media.set_duration(0.0);
        assert_eq!(MediaDuration.get(&owners, None), 90.0);
        media.set_duration(42.5);
        assert_eq!(MediaDuration.get(&owners, None), 42.5);

        assert_eq!(MediaDuration.get(&StateOwners::new().with_options(options), None), 90.0);
    }

    #[test]
    fn test_loading_by_ready_state() {
        let media = SimulatedMedia::new(1);
        let owners = owners_for(&media);

        assert!(MediaLoading.get(&owners, None));
        media.set_ready_state(ReadyState::HaveFutureData);
        assert!(!MediaLoading.get(&owners, None));
    }

    #[test]
    fn test_seekable_span() {
        let media = SimulatedMedia::new(1);
        let owners = owners_for(&media);
        assert_eq!(MediaSeekable.get(&owners, None), None);

        media.set_seekable(Some(TimeRanges::from_ranges([(0.0, 0.0)])));
        assert_eq!(MediaSeekable.get(&owners, None), None);

        media.set_seekable(Some(TimeRanges::from_ranges([(0.0, 10.12345), (20.0, 30.5)])));
        assert_eq!(MediaSeekable.get(&owners, None), Some((0.0, 30.5)));

        media.set_seekable(Some(TimeRanges::from_ranges([(1.23456, 10.0)])));
        assert_eq!(MediaSeekable.get(&owners, None), Some((1.235, 10.0)));
    }

    #[test]
    fn test_buffered_rounded() {
        let media = SimulatedMedia::new(1);
        media.set_buffered(TimeRanges::from_ranges([(0.0, 4.56789), (10.0, 12.0)]));
        let owners = owners_for(&media);

        assert_eq!(MediaBuffered.get(&owners, None), vec![(0.0, 4.568), (10.0, 12.0)]);
    }

    #[test]
    fn test_error_and_size_facts() {
        let media = SimulatedMedia::new(1);
        media.set_error(Some(MediaError {
            code: Code::Decode,
            message: "bad frame".into(),
        }));
        media.set_video_size(1280, 720);
        media.set_ended(true);
        let owners = owners_for(&media);

        assert_eq!(MediaErrorCode.get(&owners, None), Some(3));
        assert_eq!(MediaErrorMessage.get(&owners, None), "bad frame");
        assert_eq!(MediaVideoWidth.get(&owners, None), 1280);
        assert_eq!(MediaVideoHeight.get(&owners, None), 720);
        assert!(MediaEnded.get(&owners, None));
        assert!(media.paused());
    }
}
