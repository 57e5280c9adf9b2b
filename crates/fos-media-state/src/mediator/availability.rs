//! Capability availability keys for fullscreen, picture-in-picture, cast
//! and AirPlay. Each key is a thin wrapper over a function that takes the
//! platform explicitly.

use crate::availability::{Availability, AvailabilityState};
use crate::descriptor::{StateDescriptor, UpdateHandler};
use crate::event::{CAST_AVAILABILITY_CHANGE, MediaEvent};
use crate::owners::StateOwners;
use crate::platform::{Platform, has_fullscreen_support, has_pip_support, platform};
use crate::remote::watch_remote_availability;

fn signalled_availability(signal: Option<&MediaEvent>) -> Option<Availability> {
    signal
        .filter(|event| event.is(CAST_AVAILABILITY_CHANGE))
        .and_then(|event| event.availability)
}

pub fn fullscreen_availability(platform: &dyn Platform, owners: &StateOwners) -> Option<AvailabilityState> {
    if has_fullscreen_support(platform, owners.media.as_deref()) {
        None
    } else {
        Some(AvailabilityState::Unsupported)
    }
}

pub fn pip_availability(platform: &dyn Platform, owners: &StateOwners) -> Option<AvailabilityState> {
    if has_pip_support(platform, owners.media.as_deref()) {
        None
    } else {
        Some(AvailabilityState::Unsupported)
    }
}

/// Cast availability; without a signal the target is assumed unreachable
pub fn cast_availability(
    platform: &dyn Platform,
    owners: &StateOwners,
    signal: Option<&MediaEvent>,
) -> Option<AvailabilityState> {
    let has_remote = owners.media.as_deref().is_some_and(|media| media.remote().is_some());
    if !platform.cast_supported() || !has_remote {
        return Some(AvailabilityState::Unsupported);
    }
    match signalled_availability(signal).unwrap_or(Availability::NotAvailable) {
        Availability::NotAvailable => Some(AvailabilityState::Unavailable),
        Availability::Available | Availability::Indeterminate => None,
    }
}

/// AirPlay availability; only an explicit "not available" marks it unavailable
pub fn airplay_availability(platform: &dyn Platform, signal: Option<&MediaEvent>) -> Option<AvailabilityState> {
    if !platform.airplay_supported() {
        return Some(AvailabilityState::Unsupported);
    }
    match signalled_availability(signal) {
        Some(Availability::NotAvailable) => Some(AvailabilityState::Unavailable),
        _ => None,
    }
}

pub struct MediaFullscreenUnavailable;

impl StateDescriptor for MediaFullscreenUnavailable {
    const NAME: &'static str = "media_fullscreen_unavailable";
    type Value = Option<AvailabilityState>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<AvailabilityState> {
        fullscreen_availability(platform().as_ref(), owners)
    }
}

pub struct MediaPipUnavailable;

impl StateDescriptor for MediaPipUnavailable {
    const NAME: &'static str = "media_pip_unavailable";
    type Value = Option<AvailabilityState>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<AvailabilityState> {
        pip_availability(platform().as_ref(), owners)
    }
}

pub struct MediaCastUnavailable;

impl StateDescriptor for MediaCastUnavailable {
    const NAME: &'static str = "media_cast_unavailable";
    type Value = Option<AvailabilityState>;

    fn get(&self, owners: &StateOwners, signal: Option<&MediaEvent>) -> Option<AvailabilityState> {
        cast_availability(platform().as_ref(), owners, signal)
    }

    fn update_handlers(&self) -> &'static [UpdateHandler] {
        &[watch_remote_availability]
    }
}

pub struct MediaAirplayUnavailable;

impl StateDescriptor for MediaAirplayUnavailable {
    const NAME: &'static str = "media_airplay_unavailable";
    type Value = Option<AvailabilityState>;

    fn get(&self, _owners: &StateOwners, signal: Option<&MediaEvent>) -> Option<AvailabilityState> {
        airplay_availability(platform().as_ref(), signal)
    }

    fn update_handlers(&self) -> &'static [UpdateHandler] {
        &[watch_remote_availability]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FixedPlatform;
    use crate::simulated::SimulatedMedia;

    fn availability_signal(availability: Availability) -> MediaEvent {
        MediaEvent::new(CAST_AVAILABILITY_CHANGE).with_availability(availability)
    }

    #[test]
    fn test_fullscreen_and_pip_availability() {
        let media = SimulatedMedia::new(1);
        let owners = StateOwners::new().with_media(media.clone());
        let headless = FixedPlatform::headless();

        assert_eq!(fullscreen_availability(&headless, &owners), Some(AvailabilityState::Unsupported));
        assert_eq!(fullscreen_availability(&FixedPlatform::desktop(), &owners), None);
        media.enable_legacy_fullscreen();
        assert_eq!(fullscreen_availability(&headless, &owners), None);

        assert_eq!(pip_availability(&FixedPlatform::desktop(), &owners), Some(AvailabilityState::Unsupported));
        media.enable_picture_in_picture();
        assert_eq!(pip_availability(&FixedPlatform::desktop(), &owners), None);
    }

    #[test]
    fn test_cast_availability() {
        let desktop = FixedPlatform::desktop();
        let media = SimulatedMedia::new(1);
        let owners = StateOwners::new().with_media(media.clone());
        assert_eq!(cast_availability(&desktop, &owners, None), Some(AvailabilityState::Unsupported));

        media.enable_remote();
        assert_eq!(cast_availability(&FixedPlatform::headless(), &owners, None), Some(AvailabilityState::Unsupported));
        assert_eq!(cast_availability(&desktop, &owners, None), Some(AvailabilityState::Unavailable));

        let available = availability_signal(Availability::Available);
        assert_eq!(cast_availability(&desktop, &owners, Some(&available)), None);

        let unknown = availability_signal(Availability::Indeterminate);
        assert_eq!(cast_availability(&desktop, &owners, Some(&unknown)), None);
    }

    #[test]
    fn test_airplay_availability() {
        let airplay = FixedPlatform { airplay: true, ..FixedPlatform::headless() };

        assert_eq!(airplay_availability(&FixedPlatform::desktop(), None), Some(AvailabilityState::Unsupported));
        assert_eq!(airplay_availability(&airplay, None), None);

        let gone = availability_signal(Availability::NotAvailable);
        assert_eq!(airplay_availability(&airplay, Some(&gone)), Some(AvailabilityState::Unavailable));
    }
}
