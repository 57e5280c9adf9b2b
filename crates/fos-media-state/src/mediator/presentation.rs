//! Presentation keys: fullscreen, picture-in-picture, casting, AirPlay.

use std::sync::Arc;
use std::time::Duration;

use crate::MediaStateError;
use crate::descriptor::{MutableState, SetCompletion, StateDescriptor};
use crate::device::{DeviceError, DeviceRequest, MediaDevice, PreloadHint, ReadyState};
use crate::event::{
    EventListener, LOADED_METADATA, ListenerId, MediaEvent, RelevantEvents,
    WEBKIT_BEGIN_FULLSCREEN, WEBKIT_END_FULLSCREEN,
};
use crate::overlay::{is_fullscreen, is_picture_in_picture};
use crate::owners::StateOwners;
use crate::platform::{Platform, platform};
use crate::remote::RemotePlaybackState;

/// Await a host request whose rejection is expected and uninteresting
fn swallowed(request: DeviceRequest, action: &'static str) -> SetCompletion {
    SetCompletion::pending(async move {
        if let Err(e) = request.await {
            tracing::debug!("{} rejected: {}", action, e);
        }
        Ok(())
    })
}

// ============================================================================
// Fullscreen
// ============================================================================

const FULLSCREEN_EVENTS: RelevantEvents = RelevantEvents {
    media: &[WEBKIT_BEGIN_FULLSCREEN, WEBKIT_END_FULLSCREEN],
    root: &["fullscreenchange", "webkitfullscreenchange"],
    ..RelevantEvents::NONE
};

pub struct MediaIsFullscreen;

impl StateDescriptor for MediaIsFullscreen {
    const NAME: &'static str = "media_is_fullscreen";
    type Value = bool;

    fn get(&self, owners: &StateOwners, signal: Option<&MediaEvent>) -> bool {
        if owners.media.is_none() {
            return false;
        }
        // The mobile video API only reports through its own events
        match signal {
            Some(event) if event.is(WEBKIT_BEGIN_FULLSCREEN) => true,
            Some(event) if event.is(WEBKIT_END_FULLSCREEN) => false,
            _ => is_fullscreen(owners),
        }
    }

    fn events(&self) -> &'static RelevantEvents {
        &FULLSCREEN_EVENTS
    }
}

impl MutableState for MediaIsFullscreen {
    type Input = bool;

    fn set(&self, fullscreen: bool, owners: &StateOwners) -> SetCompletion {
        if !fullscreen {
            return match owners.document.as_ref().and_then(|d| d.exit_fullscreen()) {
                Some(request) => swallowed(request, "Exit fullscreen"),
                None => SetCompletion::done(),
            };
        }

        let Some(media) = owners.media.as_deref() else {
            return SetCompletion::done();
        };

        if let Some(request) = owners
            .fullscreen_element
            .as_ref()
            .and_then(|target| target.request_fullscreen())
        {
            return swallowed(request, "Fullscreen request");
        }
        if let Some(legacy) = media.legacy_fullscreen().filter(|l| l.supports_fullscreen()) {
            legacy.enter_fullscreen();
            return SetCompletion::done();
        }
        match media.element().and_then(|element| element.request_fullscreen()) {
            Some(request) => swallowed(request, "Fullscreen request"),
            None => {
                tracing::warn!("Fullscreen is not supported by this media");
                SetCompletion::done()
            }
        }
    }
}

// ============================================================================
// Picture-in-picture
// ============================================================================

const PIP_EVENTS: RelevantEvents = RelevantEvents {
    media: &["enterpictureinpicture", "leavepictureinpicture"],
    ..RelevantEvents::NONE
};

pub struct MediaIsPip;

impl StateDescriptor for MediaIsPip {
    const NAME: &'static str = "media_is_pip";
    type Value = bool;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> bool {
        is_picture_in_picture(owners)
    }

    fn events(&self) -> &'static RelevantEvents {
        &PIP_EVENTS
    }
}

impl MutableState for MediaIsPip {
    type Input = bool;

    fn set(&self, pip: bool, owners: &StateOwners) -> SetCompletion {
        if pip {
            enter_picture_in_picture(platform().as_ref(), owners)
        } else {
            exit_picture_in_picture(owners)
        }
    }
}

/// Request PiP, retrying once after metadata loads if the device had
/// nothing loaded yet
pub fn enter_picture_in_picture(platform: &dyn Platform, owners: &StateOwners) -> SetCompletion {
    let Some(media) = owners.media.clone() else {
        return SetCompletion::done();
    };
    let request = match media.picture_in_picture() {
        Some(pip) if platform.picture_in_picture_enabled() => pip.request_picture_in_picture(),
        _ => {
            tracing::warn!("Picture-in-picture is not supported");
            return SetCompletion::done();
        }
    };

    let timeout = owners.options.pip_ready_timeout();
    SetCompletion::pending(async move {
        match request.await {
            Ok(()) => Ok(()),
            Err(DeviceError::InvalidState(reason)) => retry_when_ready(media, timeout, reason).await,
            Err(e) => Err(e.into()),
        }
    })
}

/// Listener and preload override held while waiting for metadata
struct MetadataWait {
    media: Arc<dyn MediaDevice>,
    listener: ListenerId,
}

impl Drop for MetadataWait {
    fn drop(&mut self) {
        self.media.remove_event_listener(LOADED_METADATA, self.listener);
        if let Some(transport) = self.media.transport() {
            transport.set_preload(PreloadHint::None);
        }
    }
}

async fn retry_when_ready(
    media: Arc<dyn MediaDevice>,
    timeout: Duration,
    reason: String,
) -> Result<(), MediaStateError> {
    let Some(transport) = media.transport() else {
        return Err(DeviceError::InvalidState(reason).into());
    };
    if transport.src().is_none() {
        tracing::warn!("Unable to enter picture-in-picture: no source");
        return Ok(());
    }
    if transport.ready_state() != ReadyState::HaveNothing || transport.preload() != PreloadHint::None {
        return Err(DeviceError::InvalidState(reason).into());
    }

    let (sender, receiver) = smol::channel::bounded::<()>(1);
    let listener: EventListener = Arc::new(move |_event: &MediaEvent| {
        let _ = sender.try_send(());
    });
    let wait = MetadataWait {
        listener: media.add_event_listener(LOADED_METADATA, listener),
        media: media.clone(),
    };
    transport.set_preload(PreloadHint::Metadata);
    tracing::debug!("Loading metadata before retrying picture-in-picture");

    let loaded = smol::future::or(async { receiver.recv().await.is_ok() }, async {
        smol::Timer::after(timeout).await;
        false
    })
    .await;

    if !loaded {
        drop(wait);
        if transport.ready_state() == ReadyState::HaveNothing {
            tracing::warn!("Media not ready for picture-in-picture: no metadata after {:?}", timeout);
        }
        return Ok(());
    }

    let retry = media.picture_in_picture().map(|pip| pip.request_picture_in_picture());
    drop(wait);
    if let Some(retry) = retry {
        if let Err(e) = retry.await {
            tracing::warn!("Media not ready for picture-in-picture: {}", e);
        }
    }
    Ok(())
}

fn exit_picture_in_picture(owners: &StateOwners) -> SetCompletion {
    let Some(document) = &owners.document else {
        return SetCompletion::done();
    };
    if document.picture_in_picture_element().is_none() {
        return SetCompletion::done();
    }
    let Some(request) = document.exit_picture_in_picture() else {
        return SetCompletion::done();
    };
    SetCompletion::pending(async move {
        match request.await {
            Ok(()) => Ok(()),
            // Already left by other means
            Err(DeviceError::InvalidState(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    })
}

// ============================================================================
// Remote playback
// ============================================================================

const CASTING_EVENTS: RelevantEvents = RelevantEvents {
    remote: &["connecting", "connect", "disconnect"],
    ..RelevantEvents::NONE
};

/// Connecting or connected to a cast target
pub struct MediaIsCasting;

impl StateDescriptor for MediaIsCasting {
    const NAME: &'static str = "media_is_casting";
    type Value = bool;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> bool {
        owners
            .media
            .as_deref()
            .and_then(|media| media.remote())
            .is_some_and(|remote| remote.state() != RemotePlaybackState::Disconnected)
    }

    fn events(&self) -> &'static RelevantEvents {
        &CASTING_EVENTS
    }
}

impl MutableState for MediaIsCasting {
    type Input = bool;

    fn set(&self, casting: bool, owners: &StateOwners) -> SetCompletion {
        let Some(remote) = owners.media.as_deref().and_then(|media| media.remote()) else {
            tracing::warn!("Casting is not supported");
            return SetCompletion::done();
        };

        let state = remote.state();
        if casting && state != RemotePlaybackState::Disconnected {
            return SetCompletion::done();
        }
        if !casting && state != RemotePlaybackState::Connected {
            return SetCompletion::done();
        }

        match remote.prompt() {
            Some(request) => swallowed(request, "Cast prompt"),
            None => {
                tracing::warn!("Casting is not supported");
                SetCompletion::done()
            }
        }
    }
}

const AIRPLAY_EVENTS: RelevantEvents = RelevantEvents {
    media: &["webkitcurrentplaybacktargetiswirelesschanged"],
    ..RelevantEvents::NONE
};

pub struct MediaIsAirplaying;

impl StateDescriptor for MediaIsAirplaying {
    const NAME: &'static str = "media_is_airplaying";
    type Value = bool;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> bool {
        owners
            .media
            .as_deref()
            .and_then(|media| media.wireless_target())
            .is_some_and(|target| target.current_target_is_wireless())
    }

    fn events(&self) -> &'static RelevantEvents {
        &AIRPLAY_EVENTS
    }
}

impl MutableState for MediaIsAirplaying {
    type Input = bool;

    fn set(&self, _airplaying: bool, owners: &StateOwners) -> SetCompletion {
        show_airplay_picker(platform().as_ref(), owners);
        SetCompletion::done()
    }
}

/// The picker handles both connecting and disconnecting
pub fn show_airplay_picker(platform: &dyn Platform, owners: &StateOwners) {
    let target = owners.media.as_deref().and_then(|media| media.wireless_target());
    match target {
        Some(target) if platform.airplay_supported() => target.show_playback_target_picker(),
        _ => tracing::warn!("AirPlay is not supported"),
    }
}
