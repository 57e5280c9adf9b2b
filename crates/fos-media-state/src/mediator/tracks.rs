//! Track keys: subtitles, chapters, video renditions and audio tracks.

use std::sync::Arc;

use crate::availability::AvailabilityState;
use crate::descriptor::{
    MutableState, Notify, SetCompletion, StateDescriptor, StateUpdate, Teardown, UpdateHandler,
};
use crate::event::{ADD_TRACK, EventListener, LOAD, MediaEvent, REMOVE_TRACK, RelevantEvents};
use crate::owners::StateOwners;
use crate::subtitles::{showing_subtitle_tracks, subtitle_tracks, toggle_subtitle_tracks, tracks_of_kind};
use crate::tracks::{
    AudioTrackInfo, AudioTrackList, ChapterCue, Rendition, RenditionList, TextTrackInfo,
    TextTrackKind,
};

fn rendition_list(owners: &StateOwners) -> Option<&dyn RenditionList> {
    owners.media.as_deref()?.video_renditions()
}

fn audio_track_list(owners: &StateOwners) -> Option<&dyn AudioTrackList> {
    owners.media.as_deref()?.audio_tracks()
}

// ============================================================================
// Text tracks
// ============================================================================

const SUBTITLES_EVENTS: RelevantEvents = RelevantEvents {
    text_tracks: &["addtrack", "removetrack", "change"],
    ..RelevantEvents::NONE
};

pub struct MediaSubtitlesList;

impl StateDescriptor for MediaSubtitlesList {
    const NAME: &'static str = "media_subtitles_list";
    type Value = Vec<TextTrackInfo>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Vec<TextTrackInfo> {
        subtitle_tracks(owners)
            .iter()
            .map(|track| TextTrackInfo::of(track.as_ref()))
            .collect()
    }

    fn events(&self) -> &'static RelevantEvents {
        &SUBTITLES_EVENTS
    }
}

/// Auto-enable captions when configured, now and whenever tracks change
fn show_default_subtitles(_notify: Notify, owners: &StateOwners) -> Option<Teardown> {
    if !owners.options.default_subtitles {
        return None;
    }
    let media = owners.media.clone()?;

    toggle_subtitle_tracks(owners, Some(true));

    let list = media.text_tracks()?;
    let watched = owners.clone();
    let listener: EventListener = Arc::new(move |event: &MediaEvent| {
        if event.track_kind.is_some_and(|kind| !kind.is_subtitle_like()) {
            return;
        }
        toggle_subtitle_tracks(&watched, Some(true));
    });
    let added = list.add_event_listener(ADD_TRACK, listener.clone());
    let removed = list.add_event_listener(REMOVE_TRACK, listener);

    Some(Teardown::new(move || {
        if let Some(list) = media.text_tracks() {
            list.remove_event_listener(ADD_TRACK, added);
            list.remove_event_listener(REMOVE_TRACK, removed);
        }
    }))
}

pub struct MediaSubtitlesShowing;

impl StateDescriptor for MediaSubtitlesShowing {
    const NAME: &'static str = "media_subtitles_showing";
    type Value = Vec<TextTrackInfo>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Vec<TextTrackInfo> {
        showing_subtitle_tracks(owners)
            .iter()
            .map(|track| TextTrackInfo::of(track.as_ref()))
            .collect()
    }

    fn events(&self) -> &'static RelevantEvents {
        &SUBTITLES_EVENTS
    }

    fn update_handlers(&self) -> &'static [UpdateHandler] {
        &[show_default_subtitles]
    }
}

const CHAPTERS_EVENTS: RelevantEvents = RelevantEvents {
    media: &["loadstart", "loadedmetadata"],
    text_tracks: &["addtrack", "removetrack", "change"],
    ..RelevantEvents::NONE
};

/// Report out-of-band chapter tracks finishing their load
fn watch_chapters_load(notify: Notify, owners: &StateOwners) -> Option<Teardown> {
    let media = owners.media.as_deref()?;

    let mut registrations = Vec::new();
    for track in tracks_of_kind(media, TextTrackKind::Chapters) {
        let Some(source) = track.load_events() else {
            continue;
        };
        let notify = notify.clone();
        let id = source.add_event_listener(
            LOAD,
            Arc::new(move |event: &MediaEvent| notify(StateUpdate::Signal(event.clone()))),
        );
        registrations.push((track.clone(), id));
    }

    if registrations.is_empty() {
        return None;
    }
    Some(Teardown::new(move || {
        for (track, id) in registrations {
            if let Some(source) = track.load_events() {
                source.remove_event_listener(LOAD, id);
            }
        }
    }))
}

/// Cues of the first chapters track
pub struct MediaChaptersCues;

impl StateDescriptor for MediaChaptersCues {
    const NAME: &'static str = "media_chapters_cues";
    type Value = Vec<ChapterCue>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Vec<ChapterCue> {
        let Some(media) = owners.media.as_deref() else {
            return Vec::new();
        };
        tracks_of_kind(media, TextTrackKind::Chapters)
            .first()
            .map(|track| track.cues().iter().map(ChapterCue::from).collect())
            .unwrap_or_default()
    }

    fn events(&self) -> &'static RelevantEvents {
        &CHAPTERS_EVENTS
    }

    fn update_handlers(&self) -> &'static [UpdateHandler] {
        &[watch_chapters_load]
    }
}

// ============================================================================
// Renditions
// ============================================================================

const RENDITION_LIST_EVENTS: RelevantEvents = RelevantEvents {
    media: &["emptied", "loadstart"],
    video_renditions: &["addrendition", "removerendition"],
    ..RelevantEvents::NONE
};

pub struct MediaRenditionList;

impl StateDescriptor for MediaRenditionList {
    const NAME: &'static str = "media_rendition_list";
    type Value = Vec<Rendition>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Vec<Rendition> {
        rendition_list(owners)
            .map(|list| list.renditions())
            .unwrap_or_default()
    }

    fn events(&self) -> &'static RelevantEvents {
        &RENDITION_LIST_EVENTS
    }
}

const RENDITION_SELECTED_EVENTS: RelevantEvents = RelevantEvents {
    media: &["emptied"],
    video_renditions: &["addrendition", "removerendition", "change"],
    ..RelevantEvents::NONE
};

/// Identifier of the selected rendition; unset means automatic
pub struct MediaRenditionSelected;

impl StateDescriptor for MediaRenditionSelected {
    const NAME: &'static str = "media_rendition_selected";
    type Value = Option<String>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<String> {
        let list = rendition_list(owners)?;
        let index = list.selected_index()?;
        list.renditions().into_iter().nth(index).map(|r| r.id)
    }

    fn events(&self) -> &'static RelevantEvents {
        &RENDITION_SELECTED_EVENTS
    }
}

impl MutableState for MediaRenditionSelected {
    type Input = Option<String>;

    fn set(&self, id: Option<String>, owners: &StateOwners) -> SetCompletion {
        let Some(list) = rendition_list(owners) else {
            tracing::warn!("Rendition selection is not supported by this media");
            return SetCompletion::done();
        };

        // Unknown identifiers fall back to automatic selection
        let index = id.as_deref().and_then(|id| {
            list.renditions()
                .iter()
                .position(|rendition| rendition.id == id)
        });
        if list.selected_index() != index {
            list.set_selected_index(index);
        }
        SetCompletion::done()
    }
}

pub struct MediaRenditionUnavailable;

impl StateDescriptor for MediaRenditionUnavailable {
    const NAME: &'static str = "media_rendition_unavailable";
    type Value = Option<AvailabilityState>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<AvailabilityState> {
        let Some(list) = rendition_list(owners) else {
            return Some(AvailabilityState::Unsupported);
        };
        if list.renditions().is_empty() {
            Some(AvailabilityState::Unavailable)
        } else {
            None
        }
    }

    fn events(&self) -> &'static RelevantEvents {
        &RENDITION_LIST_EVENTS
    }
}

// ============================================================================
// Audio tracks
// ============================================================================

const AUDIO_TRACK_LIST_EVENTS: RelevantEvents = RelevantEvents {
    media: &["emptied", "loadstart"],
    audio_tracks: &["addtrack", "removetrack"],
    ..RelevantEvents::NONE
};

pub struct MediaAudioTrackList;

impl StateDescriptor for MediaAudioTrackList {
    const NAME: &'static str = "media_audio_track_list";
    type Value = Vec<AudioTrackInfo>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Vec<AudioTrackInfo> {
        audio_track_list(owners)
            .map(|list| {
                list.tracks()
                    .iter()
                    .map(|track| AudioTrackInfo::of(track.as_ref()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn events(&self) -> &'static RelevantEvents {
        &AUDIO_TRACK_LIST_EVENTS
    }
}

const AUDIO_TRACK_ENABLED_EVENTS: RelevantEvents = RelevantEvents {
    media: &["emptied"],
    audio_tracks: &["addtrack", "removetrack", "change"],
    ..RelevantEvents::NONE
};

/// Identifier of the enabled audio track
pub struct MediaAudioTrackEnabled;

impl StateDescriptor for MediaAudioTrackEnabled {
    const NAME: &'static str = "media_audio_track_enabled";
    type Value = Option<String>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<String> {
        audio_track_list(owners)?
            .tracks()
            .iter()
            .find(|track| track.enabled())
            .map(|track| track.id())
    }

    fn events(&self) -> &'static RelevantEvents {
        &AUDIO_TRACK_ENABLED_EVENTS
    }
}

impl MutableState for MediaAudioTrackEnabled {
    type Input = Option<String>;

    fn set(&self, id: Option<String>, owners: &StateOwners) -> SetCompletion {
        let Some(list) = audio_track_list(owners) else {
            tracing::warn!("Audio track selection is not supported by this media");
            return SetCompletion::done();
        };

        for track in list.tracks() {
            let enable = id.as_deref().is_some_and(|id| track.id() == id);
            if track.enabled() != enable {
                track.set_enabled(enable);
            }
        }
        SetCompletion::done()
    }
}

pub struct MediaAudioTrackUnavailable;

impl StateDescriptor for MediaAudioTrackUnavailable {
    const NAME: &'static str = "media_audio_track_unavailable";
    type Value = Option<AvailabilityState>;

    fn get(&self, owners: &StateOwners, _signal: Option<&MediaEvent>) -> Option<AvailabilityState> {
        let Some(list) = audio_track_list(owners) else {
            return Some(AvailabilityState::Unsupported);
        };
        // A single track leaves nothing to choose between
        if list.tracks().len() <= 1 {
            Some(AvailabilityState::Unavailable)
        } else {
            None
        }
    }

    fn events(&self) -> &'static RelevantEvents {
        &AUDIO_TRACK_LIST_EVENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owners::MediaOptions;
    use crate::simulated::{SimulatedAudioTrack, SimulatedMedia, SimulatedTextTrack};
    use crate::tracks::{AudioTrack, TextTrack, TextTrackMode};
    use std::sync::Mutex;

    fn collector() -> (Notify, Arc<Mutex<Vec<StateUpdate>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let notify: Notify = Arc::new(move |update| sink.lock().unwrap().push(update));
        (notify, seen)
    }

    #[test]
    fn test_subtitle_lists() {
        let media = SimulatedMedia::new(1);
        let list = media.enable_text_tracks();
        let english = SimulatedTextTrack::new(TextTrackKind::Subtitles, "English", "en");
        list.add_track(english.clone());
        list.add_track(SimulatedTextTrack::new(TextTrackKind::Metadata, "cues", ""));
        let owners = StateOwners::new().with_media(media.clone());

        let all = MediaSubtitlesList.get(&owners, None);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].language, "en");
        assert!(MediaSubtitlesShowing.get(&owners, None).is_empty());

        english.set_mode(TextTrackMode::Showing);
        assert_eq!(MediaSubtitlesShowing.get(&owners, None)[0].label, "English");
    }

    #[test]
    fn test_default_subtitles_handler() {
        let media = SimulatedMedia::new(1);
        let list = media.enable_text_tracks();
        let options = MediaOptions { default_subtitles: true, ..Default::default() };
        let owners = StateOwners::new().with_media(media.clone()).with_options(options);
        let (notify, _) = collector();

        let teardown = show_default_subtitles(notify, &owners).unwrap();
        assert_eq!(list.listener_count(ADD_TRACK), 1);

        let captions = SimulatedTextTrack::new(TextTrackKind::Captions, "CC", "en");
        list.add_track(captions.clone());
        assert_eq!(captions.mode(), TextTrackMode::Showing);

        teardown.run();
        assert_eq!(list.listener_count(ADD_TRACK), 0);
        assert_eq!(list.listener_count(REMOVE_TRACK), 0);
    }

    #[test]
    fn test_default_subtitles_after_track_removed() {
        let media = SimulatedMedia::new(1);
        let list = media.enable_text_tracks();
        let english = SimulatedTextTrack::new(TextTrackKind::Captions, "English CC", "en");
        let french = SimulatedTextTrack::new(TextTrackKind::Captions, "French CC", "fr");
        list.add_track(english.clone());
        list.add_track(french.clone());
        let options = MediaOptions { default_subtitles: true, ..Default::default() };
        let owners = StateOwners::new().with_media(media.clone()).with_options(options);
        let (notify, _) = collector();

        let teardown = show_default_subtitles(notify, &owners).unwrap();
        assert_eq!(english.mode(), TextTrackMode::Showing);
        assert_eq!(french.mode(), TextTrackMode::Disabled);

        list.remove_track("English CC");
        assert_eq!(french.mode(), TextTrackMode::Showing);
        assert_eq!(french.mode_writes(), 1);

        teardown.run();
    }

    #[test]
    fn test_default_subtitles_ignores_other_kinds() {
        let media = SimulatedMedia::new(1);
        let list = media.enable_text_tracks();
        let captions = SimulatedTextTrack::new(TextTrackKind::Captions, "CC", "en");
        list.add_track(captions.clone());
        let options = MediaOptions { default_subtitles: true, ..Default::default() };
        let owners = StateOwners::new().with_media(media.clone()).with_options(options);
        let (notify, _) = collector();

        let teardown = show_default_subtitles(notify, &owners).unwrap();
        assert_eq!(captions.mode_writes(), 1);

        // Viewer turned captions off
        captions.set_mode(TextTrackMode::Disabled);

        let chapters = SimulatedTextTrack::new(TextTrackKind::Chapters, "Chapters", "en");
        list.add_track(chapters.clone());
        list.add_track(SimulatedTextTrack::new(TextTrackKind::Metadata, "ads", ""));
        list.remove_track("ads");
        assert_eq!(captions.mode(), TextTrackMode::Disabled);
        assert_eq!(captions.mode_writes(), 2);
        assert_eq!(chapters.mode(), TextTrackMode::Disabled);
        assert_eq!(chapters.mode_writes(), 0);

        list.add_track(SimulatedTextTrack::new(TextTrackKind::Subtitles, "Spanish", "es"));
        assert_eq!(captions.mode(), TextTrackMode::Showing);

        teardown.run();
    }

    #[test]
    fn test_default_subtitles_off_installs_nothing() {
        let media = SimulatedMedia::new(1);
        let list = media.enable_text_tracks();
        let owners = StateOwners::new().with_media(media.clone());
        let (notify, _) = collector();

        assert!(show_default_subtitles(notify, &owners).is_none());
        assert_eq!(list.listener_count(ADD_TRACK), 0);
    }

    #[test]
    fn test_chapter_cues_and_load_signal() {
        let media = SimulatedMedia::new(1);
        let list = media.enable_text_tracks();
        let chapters = SimulatedTextTrack::with_source(TextTrackKind::Chapters, "Chapters", "en");
        list.add_track(chapters.clone());
        let owners = StateOwners::new().with_media(media.clone());
        let (notify, seen) = collector();

        let teardown = watch_chapters_load(notify, &owners).unwrap();
        chapters.add_cue(0.0, 12.0, "Intro");
        chapters.add_cue(12.0, 40.0, "Main");
        chapters.fire_load();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![StateUpdate::Signal(MediaEvent::new(LOAD))]
        );
        let cues = MediaChaptersCues.get(&owners, None);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "Main");

        teardown.run();
        assert_eq!(chapters.load_listener_count(), 0);
    }

    #[test]
    fn test_rendition_selection() {
        let media = SimulatedMedia::new(1);
        let renditions = media.enable_renditions();
        renditions.add_rendition(Rendition::new("360").with_size(640, 360));
        renditions.add_rendition(Rendition::new("720").with_size(1280, 720));
        let owners = StateOwners::new().with_media(media.clone());

        assert_eq!(MediaRenditionList.get(&owners, None).len(), 2);
        assert_eq!(MediaRenditionSelected.get(&owners, None), None);

        let _ = MediaRenditionSelected.set(Some("720".into()), &owners);
        let _ = MediaRenditionSelected.set(Some("720".into()), &owners);
        assert_eq!(MediaRenditionSelected.get(&owners, None).as_deref(), Some("720"));
        assert_eq!(renditions.selection_writes(), 1);

        let _ = MediaRenditionSelected.set(Some("4k".into()), &owners);
        assert_eq!(MediaRenditionSelected.get(&owners, None), None);
        assert_eq!(renditions.selection_writes(), 2);
    }

    #[test]
    fn test_rendition_ids_compare_exactly() {
        let media = SimulatedMedia::new(1);
        let renditions = media.enable_renditions();
        renditions.add_rendition(Rendition::new("1"));
        renditions.add_rendition(Rendition::new("01"));
        renditions.add_rendition(Rendition::new("1.0"));
        let owners = StateOwners::new().with_media(media.clone());

        for id in ["01", "1.0", "1"] {
            let _ = MediaRenditionSelected.set(Some(id.into()), &owners);
            assert_eq!(MediaRenditionSelected.get(&owners, None).as_deref(), Some(id));
        }

        let _ = MediaRenditionSelected.set(Some(" 1".into()), &owners);
        assert_eq!(MediaRenditionSelected.get(&owners, None), None);
    }

    #[test]
    fn test_rendition_unavailable() {
        assert_eq!(
            MediaRenditionUnavailable.get(&StateOwners::new(), None),
            Some(AvailabilityState::Unsupported)
        );

        let media = SimulatedMedia::new(1);
        let renditions = media.enable_renditions();
        let owners = StateOwners::new().with_media(media.clone());
        assert_eq!(
            MediaRenditionUnavailable.get(&owners, None),
            Some(AvailabilityState::Unavailable)
        );

        renditions.add_rendition(Rendition::new("1080"));
        assert_eq!(MediaRenditionUnavailable.get(&owners, None), None);
    }

    #[test]
    fn test_audio_track_selection() {
        let media = SimulatedMedia::new(1);
        let list = media.enable_audio_tracks();
        let main = SimulatedAudioTrack::new("1", "Main", "en", true);
        let commentary = SimulatedAudioTrack::new("2", "Commentary", "en", false);
        list.add_track(main.clone());
        list.add_track(commentary.clone());
        let owners = StateOwners::new().with_media(media.clone());

        assert_eq!(MediaAudioTrackEnabled.get(&owners, None).as_deref(), Some("1"));
        assert_eq!(MediaAudioTrackUnavailable.get(&owners, None), None);

        let _ = MediaAudioTrackEnabled.set(Some("2".into()), &owners);
        assert!(!main.enabled());
        assert!(commentary.enabled());
        assert_eq!(MediaAudioTrackEnabled.get(&owners, None).as_deref(), Some("2"));

        let infos = MediaAudioTrackList.get(&owners, None);
        assert_eq!(infos.iter().filter(|info| info.enabled).count(), 1);
    }

    #[test]
    fn test_audio_track_ids_compare_exactly() {
        let media = SimulatedMedia::new(1);
        let list = media.enable_audio_tracks();
        let plain = SimulatedAudioTrack::new("1", "Main", "en", false);
        let decimal = SimulatedAudioTrack::new("1.0", "Descriptive", "en", false);
        let padded = SimulatedAudioTrack::new("01", "Commentary", "en", false);
        list.add_track(plain.clone());
        list.add_track(decimal.clone());
        list.add_track(padded.clone());
        let owners = StateOwners::new().with_media(media.clone());

        let _ = MediaAudioTrackEnabled.set(Some("1.0".into()), &owners);
        assert!(!plain.enabled());
        assert!(decimal.enabled());
        assert!(!padded.enabled());
        assert_eq!(MediaAudioTrackEnabled.get(&owners, None).as_deref(), Some("1.0"));

        let _ = MediaAudioTrackEnabled.set(Some("1".into()), &owners);
        let enabled: Vec<bool> = [&plain, &decimal, &padded].iter().map(|t| t.enabled()).collect();
        assert_eq!(enabled, vec![true, false, false]);
    }

    #[test]
    fn test_audio_track_unavailable() {
        assert_eq!(
            MediaAudioTrackUnavailable.get(&StateOwners::new(), None),
            Some(AvailabilityState::Unsupported)
        );

        let media = SimulatedMedia::new(1);
        let list = media.enable_audio_tracks();
        list.add_track(SimulatedAudioTrack::new("1", "Main", "en", true));
        let owners = StateOwners::new().with_media(media.clone());
        assert_eq!(
            MediaAudioTrackUnavailable.get(&owners, None),
            Some(AvailabilityState::Unavailable)
        );
    }

    #[test]
    fn test_track_setters_without_capability() {
        let owners = StateOwners::new().with_media(SimulatedMedia::new(1));
        assert!(!MediaRenditionSelected.set(Some("1".into()), &owners).is_pending());
        assert!(!MediaAudioTrackEnabled.set(None, &owners).is_pending());
    }
}
