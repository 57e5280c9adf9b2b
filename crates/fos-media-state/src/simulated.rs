//! Simulated Host
//!
//! In-memory owners for tests and headless hosts. Every capability group of
//! the device can be switched on individually, operations record how often
//! they were called, and request outcomes can be queued ahead of time.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::device::{
    DeviceError, DeviceRequest, LegacyFullscreen, LiveStream, MediaDevice, MediaError,
    PictureInPicture, PreloadHint, PresentationMode, ReadyState, StreamType, TimeRanges, Transport,
    WirelessPlaybackTarget, fulfilled,
};
use crate::event::{
    ADD_TRACK, EventListener, EventTarget, LOAD, ListenerId, MediaEvent, REMOVE_TRACK,
    WEBKIT_BEGIN_FULLSCREEN,
};
use crate::overlay::{ElementId, HostElement, OverlayContext, RootContext};
use crate::remote::{AvailabilityCallback, RemotePlayback, RemotePlaybackState, WatchId};
use crate::tracks::{
    AudioTrack, AudioTrackList, Rendition, RenditionList, TextTrack, TextTrackCue, TextTrackKind,
    TextTrackList, TextTrackMode,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn outcome(queue: &Mutex<VecDeque<Result<(), DeviceError>>>) -> Result<(), DeviceError> {
    lock(queue).pop_front().unwrap_or(Ok(()))
}

// ============================================================================
// Events
// ============================================================================

/// Listener registry with synchronous dispatch
#[derive(Default)]
pub struct SimulatedEventTarget {
    listeners: Mutex<Vec<(String, ListenerId, EventListener)>>,
    next_id: AtomicU64,
}

impl SimulatedEventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call every listener registered for the event's type
    pub fn dispatch(&self, event: &MediaEvent) {
        let listeners: Vec<EventListener> = lock(&self.listeners)
            .iter()
            .filter(|(event_type, _, _)| event.is(event_type))
            .map(|(_, _, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        lock(&self.listeners)
            .iter()
            .filter(|(registered, _, _)| registered == event_type)
            .count()
    }
}

impl EventTarget for SimulatedEventTarget {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        lock(&self.listeners).push((event_type.to_string(), id, listener));
        id
    }

    fn remove_event_listener(&self, event_type: &str, id: ListenerId) {
        lock(&self.listeners).retain(|(registered, registered_id, _)| {
            !(registered == event_type && *registered_id == id)
        });
    }
}

// ============================================================================
// Elements and overlay contexts
// ============================================================================

/// Element with an optional shadow root and a composed-descendant set
pub struct SimulatedElement {
    id: ElementId,
    composite: bool,
    media_surface: bool,
    shadow: Mutex<Option<Arc<SimulatedShadowRoot>>>,
    descendants: Mutex<HashSet<ElementId>>,
    fullscreen_api: AtomicBool,
    fullscreen_requests: AtomicUsize,
    fullscreen_results: Mutex<VecDeque<Result<(), DeviceError>>>,
}

impl SimulatedElement {
    fn build(id: u64, composite: bool, media_surface: bool) -> Self {
        Self {
            id: ElementId(id),
            composite,
            media_surface,
            shadow: Mutex::new(composite.then(|| Arc::new(SimulatedShadowRoot::new()))),
            descendants: Mutex::new(HashSet::new()),
            fullscreen_api: AtomicBool::new(true),
            fullscreen_requests: AtomicUsize::new(0),
            fullscreen_results: Mutex::new(VecDeque::new()),
        }
    }

    /// Plain element without a shadow root
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self::build(id, false, false))
    }

    /// Custom element with its own shadow root
    pub fn composite(id: u64) -> Arc<Self> {
        Arc::new(Self::build(id, true, false))
    }

    /// Native video/audio surface
    pub fn media_surface(id: u64) -> Arc<Self> {
        Arc::new(Self::build(id, false, true))
    }

    /// The shadow root, created on first access
    pub fn shadow(&self) -> Arc<SimulatedShadowRoot> {
        lock(&self.shadow)
            .get_or_insert_with(|| Arc::new(SimulatedShadowRoot::new()))
            .clone()
    }

    pub fn set_shadow_root(&self, root: Arc<SimulatedShadowRoot>) {
        *lock(&self.shadow) = Some(root);
    }

    /// Record `id` as a composed-tree descendant
    pub fn add_descendant(&self, id: ElementId) {
        lock(&self.descendants).insert(id);
    }

    /// Remove the element-level fullscreen request API
    pub fn disable_fullscreen_api(&self) {
        self.fullscreen_api.store(false, Ordering::SeqCst);
    }

    pub fn queue_fullscreen_result(&self, result: Result<(), DeviceError>) {
        lock(&self.fullscreen_results).push_back(result);
    }

    pub fn fullscreen_requests(&self) -> usize {
        self.fullscreen_requests.load(Ordering::SeqCst)
    }
}

impl HostElement for SimulatedElement {
    fn element_id(&self) -> ElementId {
        self.id
    }

    fn is_composite(&self) -> bool {
        self.composite
    }

    fn is_media_surface(&self) -> bool {
        self.media_surface
    }

    fn shadow_root(&self) -> Option<Arc<dyn OverlayContext>> {
        let root = lock(&self.shadow).clone()?;
        Some(root)
    }

    fn contains_composed(&self, other: ElementId) -> bool {
        other == self.id || lock(&self.descendants).contains(&other)
    }

    fn request_fullscreen(&self) -> Option<DeviceRequest> {
        if !self.fullscreen_api.load(Ordering::SeqCst) {
            return None;
        }
        self.fullscreen_requests.fetch_add(1, Ordering::SeqCst);
        let result = outcome(&self.fullscreen_results);
        Some(Box::pin(std::future::ready(result)))
    }

    fn when_defined(&self) -> Option<DeviceRequest> {
        self.composite.then(fulfilled)
    }
}

/// Shadow root tracking its own active overlay elements
pub struct SimulatedShadowRoot {
    fullscreen: Mutex<Option<Arc<dyn HostElement>>>,
    picture_in_picture: Mutex<Option<Arc<dyn HostElement>>>,
    exposes: bool,
}

impl SimulatedShadowRoot {
    pub fn new() -> Self {
        Self {
            fullscreen: Mutex::new(None),
            picture_in_picture: Mutex::new(None),
            exposes: true,
        }
    }

    /// A root without per-level overlay accessors
    pub fn opaque() -> Self {
        Self {
            exposes: false,
            ..Self::new()
        }
    }

    pub fn set_fullscreen_element(&self, element: Option<Arc<dyn HostElement>>) {
        *lock(&self.fullscreen) = element;
    }

    pub fn set_picture_in_picture_element(&self, element: Option<Arc<dyn HostElement>>) {
        *lock(&self.picture_in_picture) = element;
    }
}

impl Default for SimulatedShadowRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayContext for SimulatedShadowRoot {
    fn fullscreen_element(&self) -> Option<Arc<dyn HostElement>> {
        lock(&self.fullscreen).clone()
    }

    fn picture_in_picture_element(&self) -> Option<Arc<dyn HostElement>> {
        lock(&self.picture_in_picture).clone()
    }

    fn exposes_overlay_elements(&self) -> bool {
        self.exposes
    }
}

/// Top-level document
pub struct SimulatedDocument {
    events: SimulatedEventTarget,
    fullscreen: Mutex<Option<Arc<dyn HostElement>>>,
    picture_in_picture: Mutex<Option<Arc<dyn HostElement>>>,
    exit_fullscreen_calls: AtomicUsize,
    exit_pip_calls: AtomicUsize,
    exit_pip_results: Mutex<VecDeque<Result<(), DeviceError>>>,
}

impl SimulatedDocument {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: SimulatedEventTarget::new(),
            fullscreen: Mutex::new(None),
            picture_in_picture: Mutex::new(None),
            exit_fullscreen_calls: AtomicUsize::new(0),
            exit_pip_calls: AtomicUsize::new(0),
            exit_pip_results: Mutex::new(VecDeque::new()),
        })
    }

    pub fn set_fullscreen_element(&self, element: Option<Arc<dyn HostElement>>) {
        *lock(&self.fullscreen) = element;
    }

    pub fn set_picture_in_picture_element(&self, element: Option<Arc<dyn HostElement>>) {
        *lock(&self.picture_in_picture) = element;
    }

    pub fn queue_exit_pip_result(&self, result: Result<(), DeviceError>) {
        lock(&self.exit_pip_results).push_back(result);
    }

    pub fn exit_fullscreen_calls(&self) -> usize {
        self.exit_fullscreen_calls.load(Ordering::SeqCst)
    }

    pub fn exit_pip_calls(&self) -> usize {
        self.exit_pip_calls.load(Ordering::SeqCst)
    }

    pub fn dispatch(&self, event: &MediaEvent) {
        self.events.dispatch(event);
    }
}

impl OverlayContext for SimulatedDocument {
    fn fullscreen_element(&self) -> Option<Arc<dyn HostElement>> {
        lock(&self.fullscreen).clone()
    }

    fn picture_in_picture_element(&self) -> Option<Arc<dyn HostElement>> {
        lock(&self.picture_in_picture).clone()
    }
}

impl EventTarget for SimulatedDocument {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) -> ListenerId {
        self.events.add_event_listener(event_type, listener)
    }

    fn remove_event_listener(&self, event_type: &str, id: ListenerId) {
        self.events.remove_event_listener(event_type, id)
    }
}

impl RootContext for SimulatedDocument {
    fn exit_fullscreen(&self) -> Option<DeviceRequest> {
        self.exit_fullscreen_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.fullscreen) = None;
        Some(fulfilled())
    }

    fn exit_picture_in_picture(&self) -> Option<DeviceRequest> {
        self.exit_pip_calls.fetch_add(1, Ordering::SeqCst);
        let result = outcome(&self.exit_pip_results);
        if result.is_ok() {
            *lock(&self.picture_in_picture) = None;
        }
        Some(Box::pin(std::future::ready(result)))
    }
}

// ============================================================================
// Tracks
// ============================================================================

/// Text track recording mode writes
pub struct SimulatedTextTrack {
    kind: TextTrackKind,
    label: String,
    language: String,
    mode: Mutex<TextTrackMode>,
    mode_writes: AtomicUsize,
    cues: Mutex<Vec<TextTrackCue>>,
    source: OnceLock<SimulatedEventTarget>,
}

impl SimulatedTextTrack {
    pub fn new(kind: TextTrackKind, label: &str, language: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            label: label.to_string(),
            language: language.to_string(),
            mode: Mutex::new(TextTrackMode::Disabled),
            mode_writes: AtomicUsize::new(0),
            cues: Mutex::new(Vec::new()),
            source: OnceLock::new(),
        })
    }

    /// Out-of-band track: exposes a source element that fires `load`
    pub fn with_source(kind: TextTrackKind, label: &str, language: &str) -> Arc<Self> {
        let track = Self::new(kind, label, language);
        let _ = track.source.set(SimulatedEventTarget::new());
        track
    }

    pub fn add_cue(&self, start_time: f64, end_time: f64, text: &str) {
        lock(&self.cues).push(TextTrackCue {
            start_time,
            end_time,
            text: text.to_string(),
        });
    }

    /// Fire `load` on the source element, if there is one
    pub fn fire_load(&self) {
        if let Some(source) = self.source.get() {
            source.dispatch(&MediaEvent::new(LOAD));
        }
    }

    pub fn load_listener_count(&self) -> usize {
        self.source.get().map_or(0, |source| source.listener_count(LOAD))
    }

    pub fn mode_writes(&self) -> usize {
        self.mode_writes.load(Ordering::SeqCst)
    }
}

impl TextTrack for SimulatedTextTrack {
    fn kind(&self) -> TextTrackKind {
        self.kind
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn language(&self) -> String {
        self.language.clone()
    }

    fn mode(&self) -> TextTrackMode {
        *lock(&self.mode)
    }

    fn set_mode(&self, mode: TextTrackMode) {
        self.mode_writes.fetch_add(1, Ordering::SeqCst);
        *lock(&self.mode) = mode;
    }

    fn cues(&self) -> Vec<TextTrackCue> {
        lock(&self.cues).clone()
    }

    fn load_events(&self) -> Option<&dyn EventTarget> {
        let source = self.source.get()?;
        Some(source)
    }
}

/// Text track list announcing additions and removals
#[derive(Default)]
pub struct SimulatedTextTrackList {
    events: SimulatedEventTarget,
    tracks: Mutex<Vec<Arc<SimulatedTextTrack>>>,
}

impl SimulatedTextTrackList {
    /// Append a track and fire `addtrack`
    pub fn add_track(&self, track: Arc<SimulatedTextTrack>) {
        let kind = track.kind;
        lock(&self.tracks).push(track);
        self.events
            .dispatch(&MediaEvent::new(ADD_TRACK).with_track_kind(kind));
    }

    /// Remove a track by label and fire `removetrack`
    pub fn remove_track(&self, label: &str) {
        let removed: Vec<TextTrackKind> = {
            let mut tracks = lock(&self.tracks);
            let kinds = tracks
                .iter()
                .filter(|track| track.label == label)
                .map(|track| track.kind)
                .collect();
            tracks.retain(|track| track.label != label);
            kinds
        };
        for kind in removed {
            self.events
                .dispatch(&MediaEvent::new(REMOVE_TRACK).with_track_kind(kind));
        }
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.events.listener_count(event_type)
    }
}

impl EventTarget for SimulatedTextTrackList {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) -> ListenerId {
        self.events.add_event_listener(event_type, listener)
    }

    fn remove_event_listener(&self, event_type: &str, id: ListenerId) {
        self.events.remove_event_listener(event_type, id)
    }
}

impl TextTrackList for SimulatedTextTrackList {
    fn tracks(&self) -> Vec<Arc<dyn TextTrack>> {
        lock(&self.tracks)
            .iter()
            .map(|track| track.clone() as Arc<dyn TextTrack>)
            .collect()
    }
}

/// Audio track recording enable writes
pub struct SimulatedAudioTrack {
    id: String,
    label: String,
    language: String,
    enabled: AtomicBool,
    enable_writes: AtomicUsize,
}

impl SimulatedAudioTrack {
    pub fn new(id: &str, label: &str, language: &str, enabled: bool) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            label: label.to_string(),
            language: language.to_string(),
            enabled: AtomicBool::new(enabled),
            enable_writes: AtomicUsize::new(0),
        })
    }

    pub fn enable_writes(&self) -> usize {
        self.enable_writes.load(Ordering::SeqCst)
    }
}

impl AudioTrack for SimulatedAudioTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> String {
        "main".to_string()
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn language(&self) -> String {
        self.language.clone()
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enable_writes.fetch_add(1, Ordering::SeqCst);
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct SimulatedAudioTrackList {
    events: SimulatedEventTarget,
    tracks: Mutex<Vec<Arc<SimulatedAudioTrack>>>,
}

impl SimulatedAudioTrackList {
    pub fn add_track(&self, track: Arc<SimulatedAudioTrack>) {
        lock(&self.tracks).push(track);
        self.events.dispatch(&MediaEvent::new(ADD_TRACK));
    }
}

impl EventTarget for SimulatedAudioTrackList {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) -> ListenerId {
        self.events.add_event_listener(event_type, listener)
    }

    fn remove_event_listener(&self, event_type: &str, id: ListenerId) {
        self.events.remove_event_listener(event_type, id)
    }
}

impl AudioTrackList for SimulatedAudioTrackList {
    fn tracks(&self) -> Vec<Arc<dyn AudioTrack>> {
        lock(&self.tracks)
            .iter()
            .map(|track| track.clone() as Arc<dyn AudioTrack>)
            .collect()
    }
}

/// Rendition list recording selection writes
#[derive(Default)]
pub struct SimulatedRenditionList {
    events: SimulatedEventTarget,
    renditions: Mutex<Vec<Rendition>>,
    selected: Mutex<Option<usize>>,
    selection_writes: AtomicUsize,
}

impl SimulatedRenditionList {
    pub fn add_rendition(&self, rendition: Rendition) {
        lock(&self.renditions).push(rendition);
        self.events.dispatch(&MediaEvent::new("addrendition"));
    }

    pub fn selection_writes(&self) -> usize {
        self.selection_writes.load(Ordering::SeqCst)
    }
}

impl EventTarget for SimulatedRenditionList {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) -> ListenerId {
        self.events.add_event_listener(event_type, listener)
    }

    fn remove_event_listener(&self, event_type: &str, id: ListenerId) {
        self.events.remove_event_listener(event_type, id)
    }
}

impl RenditionList for SimulatedRenditionList {
    fn renditions(&self) -> Vec<Rendition> {
        lock(&self.renditions).clone()
    }

    fn selected_index(&self) -> Option<usize> {
        *lock(&self.selected)
    }

    fn set_selected_index(&self, index: Option<usize>) {
        self.selection_writes.fetch_add(1, Ordering::SeqCst);
        *lock(&self.selected) = index;
        self.events.dispatch(&MediaEvent::new("change"));
    }
}

// ============================================================================
// Remote playback
// ============================================================================

/// Remote playback handle.
///
/// Keeps every registered watch callback, cancelled or not, so tests can
/// model a host that fires after cancellation.
pub struct SimulatedRemotePlayback {
    events: SimulatedEventTarget,
    state: Mutex<RemotePlaybackState>,
    watches: Mutex<Vec<(WatchId, AvailabilityCallback)>>,
    cancelled: Mutex<Vec<WatchId>>,
    next_watch: AtomicU64,
    watch_failure: Mutex<Option<DeviceError>>,
    prompt_supported: AtomicBool,
    prompts: AtomicUsize,
}

impl SimulatedRemotePlayback {
    pub fn new() -> Self {
        Self {
            events: SimulatedEventTarget::new(),
            state: Mutex::new(RemotePlaybackState::Disconnected),
            watches: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            next_watch: AtomicU64::new(1),
            watch_failure: Mutex::new(None),
            prompt_supported: AtomicBool::new(true),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn set_state(&self, state: RemotePlaybackState) {
        *lock(&self.state) = state;
    }

    /// Make the next `watch_availability` call fail
    pub fn fail_next_watch(&self, error: DeviceError) {
        *lock(&self.watch_failure) = Some(error);
    }

    pub fn disable_prompt(&self) {
        self.prompt_supported.store(false, Ordering::SeqCst);
    }

    /// Invoke every callback ever registered
    pub fn fire_availability(&self, available: bool) {
        let callbacks: Vec<AvailabilityCallback> =
            lock(&self.watches).iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            callback(available);
        }
    }

    pub fn active_watches(&self) -> usize {
        let cancelled = lock(&self.cancelled);
        lock(&self.watches)
            .iter()
            .filter(|(id, _)| !cancelled.contains(id))
            .count()
    }

    pub fn cancelled_watches(&self) -> usize {
        lock(&self.cancelled).len()
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedRemotePlayback {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTarget for SimulatedRemotePlayback {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) -> ListenerId {
        self.events.add_event_listener(event_type, listener)
    }

    fn remove_event_listener(&self, event_type: &str, id: ListenerId) {
        self.events.remove_event_listener(event_type, id)
    }
}

impl RemotePlayback for SimulatedRemotePlayback {
    fn state(&self) -> RemotePlaybackState {
        *lock(&self.state)
    }

    fn watch_availability(&self, callback: AvailabilityCallback) -> Result<WatchId, DeviceError> {
        if let Some(error) = lock(&self.watch_failure).take() {
            return Err(error);
        }
        let id = WatchId(self.next_watch.fetch_add(1, Ordering::SeqCst));
        lock(&self.watches).push((id, callback));
        Ok(id)
    }

    fn cancel_watch_availability(&self, id: Option<WatchId>) -> Result<(), DeviceError> {
        let mut cancelled = lock(&self.cancelled);
        match id {
            Some(id) => cancelled.push(id),
            None => cancelled.extend(lock(&self.watches).iter().map(|(id, _)| *id)),
        }
        Ok(())
    }

    fn prompt(&self) -> Option<DeviceRequest> {
        if !self.prompt_supported.load(Ordering::SeqCst) {
            return None;
        }
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Some(fulfilled())
    }
}

// ============================================================================
// Media device
// ============================================================================

struct TransportState {
    playback_rate: f64,
    volume: f64,
    muted: bool,
    current_time: f64,
    duration: f64,
    ready_state: ReadyState,
    preload: PreloadHint,
    src: Option<String>,
    seekable: Option<TimeRanges>,
    buffered: TimeRanges,
    ended: bool,
    error: Option<MediaError>,
    video_size: (u32, u32),
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            playback_rate: 1.0,
            volume: 1.0,
            muted: false,
            current_time: 0.0,
            duration: f64::NAN,
            ready_state: ReadyState::HaveNothing,
            preload: PreloadHint::Metadata,
            src: None,
            seekable: Some(TimeRanges::new()),
            buffered: TimeRanges::new(),
            ended: false,
            error: None,
            video_size: (0, 0),
        }
    }
}

#[derive(Default)]
struct LiveState {
    stream_type: Option<StreamType>,
    target_live_window: Option<f64>,
    live_edge_start: Option<f64>,
}

#[derive(Default)]
struct LegacyState {
    displaying: bool,
    presentation_mode: Option<PresentationMode>,
    enter_calls: usize,
}

/// Playback device with every capability group switchable.
///
/// Starts paused, with a transport and a native media-surface element;
/// all other groups are off until enabled.
pub struct SimulatedMedia {
    events: SimulatedEventTarget,
    element: Arc<SimulatedElement>,
    paused: AtomicBool,
    play_results: Mutex<VecDeque<Result<(), DeviceError>>>,
    play_requests: AtomicUsize,

    has_transport: bool,
    transport: Mutex<TransportState>,

    has_live_stream: AtomicBool,
    live: Mutex<LiveState>,

    has_legacy_fullscreen: AtomicBool,
    legacy: Mutex<LegacyState>,

    has_picture_in_picture: AtomicBool,
    pip_results: Mutex<VecDeque<Result<(), DeviceError>>>,
    pip_requests: AtomicUsize,

    has_wireless_target: AtomicBool,
    wireless_active: AtomicBool,
    picker_shows: AtomicUsize,

    text_tracks: OnceLock<Arc<SimulatedTextTrackList>>,
    renditions: OnceLock<Arc<SimulatedRenditionList>>,
    audio_tracks: OnceLock<Arc<SimulatedAudioTrackList>>,
    remote: OnceLock<Arc<SimulatedRemotePlayback>>,
    remote_disabled: AtomicBool,
}

impl SimulatedMedia {
    fn build(element: Arc<SimulatedElement>, has_transport: bool) -> Arc<Self> {
        Arc::new(Self {
            events: SimulatedEventTarget::new(),
            element,
            paused: AtomicBool::new(true),
            play_results: Mutex::new(VecDeque::new()),
            play_requests: AtomicUsize::new(0),
            has_transport,
            transport: Mutex::new(TransportState::default()),
            has_live_stream: AtomicBool::new(false),
            live: Mutex::new(LiveState::default()),
            has_legacy_fullscreen: AtomicBool::new(false),
            legacy: Mutex::new(LegacyState::default()),
            has_picture_in_picture: AtomicBool::new(false),
            pip_results: Mutex::new(VecDeque::new()),
            pip_requests: AtomicUsize::new(0),
            has_wireless_target: AtomicBool::new(false),
            wireless_active: AtomicBool::new(false),
            picker_shows: AtomicUsize::new(0),
            text_tracks: OnceLock::new(),
            renditions: OnceLock::new(),
            audio_tracks: OnceLock::new(),
            remote: OnceLock::new(),
            remote_disabled: AtomicBool::new(false),
        })
    }

    /// Native video element with id `id`
    pub fn new(id: u64) -> Arc<Self> {
        Self::build(SimulatedElement::media_surface(id), true)
    }

    /// Custom-element device wrapping its own native surface
    pub fn composite(id: u64) -> Arc<Self> {
        Self::build(SimulatedElement::composite(id), true)
    }

    /// Device exposing only play/pause
    pub fn without_transport(id: u64) -> Arc<Self> {
        Self::build(SimulatedElement::media_surface(id), false)
    }

    pub fn element_handle(&self) -> Arc<SimulatedElement> {
        self.element.clone()
    }

    pub fn dispatch(&self, event: &MediaEvent) {
        self.events.dispatch(event);
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.events.listener_count(event_type)
    }

    pub fn queue_play_result(&self, result: Result<(), DeviceError>) {
        lock(&self.play_results).push_back(result);
    }

    pub fn play_requests(&self) -> usize {
        self.play_requests.load(Ordering::SeqCst)
    }

    // Transport fixtures

    pub fn set_duration(&self, duration: f64) {
        lock(&self.transport).duration = duration;
    }

    pub fn set_ready_state(&self, ready_state: ReadyState) {
        lock(&self.transport).ready_state = ready_state;
    }

    pub fn set_source(&self, src: Option<&str>) {
        lock(&self.transport).src = src.map(str::to_string);
    }

    pub fn set_seekable(&self, seekable: Option<TimeRanges>) {
        lock(&self.transport).seekable = seekable;
    }

    pub fn set_buffered(&self, buffered: TimeRanges) {
        lock(&self.transport).buffered = buffered;
    }

    pub fn set_ended(&self, ended: bool) {
        lock(&self.transport).ended = ended;
    }

    pub fn set_error(&self, error: Option<MediaError>) {
        lock(&self.transport).error = error;
    }

    pub fn set_video_size(&self, width: u32, height: u32) {
        lock(&self.transport).video_size = (width, height);
    }

    // Capability groups

    pub fn enable_live_stream(&self) {
        self.has_live_stream.store(true, Ordering::SeqCst);
    }

    pub fn set_stream_type(&self, stream_type: Option<StreamType>) {
        self.enable_live_stream();
        lock(&self.live).stream_type = stream_type;
    }

    pub fn set_target_live_window(&self, window: Option<f64>) {
        self.enable_live_stream();
        lock(&self.live).target_live_window = window;
    }

    pub fn set_live_edge_start(&self, start: Option<f64>) {
        self.enable_live_stream();
        lock(&self.live).live_edge_start = start;
    }

    pub fn enable_legacy_fullscreen(&self) {
        self.has_legacy_fullscreen.store(true, Ordering::SeqCst);
    }

    pub fn set_legacy_presentation(&self, displaying: bool, mode: Option<PresentationMode>) {
        let mut legacy = lock(&self.legacy);
        legacy.displaying = displaying;
        legacy.presentation_mode = mode;
    }

    pub fn legacy_enter_calls(&self) -> usize {
        lock(&self.legacy).enter_calls
    }

    pub fn enable_picture_in_picture(&self) {
        self.has_picture_in_picture.store(true, Ordering::SeqCst);
    }

    pub fn queue_pip_result(&self, result: Result<(), DeviceError>) {
        lock(&self.pip_results).push_back(result);
    }

    pub fn pip_requests(&self) -> usize {
        self.pip_requests.load(Ordering::SeqCst)
    }

    pub fn enable_wireless_target(&self) {
        self.has_wireless_target.store(true, Ordering::SeqCst);
    }

    pub fn set_wireless_active(&self, active: bool) {
        self.wireless_active.store(active, Ordering::SeqCst);
    }

    pub fn picker_shows(&self) -> usize {
        self.picker_shows.load(Ordering::SeqCst)
    }

    pub fn enable_text_tracks(&self) -> Arc<SimulatedTextTrackList> {
        self.text_tracks.get_or_init(Default::default).clone()
    }

    pub fn enable_renditions(&self) -> Arc<SimulatedRenditionList> {
        self.renditions.get_or_init(Default::default).clone()
    }

    pub fn enable_audio_tracks(&self) -> Arc<SimulatedAudioTrackList> {
        self.audio_tracks.get_or_init(Default::default).clone()
    }

    pub fn enable_remote(&self) -> Arc<SimulatedRemotePlayback> {
        self.remote.get_or_init(Default::default).clone()
    }

    pub fn set_remote_playback_disabled(&self, disabled: bool) {
        self.remote_disabled.store(disabled, Ordering::SeqCst);
    }
}

impl EventTarget for SimulatedMedia {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) -> ListenerId {
        self.events.add_event_listener(event_type, listener)
    }

    fn remove_event_listener(&self, event_type: &str, id: ListenerId) {
        self.events.remove_event_listener(event_type, id)
    }
}

impl MediaDevice for SimulatedMedia {
    fn play(&self) -> DeviceRequest {
        self.play_requests.fetch_add(1, Ordering::SeqCst);
        let result = outcome(&self.play_results);
        if result.is_ok() {
            self.paused.store(false, Ordering::SeqCst);
            self.events.dispatch(&MediaEvent::new("play"));
        }
        Box::pin(std::future::ready(result))
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.events.dispatch(&MediaEvent::new("pause"));
    }

    fn paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn transport(&self) -> Option<&dyn Transport> {
        if self.has_transport { Some(self) } else { None }
    }

    fn live_stream(&self) -> Option<&dyn LiveStream> {
        if self.has_live_stream.load(Ordering::SeqCst) { Some(self) } else { None }
    }

    fn text_tracks(&self) -> Option<&dyn TextTrackList> {
        let list = self.text_tracks.get()?;
        Some(list.as_ref())
    }

    fn video_renditions(&self) -> Option<&dyn RenditionList> {
        let list = self.renditions.get()?;
        Some(list.as_ref())
    }

    fn audio_tracks(&self) -> Option<&dyn AudioTrackList> {
        let list = self.audio_tracks.get()?;
        Some(list.as_ref())
    }

    fn remote(&self) -> Option<&dyn RemotePlayback> {
        let remote = self.remote.get()?;
        Some(remote.as_ref())
    }

    fn remote_playback_disabled(&self) -> bool {
        self.remote_disabled.load(Ordering::SeqCst)
    }

    fn wireless_target(&self) -> Option<&dyn WirelessPlaybackTarget> {
        if self.has_wireless_target.load(Ordering::SeqCst) { Some(self) } else { None }
    }

    fn picture_in_picture(&self) -> Option<&dyn PictureInPicture> {
        if self.has_picture_in_picture.load(Ordering::SeqCst) { Some(self) } else { None }
    }

    fn legacy_fullscreen(&self) -> Option<&dyn LegacyFullscreen> {
        if self.has_legacy_fullscreen.load(Ordering::SeqCst) { Some(self) } else { None }
    }

    fn element(&self) -> Option<&dyn HostElement> {
        Some(self.element.as_ref())
    }
}

impl Transport for SimulatedMedia {
    fn playback_rate(&self) -> f64 {
        lock(&self.transport).playback_rate
    }

    fn set_playback_rate(&self, rate: f64) {
        lock(&self.transport).playback_rate = rate;
    }

    fn volume(&self) -> f64 {
        lock(&self.transport).volume
    }

    fn set_volume(&self, volume: f64) {
        lock(&self.transport).volume = volume;
    }

    fn muted(&self) -> bool {
        lock(&self.transport).muted
    }

    fn set_muted(&self, muted: bool) {
        lock(&self.transport).muted = muted;
    }

    fn current_time(&self) -> f64 {
        lock(&self.transport).current_time
    }

    fn set_current_time(&self, time: f64) {
        lock(&self.transport).current_time = time;
    }

    fn duration(&self) -> f64 {
        lock(&self.transport).duration
    }

    fn ready_state(&self) -> ReadyState {
        lock(&self.transport).ready_state
    }

    fn preload(&self) -> PreloadHint {
        lock(&self.transport).preload
    }

    fn set_preload(&self, preload: PreloadHint) {
        lock(&self.transport).preload = preload;
    }

    fn src(&self) -> Option<String> {
        lock(&self.transport).src.clone()
    }

    fn seekable(&self) -> Option<TimeRanges> {
        lock(&self.transport).seekable.clone()
    }

    fn buffered(&self) -> TimeRanges {
        lock(&self.transport).buffered.clone()
    }

    fn ended(&self) -> bool {
        lock(&self.transport).ended
    }

    fn error(&self) -> Option<MediaError> {
        lock(&self.transport).error.clone()
    }

    fn video_size(&self) -> (u32, u32) {
        lock(&self.transport).video_size
    }
}

impl LiveStream for SimulatedMedia {
    fn stream_type(&self) -> Option<StreamType> {
        lock(&self.live).stream_type
    }

    fn target_live_window(&self) -> Option<f64> {
        lock(&self.live).target_live_window
    }

    fn live_edge_start(&self) -> Option<f64> {
        lock(&self.live).live_edge_start
    }
}

impl PictureInPicture for SimulatedMedia {
    fn request_picture_in_picture(&self) -> DeviceRequest {
        self.pip_requests.fetch_add(1, Ordering::SeqCst);
        Box::pin(std::future::ready(outcome(&self.pip_results)))
    }
}

impl LegacyFullscreen for SimulatedMedia {
    fn supports_fullscreen(&self) -> bool {
        true
    }

    fn displaying_fullscreen(&self) -> bool {
        lock(&self.legacy).displaying
    }

    fn presentation_mode(&self) -> Option<PresentationMode> {
        lock(&self.legacy).presentation_mode
    }

    fn enter_fullscreen(&self) {
        {
            let mut legacy = lock(&self.legacy);
            legacy.enter_calls += 1;
            legacy.displaying = true;
            legacy.presentation_mode = Some(PresentationMode::Fullscreen);
        }
        self.events.dispatch(&MediaEvent::new(WEBKIT_BEGIN_FULLSCREEN));
    }
}

impl WirelessPlaybackTarget for SimulatedMedia {
    fn current_target_is_wireless(&self) -> bool {
        self.wireless_active.load(Ordering::SeqCst)
    }

    fn show_playback_target_picker(&self) {
        self.picker_shows.fetch_add(1, Ordering::SeqCst);
    }
}
