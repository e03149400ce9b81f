// Tracker lifecycle: routes geometry, focus, poll, script and teardown signals into the
// visibility, engagement and playback state machines, and gates event emission.
// All calls are expected on one cooperative queue; nothing here locks.
// See DESIGN.md: TrackerLifecycle

use crate::bridge::{parse_render_status, parse_video_status, VideoStatus};
use crate::clock::EngagementClock;
use crate::error::TrackerError;
use crate::event::{EventEmitter, ViewableMetrics};
use crate::geometry::GeometryQuery;
use crate::latch::Latch;
use crate::listener::{AdListener, AnalyticsSink, NoopListener};
use crate::playback::PlaybackTracker;
use crate::scroll::scroll_depth;
use crate::types::*;
use crate::visibility::VisibilityTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    /// Built, observers not yet registered.
    Created,
    Observing,
    Destroyed,
}

/// Viewability tracker for one ad element.
pub struct AdTracker<S: AnalyticsSink, L: AdListener = NoopListener> {
    element: TrackedElement,
    emitter: EventEmitter,
    render_start: Timestamp,
    visibility: VisibilityTracker,
    state: LifecycleState,
    window_focused: bool,
    is_visible: bool,
    visibility_ratio: f32,
    clock: EngagementClock,
    /// Present only for video creatives.
    playback: Option<PlaybackTracker>,
    impression_gate: Latch,
    sink: S,
    listener: L,
}

impl<S: AnalyticsSink, L: AdListener> AdTracker<S, L> {
    /// `now` marks the render start that render and time-to-visible durations are measured from.
    pub fn new(
        element: TrackedElement,
        context: AdContext,
        config: TrackerConfig,
        now: Timestamp,
        sink: S,
        listener: L,
    ) -> Result<Self, TrackerError> {
        config.validate()?;

        Ok(AdTracker {
            element,
            emitter: EventEmitter::new(context),
            render_start: now,
            visibility: VisibilityTracker::new(config.visibility_threshold),
            state: LifecycleState::Created,
            window_focused: true,
            is_visible: false,
            visibility_ratio: 0.0,
            clock: EngagementClock::new(&config),
            playback: element.media_type.is_video().then(PlaybackTracker::new),
            impression_gate: Latch::Armed,
            sink,
            listener,
        })
    }

    /// Registers geometry observers and takes the first sample. Idempotent.
    pub fn start(&mut self, now: Timestamp, geometry: &impl GeometryQuery) {
        match self.state {
            LifecycleState::Created => {
                self.state = LifecycleState::Observing;
                log::debug!("observers registered for {:?} element", self.element.media_type);
                self.check_visibility(now, geometry);
            }
            LifecycleState::Observing => {}
            LifecycleState::Destroyed => log::debug!("start after destroy ignored"),
        }
    }

    /// Container scrolled or layout changed.
    pub fn on_geometry_changed(&mut self, now: Timestamp, geometry: &impl GeometryQuery) {
        if self.accepting("geometry") {
            self.check_visibility(now, geometry);
        }
    }

    /// Window focus changed. Losing focus hides the element regardless of geometry.
    pub fn on_focus_changed(&mut self, now: Timestamp, has_focus: bool, geometry: &impl GeometryQuery) {
        if !self.accepting("focus") {
            return;
        }
        self.window_focused = has_focus;
        if has_focus {
            self.check_visibility(now, geometry);
        } else {
            self.apply_visibility(now, false);
        }
    }

    /// Poll tick. Emits the viewable impression once the dwell threshold is met.
    pub fn tick(&mut self, now: Timestamp, geometry: &impl GeometryQuery) {
        if !self.accepting("tick") {
            return;
        }
        let Some(dwell) = self.clock.poll(now) else {
            return;
        };

        let metrics = ViewableMetrics {
            time_to_visible_ms: now.saturating_since(self.render_start),
            scroll_depth: scroll_depth(geometry.scroll_position()),
            visibility_ratio: self.visibility_ratio,
            view_time_ms: dwell.view_time_ms,
        };
        log::debug!("viewable impression after {}ms in view", dwell.view_time_ms);
        self.listener.on_ad_impression();
        self.sink.send(self.emitter.viewable_impression(metrics));
    }

    /// Raw render-status payload from the creative script.
    pub fn on_render_message(&mut self, now: Timestamp, json: &str) {
        match parse_render_status(json) {
            Ok(true) => self.on_render_succeeded(now),
            Ok(false) => log::debug!("ignoring render message {json}"),
            Err(err) => log::warn!("{err}"),
        }
    }

    /// Creative rendered. Emits the impression once. Accepted before `start`;
    /// the creative can finish rendering before observers are registered.
    pub fn on_render_succeeded(&mut self, now: Timestamp) {
        if self.state == LifecycleState::Destroyed {
            log::debug!("render signal dropped while {:?}", self.state);
            return;
        }
        if !self.impression_gate.trip() {
            return;
        }
        let render_time = now.saturating_since(self.render_start);
        log::debug!("impression, render took {render_time}ms");
        self.listener.on_ad_loaded();
        self.sink.send(self.emitter.impression(render_time));
    }

    /// Raw video-status payload from the creative script.
    pub fn on_video_message(&mut self, now: Timestamp, json: &str) {
        match parse_video_status(json) {
            Ok(status) => self.on_video_status(now, status),
            Err(err) => log::warn!("{err}"),
        }
    }

    pub fn on_video_status(&mut self, now: Timestamp, status: VideoStatus) {
        if !self.accepting("video") {
            return;
        }
        let Some(playback) = self.playback.as_mut() else {
            log::debug!("video status {status:?} on non-video creative ignored");
            return;
        };
        match status {
            VideoStatus::Play => playback.on_play(now),
            VideoStatus::Pause => playback.on_pause(now),
            VideoStatus::Ended => playback.on_end(now),
        }
    }

    /// User clicked the creative. Not gated.
    pub fn on_click(&mut self) {
        if !self.accepting("click") {
            return;
        }
        self.listener.on_ad_clicked();
        self.sink.send(self.emitter.click());
    }

    /// The widget attached the rendered creative.
    pub fn on_creative_rendered(&mut self) {
        if self.state != LifecycleState::Destroyed {
            self.listener.on_ad_opened();
        }
    }

    /// Creative fetch or render failed.
    pub fn on_load_failed(&mut self, reason: &str) {
        if self.state != LifecycleState::Destroyed {
            log::warn!("ad failed to load: {reason}");
            self.listener.on_ad_failed_to_load(reason);
        }
    }

    /// Teardown: unregister observers, bank open sessions, stop polling, emit totals.
    /// Safe to call any number of times; only the first call has effects.
    pub fn destroy(&mut self, now: Timestamp) {
        if self.state == LifecycleState::Destroyed {
            return;
        }
        self.state = LifecycleState::Destroyed;
        log::debug!("observers unregistered");

        self.clock.flush(now);
        if let Some(playback) = self.playback.as_mut() {
            playback.flush(now);
        }
        self.is_visible = false;

        if let Some(event) = self.emitter.total_view_time(self.clock.total_view_time_ms()) {
            self.sink.send(event);
        }
        if let Some(event) = self.emitter.total_playback_time(self.total_playback_time_ms()) {
            self.sink.send(event);
        }
        self.listener.on_ad_closed();
    }

    fn accepting(&self, signal: &str) -> bool {
        let accepting = self.state == LifecycleState::Observing;
        if !accepting {
            log::debug!("{signal} signal dropped while {:?}", self.state);
        }
        accepting
    }

    fn check_visibility(&mut self, now: Timestamp, geometry: &impl GeometryQuery) {
        // Layout not settled: keep the previous decision.
        let Some(decision) = self.visibility.sample(&geometry.sample()) else {
            return;
        };
        self.visibility_ratio = decision.ratio;
        self.apply_visibility(now, decision.is_visible && self.window_focused);
    }

    fn apply_visibility(&mut self, now: Timestamp, visible: bool) {
        let was_visible = self.is_visible;
        self.is_visible = visible;

        if visible && !was_visible {
            self.clock.on_visible(now);
            // Auto-resume; a no-op once the video ended.
            if let Some(playback) = self.playback.as_mut() {
                playback.on_play(now);
            }
        } else if !visible && was_visible {
            self.clock.on_hidden(now);
            if let Some(playback) = self.playback.as_mut() {
                playback.on_pause(now);
            }
        }
    }

    pub fn element(&self) -> &TrackedElement {
        &self.element
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn visibility_ratio(&self) -> f32 {
        self.visibility_ratio
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == LifecycleState::Destroyed
    }

    pub fn has_fired_viewable_impression(&self) -> bool {
        self.clock.has_fired()
    }

    pub fn total_view_time_ms(&self) -> u64 {
        self.clock.total_view_time_ms()
    }

    pub fn total_playback_time_ms(&self) -> u64 {
        self.playback
            .as_ref()
            .map_or(0, PlaybackTracker::total_playback_time_ms)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }
}
