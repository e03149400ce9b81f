// Engagement clock: continuous-dwell detection for the viewable impression, plus total view time.
// Rule: only an unbroken visible stretch counts toward dwell; every visible stretch counts toward total.
// See DESIGN.md: EngagementClock

use crate::latch::Latch;
use crate::poll::RepeatingPoll;
use crate::types::*;

/// Open view interval and the time accumulated by closed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewSession {
    /// Set iff the element is currently visible.
    pub view_start: Option<Timestamp>,
    pub total_view_time_ms: u64,
}

impl ViewSession {
    /// Closes the open interval, if any, into the total.
    fn close(&mut self, now: Timestamp) -> bool {
        match self.view_start.take() {
            Some(start) => {
                self.total_view_time_ms += now.saturating_since(start);
                true
            }
            None => false,
        }
    }
}

/// Dwell threshold reached on a poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellReached {
    pub view_time_ms: u64,
}

/// Poll-driven dwell timer and view-time accumulator.
#[derive(Debug, Clone)]
pub struct EngagementClock {
    min_view_time_ms: u64,
    session: ViewSession,
    dwell_gate: Latch,
    poll: RepeatingPoll,
}

impl EngagementClock {
    pub fn new(config: &TrackerConfig) -> Self {
        EngagementClock {
            min_view_time_ms: config.min_view_time_ms,
            session: ViewSession::default(),
            dwell_gate: Latch::Armed,
            poll: RepeatingPoll::new(config.poll_interval_ms),
        }
    }

    /// Element became visible. Opens a view interval and arms the poll.
    pub fn on_visible(&mut self, now: Timestamp) {
        if self.session.view_start.is_some() {
            return;
        }
        self.session.view_start = Some(now);
        if !self.dwell_gate.is_fired() {
            self.poll.start(now);
        }
        log::debug!("view interval opened at {}ms", now.as_millis());
    }

    /// Element became hidden. Banks the interval; never fires the dwell event.
    pub fn on_hidden(&mut self, now: Timestamp) {
        if self.session.close(now) {
            log::debug!(
                "view interval closed at {}ms, total {}ms",
                now.as_millis(),
                self.session.total_view_time_ms
            );
        }
        self.poll.cancel();
    }

    /// Poll tick. Trips the dwell gate once the open interval reaches the minimum.
    pub fn poll(&mut self, now: Timestamp) -> Option<DwellReached> {
        if !self.poll.fire_if_due(now) {
            return None;
        }
        let start = self.session.view_start?;
        let view_time_ms = now.saturating_since(start);
        if view_time_ms < self.min_view_time_ms || !self.dwell_gate.trip() {
            return None;
        }
        self.poll.cancel();
        Some(DwellReached { view_time_ms })
    }

    /// Banks any open interval and stops polling. Used at teardown.
    pub fn flush(&mut self, now: Timestamp) {
        self.on_hidden(now);
    }

    pub fn total_view_time_ms(&self) -> u64 {
        self.session.total_view_time_ms
    }

    pub fn session(&self) -> ViewSession {
        self.session
    }

    pub fn is_accruing(&self) -> bool {
        self.session.view_start.is_some()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_scheduled()
    }

    pub fn has_fired(&self) -> bool {
        self.dwell_gate.is_fired()
    }
}
