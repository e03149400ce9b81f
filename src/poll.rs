// Cancellable repeating task driven by host ticks: "run every interval until cancelled".
// Works the same behind a timer wheel, an async interval, or a frame loop.

use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollState {
    Idle,
    Scheduled { next_due: Timestamp },
}

/// Repeating poll with a fixed cadence. Single-threaded; cancellation is immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatingPoll {
    interval_ms: u64,
    state: PollState,
}

impl RepeatingPoll {
    pub fn new(interval_ms: u64) -> Self {
        RepeatingPoll {
            interval_ms,
            state: PollState::Idle,
        }
    }

    /// Schedules the first run for `now`. No-op while already scheduled.
    pub fn start(&mut self, now: Timestamp) {
        if let PollState::Idle = self.state {
            self.state = PollState::Scheduled { next_due: now };
        }
    }

    /// Idempotent; cancelling an idle poll does nothing.
    pub fn cancel(&mut self) {
        self.state = PollState::Idle;
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self.state, PollState::Scheduled { .. })
    }

    pub fn next_due(&self) -> Option<Timestamp> {
        match self.state {
            PollState::Scheduled { next_due } => Some(next_due),
            PollState::Idle => None,
        }
    }

    /// Runs the poll if it is due, rescheduling one interval after `now`.
    pub fn fire_if_due(&mut self, now: Timestamp) -> bool {
        match self.state {
            PollState::Scheduled { next_due } if now >= next_due => {
                self.state = PollState::Scheduled {
                    next_due: now.plus_millis(self.interval_ms),
                };
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    #[test]
    fn first_run_is_immediate() {
        let mut poll = RepeatingPoll::new(100);
        assert!(!poll.fire_if_due(ms(0)));
        poll.start(ms(50));
        assert!(poll.fire_if_due(ms(50)));
        assert_eq!(poll.next_due(), Some(ms(150)));
    }

    #[test]
    fn runs_on_cadence() {
        let mut poll = RepeatingPoll::new(100);
        poll.start(ms(0));
        assert!(poll.fire_if_due(ms(0)));
        assert!(!poll.fire_if_due(ms(60)));
        assert!(poll.fire_if_due(ms(100)));
        // Late tick reschedules from when it actually ran.
        assert!(poll.fire_if_due(ms(340)));
        assert_eq!(poll.next_due(), Some(ms(440)));
    }

    #[test]
    fn start_while_scheduled_keeps_schedule() {
        let mut poll = RepeatingPoll::new(100);
        poll.start(ms(0));
        poll.fire_if_due(ms(0));
        poll.start(ms(30));
        assert_eq!(poll.next_due(), Some(ms(100)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut poll = RepeatingPoll::new(100);
        poll.cancel();
        assert!(!poll.is_scheduled());
        poll.start(ms(0));
        poll.cancel();
        poll.cancel();
        assert!(!poll.is_scheduled());
        assert!(!poll.fire_if_due(ms(1_000)));
    }
}
