// Video playback accounting. Start/pause/end, accumulating on every transition out of Playing.

use crate::types::Timestamp;

/// Playback state. `Ended` is terminal: the video lifecycle is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing {
        since: Timestamp,
    },
    Ended,
}

/// Accumulates total playback time for one video creative.
#[derive(Debug, Clone, Default)]
pub struct PlaybackTracker {
    state: PlaybackState,
    total_playback_time_ms: u64,
}

impl PlaybackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts timing. No-op while playing or after the video ended.
    pub fn on_play(&mut self, now: Timestamp) {
        if let PlaybackState::Stopped = self.state {
            self.state = PlaybackState::Playing { since: now };
        }
    }

    pub fn on_pause(&mut self, now: Timestamp) {
        if self.bank(now) {
            self.state = PlaybackState::Stopped;
        }
    }

    /// Only the first end counts; later play/pause signals are ignored.
    pub fn on_end(&mut self, now: Timestamp) {
        if self.has_ended() {
            return;
        }
        self.bank(now);
        self.state = PlaybackState::Ended;
        log::debug!("playback ended, total {}ms", self.total_playback_time_ms);
    }

    /// Banks the running interval without ending the video.
    pub fn flush(&mut self, now: Timestamp) {
        self.on_pause(now);
    }

    fn bank(&mut self, now: Timestamp) -> bool {
        match self.state {
            PlaybackState::Playing { since } => {
                self.total_playback_time_ms += now.saturating_since(since);
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    pub fn has_ended(&self) -> bool {
        matches!(self.state, PlaybackState::Ended)
    }

    pub fn total_playback_time_ms(&self) -> u64 {
        self.total_playback_time_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    #[test]
    fn play_pause_accumulates() {
        let mut playback = PlaybackTracker::new();
        playback.on_play(ms(100));
        playback.on_pause(ms(600));
        playback.on_play(ms(1000));
        playback.on_pause(ms(1250));
        assert_eq!(playback.total_playback_time_ms(), 750);
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn second_play_is_noop() {
        let mut playback = PlaybackTracker::new();
        playback.on_play(ms(0));
        playback.on_play(ms(400));
        playback.on_pause(ms(1000));
        assert_eq!(playback.total_playback_time_ms(), 1000);
    }

    #[test]
    fn pause_without_play_is_noop() {
        let mut playback = PlaybackTracker::new();
        playback.on_pause(ms(500));
        assert_eq!(playback.total_playback_time_ms(), 0);
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn end_is_a_latch() {
        let mut playback = PlaybackTracker::new();
        playback.on_play(ms(0));
        playback.on_end(ms(3000));
        assert!(playback.has_ended());
        assert_eq!(playback.total_playback_time_ms(), 3000);

        playback.on_play(ms(4000));
        assert!(!playback.is_playing());
        playback.on_pause(ms(5000));
        playback.on_end(ms(6000));
        playback.flush(ms(7000));
        assert_eq!(playback.total_playback_time_ms(), 3000);
        assert!(playback.has_ended());
    }

    #[test]
    fn flush_banks_running_interval() {
        let mut playback = PlaybackTracker::new();
        playback.on_play(ms(200));
        playback.flush(ms(900));
        playback.flush(ms(1200));
        assert_eq!(playback.total_playback_time_ms(), 700);
    }
}
