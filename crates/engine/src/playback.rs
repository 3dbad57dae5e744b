use fleetview_protocol::{PlaybackCommand, PlaybackPhase, PlaybackState};
use std::time::Duration;

use crate::config::EndOfPlayback;

/// Repeating timer that only exists while playback is running.
///
/// Dropping it cancels it; the controller never holds one outside `Playing`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlaybackTimer {
    interval: Duration,
    elapsed: Duration,
}

impl PlaybackTimer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Accumulates time and returns how many intervals completed.
    fn accumulate(&mut self, dt: Duration) -> u32 {
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            fired += 1;
        }
        fired
    }
}

/// Replay cursor over the global, time-sorted movement timeline.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    len: usize,
    index: Option<usize>,
    timer: Option<PlaybackTimer>,
    interval: Duration,
    end: EndOfPlayback,
    replaying: bool,
}

impl PlaybackController {
    pub fn new(interval: Duration, end: EndOfPlayback) -> Self {
        Self {
            len: 0,
            index: None,
            timer: None,
            interval: interval.max(Duration::from_millis(1)),
            end,
            replaying: false,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        match (self.index, &self.timer) {
            (None, _) => PlaybackPhase::Stopped,
            (Some(_), Some(_)) => PlaybackPhase::Playing,
            (Some(_), None) => PlaybackPhase::Paused,
        }
    }

    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.timer.is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            index: self.index,
            playing: self.is_playing(),
            len: self.len,
            phase: self.phase(),
        }
    }

    /// The replay cut-off used by the renderer: `Some(i)` from `play()` until the
    /// history runs out (pauses included), `None` for the full history.
    pub fn visible_until(&self) -> Option<usize> {
        if self.replaying {
            self.index
        } else {
            None
        }
    }

    /// Called when the movement history is replaced.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.index = None;
            self.replaying = false;
            self.cancel_timer("history empty");
            return;
        }
        // A non-empty history always has a cursor; a fresh one starts paused at 0.
        self.index = Some(self.index.map_or(0, |i| i.min(len - 1)));
    }

    pub fn play(&mut self) -> bool {
        if self.len == 0 || self.timer.is_some() {
            return false;
        }
        let index = *self.index.get_or_insert(0);
        self.timer = Some(PlaybackTimer::new(self.interval));
        self.replaying = true;
        tracing::debug!(index, len = self.len, "playback started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.timer.is_none() {
            return false;
        }
        self.cancel_timer("paused");
        true
    }

    pub fn toggle(&mut self) -> bool {
        if self.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Moves the cursor to the first event without touching the play state.
    pub fn skip_to_start(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        let changed = self.index != Some(0);
        self.index = Some(0);
        changed
    }

    pub fn apply(&mut self, cmd: PlaybackCommand) -> bool {
        match cmd {
            PlaybackCommand::Play => self.play(),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::Toggle => self.toggle(),
            PlaybackCommand::SkipToStart => self.skip_to_start(),
        }
    }

    /// One timer step. Past the last event, either parks at 0 with the timer
    /// cancelled or wraps to 0, depending on [`EndOfPlayback`].
    pub fn tick(&mut self) -> bool {
        let Some(i) = self.index else {
            return false;
        };
        if i + 1 < self.len {
            self.index = Some(i + 1);
            return true;
        }
        self.index = Some(0);
        if self.end == EndOfPlayback::Stop {
            self.replaying = false;
            self.cancel_timer("end of history");
        }
        true
    }

    /// Feeds elapsed host time into the timer. Returns the number of ticks fired.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        let due = match self.timer.as_mut() {
            Some(timer) => timer.accumulate(dt),
            None => return 0,
        };
        let mut fired = 0;
        for _ in 0..due {
            // A tick may cancel the timer at the end of the history.
            if self.timer.is_none() {
                break;
            }
            self.tick();
            fired += 1;
        }
        fired
    }

    fn cancel_timer(&mut self, reason: &'static str) {
        if self.timer.take().is_some() {
            tracing::debug!(reason, index = ?self.index, "playback timer cancelled");
        }
    }
}
