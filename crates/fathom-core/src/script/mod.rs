//! Typewriter-style script playback shared by the boot, shutdown, reboot and
//! install screens.
//!
//! A [`TimedScriptPlayer`] appends one line per timer tick to an accumulating
//! log and reports completion exactly once. It never owns a timer callback:
//! it schedules [`TimerEvent::ScriptStep`] on the orchestrator's
//! [`TimerQueue`] and is advanced when that timer fires. Cancelling the
//! player (or the epoch it scheduled under) guarantees no further lines and
//! no late completion.

pub mod builtin;

use fathom_types::error::{FathomError, Result};

use crate::rng::RandomSource;
use crate::timer::{Epoch, TimerEvent, TimerId, TimerQueue};

/// One scripted line and the pause before it appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub text: String,
    /// Used only with [`LineTiming::PerLine`].
    pub delay_ms: u64,
}

impl ScriptLine {
    pub fn new(text: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            text: text.into(),
            delay_ms,
        }
    }
}

/// How the pause before each line is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTiming {
    /// Each line carries its own delay.
    PerLine,
    /// Every line waits the same amount.
    Constant(u64),
    /// Each line waits a uniform random amount in `[min_ms, max_ms]`.
    Uniform { min_ms: u64, max_ms: u64 },
}

/// A complete script: lines, their timing, and the pause before completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub lines: Vec<ScriptLine>,
    pub timing: LineTiming,
    pub completion_delay_ms: u64,
}

impl Script {
    /// Build a script from bare text lines with uniform timing.
    pub fn from_lines<I, S>(lines: I, timing: LineTiming, completion_delay_ms: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(|l| ScriptLine::new(l, 0)).collect(),
            timing,
            completion_delay_ms,
        }
    }
}

/// Lifecycle of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Finished,
    Cancelled,
}

/// Result of feeding a timer to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptProgress {
    /// A line was appended; the payload is its index.
    LineAppended(usize),
    /// The script finished. Reported once.
    Completed,
    /// The timer did not belong to this player, or the player is not running.
    Ignored,
}

/// Plays one [`Script`] into an accumulating log.
#[derive(Debug)]
pub struct TimedScriptPlayer {
    script: Script,
    next_line: usize,
    log: Vec<String>,
    state: PlayerState,
    pending: Option<TimerId>,
    epoch: Epoch,
}

impl TimedScriptPlayer {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            next_line: 0,
            log: Vec::new(),
            state: PlayerState::Idle,
            pending: None,
            epoch: 0,
        }
    }

    /// Begin playback, scheduling the first step under `epoch`.
    ///
    /// A player plays exactly once; starting it again is an error.
    pub fn start(
        &mut self,
        epoch: Epoch,
        timers: &mut TimerQueue,
        rng: &mut dyn RandomSource,
    ) -> Result<()> {
        if self.state != PlayerState::Idle {
            return Err(FathomError::Script(format!(
                "player already {:?}",
                self.state
            )));
        }
        self.epoch = epoch;
        self.state = PlayerState::Playing;
        self.schedule_next(timers, rng);
        Ok(())
    }

    /// Advance in response to a fired timer.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        timers: &mut TimerQueue,
        rng: &mut dyn RandomSource,
    ) -> ScriptProgress {
        if self.state != PlayerState::Playing || self.pending != Some(id) {
            return ScriptProgress::Ignored;
        }
        self.pending = None;

        if let Some(line) = self.script.lines.get(self.next_line) {
            self.log.push(line.text.clone());
            let index = self.next_line;
            self.next_line += 1;
            self.schedule_next(timers, rng);
            return ScriptProgress::LineAppended(index);
        }

        self.state = PlayerState::Finished;
        ScriptProgress::Completed
    }

    /// Stop playback. Pending work is dropped and completion will never be
    /// reported.
    pub fn cancel(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        if self.state == PlayerState::Playing || self.state == PlayerState::Idle {
            self.state = PlayerState::Cancelled;
        }
    }

    /// Lines shown so far.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlayerState::Finished
    }

    /// Fraction of lines shown, for progress bars.
    pub fn progress(&self) -> f32 {
        if self.script.lines.is_empty() {
            return if self.is_finished() { 1.0 } else { 0.0 };
        }
        self.next_line as f32 / self.script.lines.len() as f32
    }

    fn schedule_next(&mut self, timers: &mut TimerQueue, rng: &mut dyn RandomSource) {
        let delay = match self.script.lines.get(self.next_line) {
            Some(line) => match self.script.timing {
                LineTiming::PerLine => line.delay_ms,
                LineTiming::Constant(ms) => ms,
                LineTiming::Uniform { min_ms, max_ms } => rng.range_inclusive(min_ms, max_ms),
            },
            None => self.script.completion_delay_ms,
        };
        self.pending = Some(timers.schedule(self.epoch, delay, TimerEvent::ScriptStep));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;

    fn drive(
        player: &mut TimedScriptPlayer,
        timers: &mut TimerQueue,
        rng: &mut SequenceRandom,
        until: u64,
    ) -> Vec<ScriptProgress> {
        let mut out = Vec::new();
        while let Some(fired) = timers.pop_due(until) {
            out.push(player.on_timer(fired.id, timers, rng));
        }
        timers.advance_to(until);
        out
    }

    fn three_lines() -> Script {
        Script {
            lines: vec![
                ScriptLine::new("one", 100),
                ScriptLine::new("two", 200),
                ScriptLine::new("three", 50),
            ],
            timing: LineTiming::PerLine,
            completion_delay_ms: 400,
        }
    }

    #[test]
    fn plays_lines_in_order_with_per_line_delays() {
        let mut timers = TimerQueue::new();
        let mut rng = SequenceRandom::constant(0.0);
        let mut p = TimedScriptPlayer::new(three_lines());
        p.start(1, &mut timers, &mut rng).unwrap();

        assert!(drive(&mut p, &mut timers, &mut rng, 99).is_empty());
        assert_eq!(
            drive(&mut p, &mut timers, &mut rng, 100),
            vec![ScriptProgress::LineAppended(0)]
        );
        drive(&mut p, &mut timers, &mut rng, 350);
        assert_eq!(p.log(), &["one", "two", "three"]);
        assert!(!p.is_finished());
        // Completion fires after the completion delay, exactly once.
        assert_eq!(
            drive(&mut p, &mut timers, &mut rng, 750),
            vec![ScriptProgress::Completed]
        );
        assert!(p.is_finished());
        assert!(drive(&mut p, &mut timers, &mut rng, 10_000).is_empty());
    }

    #[test]
    fn constant_timing() {
        let mut timers = TimerQueue::new();
        let mut rng = SequenceRandom::constant(0.0);
        let script = Script::from_lines(["a", "b"], LineTiming::Constant(10), 0);
        let mut p = TimedScriptPlayer::new(script);
        p.start(0, &mut timers, &mut rng).unwrap();
        let progress = drive(&mut p, &mut timers, &mut rng, 20);
        assert_eq!(
            progress,
            vec![
                ScriptProgress::LineAppended(0),
                ScriptProgress::LineAppended(1),
                ScriptProgress::Completed
            ]
        );
    }

    #[test]
    fn uniform_timing_draws_from_rng() {
        let mut timers = TimerQueue::new();
        // 0.0 -> min, 0.999 -> max
        let mut rng = SequenceRandom::new(vec![0.0, 0.999]);
        let script = Script::from_lines(
            ["a", "b"],
            LineTiming::Uniform {
                min_ms: 100,
                max_ms: 300,
            },
            0,
        );
        let mut p = TimedScriptPlayer::new(script);
        p.start(0, &mut timers, &mut rng).unwrap();
        assert_eq!(timers.next_due_ms(), Some(100));
        drive(&mut p, &mut timers, &mut rng, 100);
        assert_eq!(timers.next_due_ms(), Some(400));
    }

    #[test]
    fn empty_script_completes_after_delay() {
        let mut timers = TimerQueue::new();
        let mut rng = SequenceRandom::constant(0.0);
        let script = Script::from_lines(Vec::<String>::new(), LineTiming::Constant(5), 30);
        let mut p = TimedScriptPlayer::new(script);
        assert_eq!(p.progress(), 0.0);
        p.start(0, &mut timers, &mut rng).unwrap();
        assert_eq!(
            drive(&mut p, &mut timers, &mut rng, 30),
            vec![ScriptProgress::Completed]
        );
        assert_eq!(p.progress(), 1.0);
    }

    #[test]
    fn cancel_stops_everything() {
        let mut timers = TimerQueue::new();
        let mut rng = SequenceRandom::constant(0.0);
        let mut p = TimedScriptPlayer::new(three_lines());
        p.start(0, &mut timers, &mut rng).unwrap();
        drive(&mut p, &mut timers, &mut rng, 100);
        p.cancel(&mut timers);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(p.state(), PlayerState::Cancelled);
        assert!(drive(&mut p, &mut timers, &mut rng, 10_000).is_empty());
        assert_eq!(p.log(), &["one"]);
    }

    #[test]
    fn foreign_timer_is_ignored() {
        let mut timers = TimerQueue::new();
        let mut rng = SequenceRandom::constant(0.0);
        let mut p = TimedScriptPlayer::new(three_lines());
        p.start(0, &mut timers, &mut rng).unwrap();
        let other = timers.schedule(0, 1, TimerEvent::ScriptStep);
        let fired = timers.pop_due(1).unwrap();
        assert_eq!(fired.id, other);
        assert_eq!(
            p.on_timer(fired.id, &mut timers, &mut rng),
            ScriptProgress::Ignored
        );
        assert!(p.log().is_empty());
    }

    #[test]
    fn second_start_rejected() {
        let mut timers = TimerQueue::new();
        let mut rng = SequenceRandom::constant(0.0);
        let mut p = TimedScriptPlayer::new(three_lines());
        p.start(0, &mut timers, &mut rng).unwrap();
        assert!(p.start(0, &mut timers, &mut rng).is_err());
        assert_eq!(timers.pending_count(), 1);
    }

    #[test]
    fn progress_fraction() {
        let mut timers = TimerQueue::new();
        let mut rng = SequenceRandom::constant(0.0);
        let script = Script::from_lines(["a", "b", "c", "d"], LineTiming::Constant(10), 0);
        let mut p = TimedScriptPlayer::new(script);
        p.start(0, &mut timers, &mut rng).unwrap();
        drive(&mut p, &mut timers, &mut rng, 20);
        assert_eq!(p.progress(), 0.5);
    }
}
