//! Cooperative timer queue driven by a virtual millisecond clock.
//!
//! Nothing here runs on its own: the host advances the clock (from a frame
//! loop, a console, or a test) and the orchestrator fires whatever came due.
//! Every timer is tagged with the epoch of the screen that scheduled it, so
//! tearing a screen down cancels all of its pending work in one call.

/// Handle returned by [`TimerQueue::schedule`].
pub type TimerId = u64;

/// Identifies one screen instance. Bumped on every mode change.
pub type Epoch = u64;

/// What a timer means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Advance the active screen's script by one step.
    ScriptStep,
    /// The black screen between reboot and boot has elapsed.
    BlackScreenElapsed,
    /// The lockdown release delay after a successful authorization.
    LockdownRelease,
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub epoch: Epoch,
    pub event: TimerEvent,
    /// Virtual time at which it fired.
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
struct Pending {
    id: TimerId,
    due_ms: u64,
    epoch: Epoch,
    event: TimerEvent,
}

/// Single-threaded queue of scheduled callbacks.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: TimerId,
    pending: Vec<Pending>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `event` to fire `delay_ms` from now on behalf of `epoch`.
    pub fn schedule(&mut self, epoch: Epoch, delay_ms: u64, event: TimerEvent) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            epoch,
            event,
        });
        id
    }

    /// Cancel one timer. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancel every timer scheduled by `epoch`. Returns how many were dropped.
    pub fn cancel_epoch(&mut self, epoch: Epoch) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.epoch != epoch);
        let dropped = before - self.pending.len();
        if dropped > 0 {
            log::debug!("Cancelled {dropped} pending timers of epoch {epoch}");
        }
        dropped
    }

    /// Number of timers not yet fired.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Virtual time of the earliest pending timer.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    /// Remove and return the earliest timer due at or before `until_ms`,
    /// moving the clock forward to its due time. Ties fire in scheduling
    /// order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<FiredTimer> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= until_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.id))
            .map(|(i, _)| i)?;
        let p = self.pending.swap_remove(idx);
        self.now_ms = self.now_ms.max(p.due_ms);
        Some(FiredTimer {
            id: p.id,
            epoch: p.epoch,
            event: p.event,
            at_ms: self.now_ms,
        })
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(0, 300, TimerEvent::ScriptStep);
        q.schedule(0, 100, TimerEvent::BlackScreenElapsed);
        let first = q.pop_due(1000).unwrap();
        assert_eq!(first.event, TimerEvent::BlackScreenElapsed);
        assert_eq!(first.at_ms, 100);
        let second = q.pop_due(1000).unwrap();
        assert_eq!(second.event, TimerEvent::ScriptStep);
        assert_eq!(q.now_ms(), 300);
        assert!(q.pop_due(1000).is_none());
    }

    #[test]
    fn ties_fire_in_schedule_order() {
        let mut q = TimerQueue::new();
        let a = q.schedule(0, 50, TimerEvent::ScriptStep);
        let b = q.schedule(0, 50, TimerEvent::LockdownRelease);
        assert_eq!(q.pop_due(50).unwrap().id, a);
        assert_eq!(q.pop_due(50).unwrap().id, b);
    }

    #[test]
    fn not_due_yet() {
        let mut q = TimerQueue::new();
        q.schedule(0, 500, TimerEvent::ScriptStep);
        assert!(q.pop_due(499).is_none());
        assert_eq!(q.pending_count(), 1);
        assert_eq!(q.next_due_ms(), Some(500));
    }

    #[test]
    fn cancel_single() {
        let mut q = TimerQueue::new();
        let id = q.schedule(0, 10, TimerEvent::ScriptStep);
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.pop_due(100).is_none());
    }

    #[test]
    fn cancel_epoch_only_hits_that_epoch() {
        let mut q = TimerQueue::new();
        q.schedule(1, 10, TimerEvent::ScriptStep);
        q.schedule(1, 20, TimerEvent::ScriptStep);
        q.schedule(2, 30, TimerEvent::BlackScreenElapsed);
        assert_eq!(q.cancel_epoch(1), 2);
        let fired = q.pop_due(100).unwrap();
        assert_eq!(fired.epoch, 2);
    }

    #[test]
    fn delay_is_relative_to_now() {
        let mut q = TimerQueue::new();
        q.advance_to(1000);
        q.schedule(0, 5, TimerEvent::ScriptStep);
        assert_eq!(q.next_due_ms(), Some(1005));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut q = TimerQueue::new();
        q.advance_to(200);
        q.advance_to(100);
        assert_eq!(q.now_ms(), 200);
    }
}
