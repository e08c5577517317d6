//! Process-wide paint-order counter.

use std::cell::Cell;
use std::rc::Rc;

/// First z-index handed out by a fresh counter.
pub const Z_BASE: u32 = 10;

/// Monotonically increasing z-index source.
///
/// Handles from [`share`](Self::share) use the same underlying counter, so
/// a counter created once per process can be handed to every window manager
/// the orchestrator builds and values keep increasing across sessions.
/// Single-threaded by construction.
#[derive(Debug)]
pub struct ZOrderCounter {
    next: Rc<Cell<u32>>,
}

impl ZOrderCounter {
    /// Create a counter starting at [`Z_BASE`].
    pub fn new() -> Self {
        Self {
            next: Rc::new(Cell::new(Z_BASE)),
        }
    }

    /// Consume and return the next z-index, or `None` once the range is
    /// exhausted. A value is never handed out twice between re-bases.
    pub fn next_z(&self) -> Option<u32> {
        let z = self.next.get();
        let after = z.checked_add(1)?;
        self.next.set(after);
        Some(z)
    }

    /// Restart the sequence at `z`. Callers must first move every live
    /// window below `z`.
    pub fn rebase(&self, z: u32) {
        self.next.set(z);
    }

    #[cfg(test)]
    pub(crate) fn starting_at(z: u32) -> Self {
        Self {
            next: Rc::new(Cell::new(z)),
        }
    }

    /// The value the next call to [`next_z`](Self::next_z) will return.
    pub fn peek(&self) -> u32 {
        self.next.get()
    }

    /// A handle sharing this counter.
    pub fn share(&self) -> Self {
        Self {
            next: Rc::clone(&self.next),
        }
    }
}

impl Default for ZOrderCounter {
    fn default() -> Self {
        Self::new()
    }
}
