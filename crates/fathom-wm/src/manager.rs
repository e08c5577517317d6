//! Open-window bookkeeping and z-ordering.

use crate::window::{AppRef, Window};
use crate::zorder::{Z_BASE, ZOrderCounter};

/// What a window operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    /// A new window was created for this app id.
    WindowOpened(String),
    /// An existing window was raised to the top.
    WindowFocused(String),
    /// A window was removed.
    WindowClosed(String),
    /// The operation referred to a window that is not open.
    None,
}

/// Owns the open windows of one desktop session.
///
/// Windows are kept in the order they were opened; paint order is carried
/// by each window's `z_index`, drawn from a [`ZOrderCounter`] that may be
/// shared with other window managers.
#[derive(Debug)]
pub struct WindowManager {
    windows: Vec<Window>,
    counter: ZOrderCounter,
}

impl WindowManager {
    /// Create an empty window manager drawing z-indices from `counter`.
    pub fn new(counter: ZOrderCounter) -> Self {
        Self {
            windows: Vec::new(),
            counter,
        }
    }

    /// Open a window for `app`, or raise it if one is already open.
    pub fn open_window(&mut self, app: &AppRef) -> WmEvent {
        if self.windows.iter().any(|w| w.id == app.id) {
            return self.focus_window(&app.id);
        }
        let z = self.next_z();
        self.windows.push(Window::new(app, z));
        log::debug!("Opened window '{}' at z={z}", app.id);
        WmEvent::WindowOpened(app.id.clone())
    }

    /// Raise a window to the top. No-op if `id` is not open.
    pub fn focus_window(&mut self, id: &str) -> WmEvent {
        if !self.is_open(id) {
            return WmEvent::None;
        }
        let z = self.next_z();
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.z_index = z;
        }
        log::debug!("Focused window '{id}' at z={z}");
        WmEvent::WindowFocused(id.to_string())
    }

    /// Close a window. No-op if `id` is not open.
    pub fn close_window(&mut self, id: &str) -> WmEvent {
        let before = self.windows.len();
        self.windows.retain(|w| w.id != id);
        if self.windows.len() == before {
            return WmEvent::None;
        }
        log::debug!("Closed window '{id}'");
        WmEvent::WindowClosed(id.to_string())
    }

    /// Open windows in paint order (topmost last).
    ///
    /// Only meaningful for rendering; positions in the returned list shift
    /// with every focus change.
    pub fn list_windows(&self) -> Vec<&Window> {
        let mut sorted: Vec<&Window> = self.windows.iter().collect();
        sorted.sort_by_key(|w| w.z_index);
        sorted
    }

    /// The topmost window, if any.
    pub fn active_window(&self) -> Option<&Window> {
        self.windows.iter().max_by_key(|w| w.z_index)
    }

    /// Look up an open window by id.
    pub fn get(&self, id: &str) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Whether a window for `id` is open.
    pub fn is_open(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Draw a z-index. When the counter runs out, open windows are
    /// renumbered from [`Z_BASE`] in their current paint order and the
    /// counter restarts just above them.
    fn next_z(&mut self) -> u32 {
        if let Some(z) = self.counter.next_z() {
            return z;
        }
        log::warn!(
            "Z-order exhausted, re-basing {} windows at {Z_BASE}",
            self.windows.len()
        );
        let mut order: Vec<usize> = (0..self.windows.len()).collect();
        order.sort_by_key(|&i| self.windows[i].z_index);
        let mut z = Z_BASE;
        for i in order {
            self.windows[i].z_index = z;
            z += 1;
        }
        self.counter.rebase(z);
        self.counter.next_z().unwrap_or(z)
    }

    /// Number of open windows.
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new(ZOrderCounter::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str) -> AppRef {
        AppRef::new(id, id.to_uppercase(), '#')
    }

    #[test]
    fn open_creates_window() {
        let mut wm = WindowManager::default();
        assert_eq!(
            wm.open_window(&app("terminal")),
            WmEvent::WindowOpened("terminal".into())
        );
        assert_eq!(wm.window_count(), 1);
        assert!(wm.is_open("terminal"));
    }

    #[test]
    fn reopen_focuses_instead_of_duplicating() {
        let mut wm = WindowManager::default();
        wm.open_window(&app("a"));
        wm.open_window(&app("b"));
        let ev = wm.open_window(&app("a"));
        assert_eq!(ev, WmEvent::WindowFocused("a".into()));
        assert_eq!(wm.window_count(), 2);
        // The second open of `a` assigned the most recent value.
        let za = wm.get("a").unwrap().z_index;
        let zb = wm.get("b").unwrap().z_index;
        assert!(za > zb);
        assert_eq!(za, wm.counter.peek() - 1);
    }

    #[test]
    fn open_twice_in_a_row_is_single_topmost_window() {
        let mut wm = WindowManager::default();
        wm.open_window(&app("files"));
        wm.open_window(&app("terminal"));
        wm.open_window(&app("terminal"));
        let terminals = wm
            .list_windows()
            .iter()
            .filter(|w| w.id == "terminal")
            .count();
        assert_eq!(terminals, 1);
        assert_eq!(wm.active_window().unwrap().id, "terminal");
    }

    #[test]
    fn focus_raises_to_top() {
        let mut wm = WindowManager::default();
        wm.open_window(&app("a"));
        wm.open_window(&app("b"));
        assert_eq!(wm.active_window().unwrap().id, "b");
        wm.focus_window("a");
        assert_eq!(wm.active_window().unwrap().id, "a");
    }

    #[test]
    fn focus_absent_is_noop() {
        let mut wm = WindowManager::default();
        wm.open_window(&app("a"));
        let before = wm.counter.peek();
        assert_eq!(wm.focus_window("ghost"), WmEvent::None);
        assert_eq!(wm.counter.peek(), before);
    }

    #[test]
    fn close_removes_window() {
        let mut wm = WindowManager::default();
        wm.open_window(&app("a"));
        assert_eq!(wm.close_window("a"), WmEvent::WindowClosed("a".into()));
        assert_eq!(wm.window_count(), 0);
        assert!(wm.active_window().is_none());
    }

    #[test]
    fn close_absent_is_noop() {
        let mut wm = WindowManager::default();
        wm.open_window(&app("a"));
        assert_eq!(wm.close_window("ghost"), WmEvent::None);
        assert_eq!(wm.window_count(), 1);
    }

    #[test]
    fn close_then_reopen_gets_higher_z() {
        let mut wm = WindowManager::default();
        wm.open_window(&app("a"));
        wm.open_window(&app("b"));
        let highest = wm.list_windows().last().unwrap().z_index;
        wm.close_window("a");
        wm.open_window(&app("a"));
        assert!(wm.get("a").unwrap().z_index > highest);
    }

    #[test]
    fn list_is_paint_order() {
        let mut wm = WindowManager::default();
        wm.open_window(&app("a"));
        wm.open_window(&app("b"));
        wm.open_window(&app("c"));
        wm.focus_window("a");
        let ids: Vec<&str> = wm.list_windows().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn shared_counter_keeps_increasing_across_managers() {
        let counter = ZOrderCounter::new();
        let mut first = WindowManager::new(counter.share());
        first.open_window(&app("a"));
        let old_z = first.get("a").unwrap().z_index;
        drop(first);
        let mut second = WindowManager::new(counter.share());
        second.open_window(&app("a"));
        assert!(second.get("a").unwrap().z_index > old_z);
    }

    #[test]
    fn exhausted_counter_rebases_open_windows() {
        let mut wm = WindowManager::new(ZOrderCounter::starting_at(u32::MAX - 2));
        wm.open_window(&app("a"));
        wm.open_window(&app("b"));
        assert_eq!(wm.get("b").unwrap().z_index, u32::MAX - 1);

        wm.open_window(&app("c"));
        let ids: Vec<&str> = wm.list_windows().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let zs: Vec<u32> = wm.list_windows().iter().map(|w| w.z_index).collect();
        assert_eq!(zs, vec![Z_BASE, Z_BASE + 1, Z_BASE + 2]);

        wm.focus_window("a");
        assert_eq!(wm.active_window().unwrap().id, "a");
        assert_eq!(wm.get("a").unwrap().z_index, Z_BASE + 3);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Open(u8),
            Focus(u8),
            Close(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..5).prop_map(Op::Open),
                (0u8..5).prop_map(Op::Focus),
                (0u8..5).prop_map(Op::Close),
            ]
        }

        proptest! {
            #[test]
            fn invariants_hold(ops in proptest::collection::vec(op(), 0..64)) {
                let mut wm = WindowManager::default();
                let mut last_peek = 0u32;
                for op in ops {
                    match op {
                        Op::Open(n) => { wm.open_window(&app(&format!("app{n}"))); },
                        Op::Focus(n) => { wm.focus_window(&format!("app{n}")); },
                        Op::Close(n) => { wm.close_window(&format!("app{n}")); },
                    }

                    // At most one window per app id.
                    let mut ids: Vec<&str> = wm.list_windows().iter().map(|w| w.id.as_str()).collect();
                    let total = ids.len();
                    ids.sort_unstable();
                    ids.dedup();
                    prop_assert_eq!(ids.len(), total);

                    // z-indices pairwise distinct and strictly increasing in paint order.
                    let zs: Vec<u32> = wm.list_windows().iter().map(|w| w.z_index).collect();
                    prop_assert!(zs.windows(2).all(|p| p[0] < p[1]));

                    // The counter never goes backwards, and every open window
                    // holds a value it already handed out.
                    let next = wm.counter.peek();
                    prop_assert!(next >= last_peek);
                    prop_assert!(zs.iter().all(|z| *z < next));
                    last_peek = next;
                }
            }
        }
    }
}
