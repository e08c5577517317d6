//! Window manager for FATHOM_OS.
//!
//! Owns the set of open application windows and their paint order for the
//! lifetime of one desktop session. Every operation is total: unknown window
//! ids are ignored rather than reported.

pub mod catalog;
pub mod manager;
pub mod window;
pub mod zorder;

pub use catalog::{builtin_apps, find_app};
pub use manager::{WindowManager, WmEvent};
pub use window::{AppRef, Window};
pub use zorder::ZOrderCounter;
