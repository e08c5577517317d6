//! FATHOM_OS core framework.
//!
//! The session orchestrator: a top-level state machine deciding which
//! full-screen mode the facility terminal shows (install, boot, login,
//! desktop session, shutdown, reboot, crash, lockdown, recovery), the window
//! manager it hosts during a session, and the cooperative timer and script
//! machinery behind the scripted screens. Platform-free; front ends drive it
//! with events and clock ticks.

// Re-exports from the foundation crates.
pub use fathom_store as store;
pub use fathom_types::config;
pub use fathom_types::error;
pub use fathom_types::input;
pub use fathom_wm as wm;

pub mod commands;
pub mod incident;
pub mod mode;
pub mod orchestrator;
pub mod recovery;
pub mod requests;
pub mod rng;
pub mod script;
pub mod session;
pub mod timer;

pub use commands::{CommandAction, CommandBus, CommandContext, HiddenCommand};
pub use incident::{CrashContext, CrashKind, CrashPayload, LockdownContext, RecoveryPolicy};
pub use mode::Mode;
pub use orchestrator::SessionOrchestrator;
pub use requests::AppRequest;
pub use rng::{RandomSource, SequenceRandom, StdRandom};
pub use session::{Overlay, Session, SessionOverlays};
