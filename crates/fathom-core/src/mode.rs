//! The top-level screen modes.

use std::fmt;

/// Which full-screen thing is showing. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    NeedsAdminSetup,
    Installing,
    Booting,
    LoggedOut,
    Session,
    ShuttingDown,
    Rebooting,
    BlackScreenPause,
    Crashed,
    Lockdown,
    RecoveryMode,
}

impl Mode {
    /// Every mode, in lifecycle order.
    pub const ALL: [Mode; 11] = [
        Mode::NeedsAdminSetup,
        Mode::Installing,
        Mode::Booting,
        Mode::LoggedOut,
        Mode::Session,
        Mode::ShuttingDown,
        Mode::Rebooting,
        Mode::BlackScreenPause,
        Mode::Crashed,
        Mode::Lockdown,
        Mode::RecoveryMode,
    ];

    /// Whether a critical failure report may move this mode to `Crashed`.
    pub fn accepts_crash(self) -> bool {
        !matches!(
            self,
            Mode::NeedsAdminSetup
                | Mode::ShuttingDown
                | Mode::Crashed
                | Mode::Lockdown
                | Mode::RecoveryMode
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::NeedsAdminSetup => "needs-admin-setup",
            Mode::Installing => "installing",
            Mode::Booting => "booting",
            Mode::LoggedOut => "logged-out",
            Mode::Session => "session",
            Mode::ShuttingDown => "shutting-down",
            Mode::Rebooting => "rebooting",
            Mode::BlackScreenPause => "black-screen",
            Mode::Crashed => "crashed",
            Mode::Lockdown => "lockdown",
            Mode::RecoveryMode => "recovery",
        };
        f.write_str(s)
    }
}
