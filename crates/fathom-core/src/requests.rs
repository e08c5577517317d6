//! Requests leaf applications may raise.
//!
//! A leaf app (file browser, sonar console, ...) never sees the current mode
//! or the window set. It only gets to ask for one of these, and the
//! orchestrator decides whether the request applies.

use crate::incident::{CrashKind, CrashPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRequest {
    /// The app killed something critical and the station must crash.
    CriticalKill {
        process: String,
        kind: CrashKind,
        payload: Option<CrashPayload>,
    },
    /// The app wants the admin panel shown.
    OpenAdminPanel,
    /// The app initiated an emergency protocol.
    Lockdown { protocol: String },
}

impl AppRequest {
    /// Shorthand for a crash request without custom text.
    pub fn critical_kill(process: impl Into<String>, kind: CrashKind) -> Self {
        AppRequest::CriticalKill {
            process: process.into(),
            kind,
            payload: None,
        }
    }

    pub fn lockdown(protocol: impl Into<String>) -> Self {
        AppRequest::Lockdown {
            protocol: protocol.into(),
        }
    }
}
