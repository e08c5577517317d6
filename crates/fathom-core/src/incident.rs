//! Simulated incidents: crashes and lockdowns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use fathom_types::config::DEFAULT_RECOVERY_PROBABILITY;
use fathom_types::error::FathomError;

use crate::rng::RandomSource;

/// Category of a simulated total-failure event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrashKind {
    Kernel,
    Virus,
    Bluescreen,
    Memory,
    Corruption,
    Overload,
}

impl CrashKind {
    pub const ALL: [CrashKind; 6] = [
        CrashKind::Kernel,
        CrashKind::Virus,
        CrashKind::Bluescreen,
        CrashKind::Memory,
        CrashKind::Corruption,
        CrashKind::Overload,
    ];

    /// Kinds that always leave the system needing recovery.
    pub fn forces_recovery(self) -> bool {
        matches!(self, CrashKind::Virus | CrashKind::Corruption)
    }

    /// Title shown on the crash screen.
    pub fn headline(self) -> &'static str {
        match self {
            CrashKind::Kernel => "KERNEL PANIC",
            CrashKind::Virus => "HOSTILE CODE DETECTED",
            CrashKind::Bluescreen => "FATAL EXCEPTION 0E",
            CrashKind::Memory => "MEMORY ACCESS VIOLATION",
            CrashKind::Corruption => "FILESYSTEM CORRUPTION",
            CrashKind::Overload => "SYSTEM OVERLOAD",
        }
    }

    /// Body text shown when the reporter supplied none.
    pub fn default_message(self) -> &'static str {
        match self {
            CrashKind::Kernel => "Attempted to kill init. The station kernel has halted.",
            CrashKind::Virus => {
                "Self-replicating payload found in ballast control firmware. All processes quarantined."
            },
            CrashKind::Bluescreen => {
                "A fatal exception has occurred at 0028:C0011E36. The current session will be terminated."
            },
            CrashKind::Memory => "Segmentation fault in a privileged process. Core dumped.",
            CrashKind::Corruption => "Superblock checksum mismatch on /station. Volume is read-only.",
            CrashKind::Overload => "Process table exhausted. Thermal limits exceeded on compute rack B.",
        }
    }
}

impl fmt::Display for CrashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CrashKind::Kernel => "kernel",
            CrashKind::Virus => "virus",
            CrashKind::Bluescreen => "bluescreen",
            CrashKind::Memory => "memory",
            CrashKind::Corruption => "corruption",
            CrashKind::Overload => "overload",
        };
        f.write_str(s)
    }
}

impl FromStr for CrashKind {
    type Err = FathomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrashKind::ALL
            .into_iter()
            .find(|k| k.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FathomError::Command(format!("unknown crash kind: {s}")))
    }
}

/// Reporter-supplied crash screen text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashPayload {
    pub title: String,
    pub message: String,
}

/// Everything the crash screen needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashContext {
    pub process_name: String,
    pub kind: CrashKind,
    pub custom_payload: Option<CrashPayload>,
}

impl CrashContext {
    pub fn title(&self) -> &str {
        self.custom_payload
            .as_ref()
            .map_or(self.kind.headline(), |p| p.title.as_str())
    }

    pub fn message(&self) -> &str {
        self.custom_payload
            .as_ref()
            .map_or(self.kind.default_message(), |p| p.message.as_str())
    }
}

/// An active lockdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockdownContext {
    pub protocol_name: String,
    /// Rejected authorization attempts. Displayed, never enforced.
    pub failed_attempts: u32,
    /// Authorization succeeded and the release delay is running.
    pub releasing: bool,
}

impl LockdownContext {
    pub fn new(protocol_name: impl Into<String>) -> Self {
        Self {
            protocol_name: protocol_name.into(),
            failed_attempts: 0,
            releasing: false,
        }
    }
}

/// Decides whether a crash leaves the system needing recovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryPolicy {
    /// Probability that a non-forcing crash kind needs recovery.
    pub probability: f64,
}

impl RecoveryPolicy {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    /// Rolls above this value require recovery.
    pub fn threshold(&self) -> f64 {
        1.0 - self.probability
    }

    /// Forcing kinds never consume a random draw; every other kind draws
    /// exactly once and needs recovery when the draw reaches the threshold.
    pub fn requires_recovery(&self, kind: CrashKind, rng: &mut dyn RandomSource) -> bool {
        if kind.forces_recovery() {
            return true;
        }
        let roll = rng.next_f64();
        let needed = roll >= self.threshold();
        log::debug!(
            "Recovery roll for {kind}: {roll:.3} vs threshold {:.3} -> {needed}",
            self.threshold()
        );
        needed
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RECOVERY_PROBABILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;

    #[test]
    fn parse_kind() {
        assert_eq!("virus".parse::<CrashKind>().unwrap(), CrashKind::Virus);
        assert_eq!(
            "BlueScreen".parse::<CrashKind>().unwrap(),
            CrashKind::Bluescreen
        );
        assert!("meltdown".parse::<CrashKind>().is_err());
    }

    #[test]
    fn forcing_kinds() {
        let forcing: Vec<CrashKind> = CrashKind::ALL
            .into_iter()
            .filter(|k| k.forces_recovery())
            .collect();
        assert_eq!(forcing, vec![CrashKind::Virus, CrashKind::Corruption]);
    }

    #[test]
    fn forcing_kind_does_not_draw() {
        let policy = RecoveryPolicy::new(0.0);
        let mut rng = SequenceRandom::new(vec![0.0, 0.99]);
        assert!(policy.requires_recovery(CrashKind::Virus, &mut rng));
        // The first value is still unconsumed.
        assert_eq!(rng.next_f64(), 0.0);
    }

    #[test]
    fn roll_below_threshold_needs_no_recovery() {
        let policy = RecoveryPolicy::default();
        let mut rng = SequenceRandom::constant(0.1);
        assert!(!policy.requires_recovery(CrashKind::Bluescreen, &mut rng));
    }

    #[test]
    fn roll_above_threshold_needs_recovery() {
        let policy = RecoveryPolicy::default();
        let mut rng = SequenceRandom::constant(0.95);
        assert!(policy.requires_recovery(CrashKind::Bluescreen, &mut rng));
    }

    #[test]
    fn probability_extremes() {
        let mut rng = SequenceRandom::new(vec![0.0, 0.5, 0.999]);
        let never = RecoveryPolicy::new(0.0);
        let always = RecoveryPolicy::new(1.0);
        for _ in 0..3 {
            assert!(!never.requires_recovery(CrashKind::Kernel, &mut rng));
        }
        for _ in 0..3 {
            assert!(always.requires_recovery(CrashKind::Kernel, &mut rng));
        }
    }

    #[test]
    fn custom_payload_overrides_text() {
        let mut ctx = CrashContext {
            process_name: "sonar".into(),
            kind: CrashKind::Overload,
            custom_payload: None,
        };
        assert_eq!(ctx.title(), "SYSTEM OVERLOAD");
        ctx.custom_payload = Some(CrashPayload {
            title: "LEVIATHAN CONTACT".into(),
            message: "Array saturated.".into(),
        });
        assert_eq!(ctx.title(), "LEVIATHAN CONTACT");
        assert_eq!(ctx.message(), "Array saturated.");
    }
}
