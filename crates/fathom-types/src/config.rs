//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! facility_name = "ABYSSAL RESEARCH STATION TETHYS-7"
//! black_screen_ms = 2000
//! recovery_probability = 0.3
//!
//! [script]
//! boot_min_ms = 60
//! boot_max_ms = 240
//! ```
//!
//! Every field is optional; missing fields fall back to the defaults below.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FathomError, Result};

/// Default probability that a non-forcing crash kind requires recovery.
pub const DEFAULT_RECOVERY_PROBABILITY: f64 = 0.3;

/// Default shared secret for the hidden admin panel command.
pub const DEFAULT_ADMIN_PANEL_SECRET: &str = "DEEPBLUE";

/// Top-level FATHOM_OS configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FathomConfig {
    /// Facility name shown on the boot, login and lockdown screens.
    pub facility_name: String,
    /// Path of the JSON file backing the persistent store.
    pub store_path: PathBuf,
    /// Duration of the black screen between reboot and boot.
    pub black_screen_ms: u64,
    /// Delay between a successful lockdown authorization and session resume.
    pub lockdown_release_ms: u64,
    /// Probability that a crash of a non-forcing kind requires recovery.
    pub recovery_probability: f64,
    /// Shared secret accepted by the hidden `adminPanel` command.
    pub admin_panel_secret: String,
    /// Fixed RNG seed. `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
    /// Timing of the scripted screens.
    pub script: ScriptTiming,
}

/// Line timing for the boot / shutdown / reboot / install scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScriptTiming {
    /// Lower bound of the per-line boot delay.
    pub boot_min_ms: u64,
    /// Upper bound (inclusive) of the per-line boot delay.
    pub boot_max_ms: u64,
    /// Constant per-line delay of the shutdown script.
    pub shutdown_line_ms: u64,
    /// Constant per-line delay of the install script.
    pub install_line_ms: u64,
    /// Pause after the last line before completion is signalled.
    pub completion_delay_ms: u64,
}

impl Default for ScriptTiming {
    fn default() -> Self {
        Self {
            boot_min_ms: 60,
            boot_max_ms: 240,
            shutdown_line_ms: 350,
            install_line_ms: 300,
            completion_delay_ms: 600,
        }
    }
}

impl Default for FathomConfig {
    fn default() -> Self {
        Self {
            facility_name: "ABYSSAL RESEARCH STATION TETHYS-7".to_string(),
            store_path: PathBuf::from("fathom-store.json"),
            black_screen_ms: 2000,
            lockdown_release_ms: 1500,
            recovery_probability: DEFAULT_RECOVERY_PROBABILITY,
            admin_panel_secret: DEFAULT_ADMIN_PANEL_SECRET.to_string(),
            rng_seed: None,
            script: ScriptTiming::default(),
        }
    }
}

impl FathomConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject out-of-range values. The recovery probability is clamped
    /// rather than rejected so that a slightly-off value still boots.
    fn validate(&mut self) -> Result<()> {
        if self.script.boot_min_ms > self.script.boot_max_ms {
            return Err(FathomError::Config(format!(
                "script.boot_min_ms ({}) exceeds script.boot_max_ms ({})",
                self.script.boot_min_ms, self.script.boot_max_ms
            )));
        }
        if !self.recovery_probability.is_finite() {
            return Err(FathomError::Config(
                "recovery_probability must be a finite number".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.recovery_probability) {
            log::warn!(
                "recovery_probability {} out of range, clamping",
                self.recovery_probability
            );
            self.recovery_probability = self.recovery_probability.clamp(0.0, 1.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = FathomConfig::default();
        assert_eq!(c.black_screen_ms, 2000);
        assert_eq!(c.recovery_probability, DEFAULT_RECOVERY_PROBABILITY);
        assert_eq!(c.admin_panel_secret, "DEEPBLUE");
        assert!(c.rng_seed.is_none());
    }

    #[test]
    fn empty_toml_is_default() {
        let c = FathomConfig::from_toml_str("").unwrap();
        assert_eq!(c.lockdown_release_ms, 1500);
        assert_eq!(c.script, ScriptTiming::default());
    }

    #[test]
    fn partial_override() {
        let c = FathomConfig::from_toml_str(
            r#"
            facility_name = "HADAL OUTPOST"
            rng_seed = 7

            [script]
            shutdown_line_ms = 10
            "#,
        )
        .unwrap();
        assert_eq!(c.facility_name, "HADAL OUTPOST");
        assert_eq!(c.rng_seed, Some(7));
        assert_eq!(c.script.shutdown_line_ms, 10);
        assert_eq!(c.script.boot_max_ms, 240);
    }

    #[test]
    fn inverted_boot_range_rejected() {
        let err = FathomConfig::from_toml_str("[script]\nboot_min_ms = 500\nboot_max_ms = 100")
            .unwrap_err();
        assert!(matches!(err, FathomError::Config(_)));
    }

    #[test]
    fn probability_is_clamped() {
        let c = FathomConfig::from_toml_str("recovery_probability = 1.5").unwrap();
        assert_eq!(c.recovery_probability, 1.0);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = FathomConfig::from_toml_str("black_screen_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, FathomError::TomlParse(_)));
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = FathomConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(c.black_screen_ms, 2000);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fathom.toml");
        std::fs::write(&path, "black_screen_ms = 5").unwrap();
        let c = FathomConfig::load(&path).unwrap();
        assert_eq!(c.black_screen_ms, 5);
    }
}
