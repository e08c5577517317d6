//! State that exists only while a user is logged in.
//!
//! A [`Session`] is built by the orchestrator on login and lives inside the
//! `Session` (or suspended inside the `Lockdown`) screen. Overlay flags are
//! only reachable through it, so they cannot be set outside a session.

use std::fmt;
use std::str::FromStr;

use fathom_types::error::FathomError;
use fathom_wm::{WindowManager, ZOrderCounter};

/// Secondary panels that can be shown on top of the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    AdminPanel,
    Maintenance,
    FirstRunTour,
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overlay::AdminPanel => write!(f, "admin-panel"),
            Overlay::Maintenance => write!(f, "maintenance"),
            Overlay::FirstRunTour => write!(f, "first-run-tour"),
        }
    }
}

impl FromStr for Overlay {
    type Err = FathomError;

    /// Accepts `admin-panel`, `adminPanel`, `adminPanelOpen`, `admin_panel`
    /// and the equivalent spellings of the other overlays.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let folded = folded.strip_suffix("open").unwrap_or(&folded);
        match folded {
            "adminpanel" | "admin" => Ok(Overlay::AdminPanel),
            "maintenance" => Ok(Overlay::Maintenance),
            "firstruntour" | "tour" => Ok(Overlay::FirstRunTour),
            _ => Err(FathomError::Command(format!("unknown overlay: {s}"))),
        }
    }
}

/// Independent overlay flags of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOverlays {
    admin_panel_open: bool,
    maintenance_open: bool,
    first_run_tour_open: bool,
}

impl SessionOverlays {
    pub(crate) fn new(first_run_tour_open: bool) -> Self {
        Self {
            first_run_tour_open,
            ..Self::default()
        }
    }

    pub fn admin_panel_open(&self) -> bool {
        self.admin_panel_open
    }

    pub fn maintenance_open(&self) -> bool {
        self.maintenance_open
    }

    pub fn first_run_tour_open(&self) -> bool {
        self.first_run_tour_open
    }

    pub fn is_open(&self, overlay: Overlay) -> bool {
        match overlay {
            Overlay::AdminPanel => self.admin_panel_open,
            Overlay::Maintenance => self.maintenance_open,
            Overlay::FirstRunTour => self.first_run_tour_open,
        }
    }

    /// Whether any overlay is covering the desktop.
    pub fn any_open(&self) -> bool {
        self.admin_panel_open || self.maintenance_open || self.first_run_tour_open
    }

    fn set(&mut self, overlay: Overlay, value: bool) {
        match overlay {
            Overlay::AdminPanel => self.admin_panel_open = value,
            Overlay::Maintenance => self.maintenance_open = value,
            Overlay::FirstRunTour => self.first_run_tour_open = value,
        }
    }
}

/// One logged-in desktop session.
#[derive(Debug)]
pub struct Session {
    user: String,
    wm: WindowManager,
    overlays: SessionOverlays,
}

impl Session {
    pub(crate) fn new(user: String, counter: ZOrderCounter, show_tour: bool) -> Self {
        Self {
            user,
            wm: WindowManager::new(counter),
            overlays: SessionOverlays::new(show_tour),
        }
    }

    /// Name of the logged-in user.
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn windows(&self) -> &WindowManager {
        &self.wm
    }

    pub(crate) fn windows_mut(&mut self) -> &mut WindowManager {
        &mut self.wm
    }

    pub fn overlays(&self) -> &SessionOverlays {
        &self.overlays
    }

    pub(crate) fn set_overlay(&mut self, overlay: Overlay, value: bool) {
        self.overlays.set(overlay, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_parse_spellings() {
        for s in ["adminPanel", "adminPanelOpen", "admin-panel", "admin_panel"] {
            assert_eq!(s.parse::<Overlay>().unwrap(), Overlay::AdminPanel);
        }
        assert_eq!(
            "maintenanceOpen".parse::<Overlay>().unwrap(),
            Overlay::Maintenance
        );
        assert_eq!(
            "first-run-tour".parse::<Overlay>().unwrap(),
            Overlay::FirstRunTour
        );
        assert!("periscope".parse::<Overlay>().is_err());
    }

    #[test]
    fn overlay_display_roundtrips_through_parse() {
        for o in [Overlay::AdminPanel, Overlay::Maintenance, Overlay::FirstRunTour] {
            assert_eq!(o.to_string().parse::<Overlay>().unwrap(), o);
        }
    }

    #[test]
    fn overlays_start_closed_except_tour() {
        let o = SessionOverlays::new(true);
        assert!(o.first_run_tour_open());
        assert!(!o.admin_panel_open());
        assert!(!o.maintenance_open());
        assert!(o.any_open());
        assert!(!SessionOverlays::new(false).any_open());
    }

    #[test]
    fn set_is_independent() {
        let mut s = Session::new("warden".into(), ZOrderCounter::new(), false);
        s.set_overlay(Overlay::Maintenance, true);
        s.set_overlay(Overlay::AdminPanel, true);
        s.set_overlay(Overlay::Maintenance, false);
        assert!(s.overlays().admin_panel_open());
        assert!(!s.overlays().maintenance_open());
        assert_eq!(s.user(), "warden");
    }
}
