//! Well-known store keys.

/// The admin credential record created during installation.
pub const ADMIN_CREDENTIAL: &str = "fathom.admin_credential";

/// Set once the first-run tour has been completed or dismissed.
pub const TOUR_COMPLETED: &str = "fathom.first_run_tour_completed";

/// Desktop icon positions.
pub const ICON_LAYOUT: &str = "fathom.desktop_icon_layout";

/// Prefix for per-application saved state blobs.
pub const APP_STATE_PREFIX: &str = "fathom.app_state.";

/// Key holding the saved state of one application.
pub fn app_state_key(app_id: &str) -> String {
    format!("{APP_STATE_PREFIX}{app_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_key_is_prefixed() {
        assert_eq!(app_state_key("calculator"), "fathom.app_state.calculator");
        assert!(app_state_key("x").starts_with(APP_STATE_PREFIX));
    }
}
