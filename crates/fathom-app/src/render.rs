//! Text rendering of the current screen.

use fathom_core::{Mode, SessionOrchestrator};

/// Lines of script log shown at once.
const LOG_TAIL: usize = 12;

/// Render the active screen as console lines.
pub fn render(orch: &SessionOrchestrator) -> Vec<String> {
    let facility = &orch.config().facility_name;
    let mut lines = vec![format!("==[ FATHOM_OS :: {} ]==", orch.mode())];

    match orch.mode() {
        Mode::NeedsAdminSetup => {
            lines.push(format!("{facility} :: first-run setup"));
            lines.push("No administrator on record. Use: setup <user> <pass>".to_string());
        },
        Mode::Installing | Mode::Booting | Mode::Rebooting | Mode::ShuttingDown => {
            let log = orch.script_log();
            let start = log.len().saturating_sub(LOG_TAIL);
            lines.extend(log[start..].iter().cloned());
            if let Some(progress) = orch.script_progress() {
                lines.push(progress_bar(progress));
            }
            if orch.is_halted() {
                lines.push("System halted. Type 'relaunch' to power on.".to_string());
            }
        },
        Mode::LoggedOut => {
            lines.push(facility.clone());
            if let Some(cred) = orch.admin_credential() {
                lines.push(format!("Welcome back, {}. Type 'login'.", cred.greeting_name()));
            }
        },
        Mode::Session => render_session(orch, &mut lines),
        Mode::BlackScreenPause => lines.push(String::new()),
        Mode::Crashed => {
            if let Some(ctx) = orch.crash_context() {
                lines.push(format!("*** {} ***", ctx.title()));
                lines.push(ctx.message().to_string());
                lines.push(format!("Process: {}", ctx.process_name));
                lines.push("Type 'ack' to restart.".to_string());
            }
        },
        Mode::Lockdown => {
            if let Some(ctx) = orch.lockdown_context() {
                lines.push(format!("!!! LOCKDOWN: PROTOCOL {} !!!", ctx.protocol_name));
                if ctx.releasing {
                    lines.push("Override accepted. Releasing...".to_string());
                } else {
                    lines.push("Administrator override required: auth <password>".to_string());
                }
                if ctx.failed_attempts > 0 {
                    lines.push(format!("Failed attempts: {}", ctx.failed_attempts));
                }
            }
        },
        Mode::RecoveryMode => {
            if let Some(console) = orch.recovery_console() {
                let t = console.transcript();
                let start = t.len().saturating_sub(LOG_TAIL);
                lines.extend(t[start..].iter().cloned());
            }
        },
    }
    lines
}

fn render_session(orch: &SessionOrchestrator, lines: &mut Vec<String>) {
    let Some(session) = orch.session() else {
        return;
    };
    lines.push(format!("Logged in as {}", session.user()));

    let overlays = session.overlays();
    if overlays.maintenance_open() {
        lines.push("[ MAINTENANCE MODE ]".to_string());
    }
    if overlays.admin_panel_open() {
        lines.push("[ ADMIN PANEL ]".to_string());
    }
    if overlays.first_run_tour_open() {
        lines.push("[ WELCOME TOUR ] type 'tour' to dismiss".to_string());
    }

    let windows = orch.windows();
    if windows.is_empty() {
        lines.push("(desktop empty, 'apps' lists applications)".to_string());
    }
    let active = session.windows().active_window().map(|w| w.id.as_str());
    for w in windows {
        let marker = if Some(w.id.as_str()) == active { '*' } else { ' ' };
        lines.push(format!("{marker} [{}] {}", w.app.glyph, w.app.title));
    }
}

fn progress_bar(progress: f32) -> String {
    const WIDTH: usize = 30;
    let filled = ((progress.clamp(0.0, 1.0) * WIDTH as f32).round() as usize).min(WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(WIDTH - filled))
}
