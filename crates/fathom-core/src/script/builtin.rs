//! The station's scripted screens.

use fathom_types::config::ScriptTiming;

use super::{LineTiming, Script, ScriptLine};

/// Power-on self test and service bring-up. Lines arrive with random jitter.
pub fn boot(facility: &str, timing: &ScriptTiming) -> Script {
    let lines = [
        "ABYSSAL SYSTEMS BIOS v4.2.7 (c) 2041 Halcyon Deepwater".to_string(),
        "Memory test ......................... 65536K OK".to_string(),
        "Pressure hull telemetry ............. NOMINAL (412 bar)".to_string(),
        "Mounting /station ................... done".to_string(),
        "Starting ballast controller ......... [ OK ]".to_string(),
        "Starting life support daemon ........ [ OK ]".to_string(),
        "Starting sonar array ................ [ OK ]".to_string(),
        "Starting comms relay (surface buoy) . [WARN] link degraded".to_string(),
        "Starting camera multiplexer ......... [ OK ]".to_string(),
        format!("Welcome to {facility}"),
    ];
    Script::from_lines(
        lines,
        LineTiming::Uniform {
            min_ms: timing.boot_min_ms,
            max_ms: timing.boot_max_ms,
        },
        timing.completion_delay_ms,
    )
}

/// Orderly shutdown at a steady pace.
pub fn shutdown(timing: &ScriptTiming) -> Script {
    Script::from_lines(
        [
            "Broadcasting shutdown notice to all decks...",
            "Stopping camera multiplexer ......... [ OK ]",
            "Stopping sonar array ................ [ OK ]",
            "Flushing research logs to cold storage",
            "Life support switching to autonomous mode",
            "Unmounting /station ................. done",
            "It is now safe to leave the terminal.",
        ],
        LineTiming::Constant(timing.shutdown_line_ms),
        timing.completion_delay_ms,
    )
}

/// Warm reboot; each step has its own pacing.
pub fn reboot(timing: &ScriptTiming) -> Script {
    Script {
        lines: vec![
            ScriptLine::new("Reboot requested.", 150),
            ScriptLine::new("Sending SIGTERM to all station processes", 400),
            ScriptLine::new("Syncing disks", 600),
            ScriptLine::new("Parking sonar array", 300),
            ScriptLine::new("Resetting watchdog", 250),
            ScriptLine::new("Restarting system...", 500),
        ],
        timing: LineTiming::PerLine,
        completion_delay_ms: timing.completion_delay_ms,
    }
}

/// First-run installation after the administrator account is created.
pub fn install(username: &str, timing: &ScriptTiming) -> Script {
    let lines = [
        "Partitioning station storage ........ done".to_string(),
        "Unpacking base system ............... done".to_string(),
        "Installing facility applications .... done".to_string(),
        "Calibrating depth sensors ........... done".to_string(),
        format!("Registering administrator '{username}' (clearance 5)"),
        "Writing boot record ................. done".to_string(),
        "Installation complete.".to_string(),
    ];
    Script::from_lines(
        lines,
        LineTiming::Constant(timing.install_line_ms),
        timing.completion_delay_ms,
    )
}
