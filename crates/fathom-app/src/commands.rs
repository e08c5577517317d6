//! Operator console command parsing and dispatch.

use fathom_core::error::{FathomError, Result};
use fathom_core::input::{InputEvent, KeyChord};
use fathom_core::store::AdminCredential;
use fathom_core::wm::{WmEvent, builtin_apps};
use fathom_core::{AppRequest, CrashKind, CrashPayload, Mode, Overlay, SessionOrchestrator};

/// Longest single `wait` the console will run.
const MAX_WAIT_MS: u64 = 60 * 60 * 1000;

/// One line typed at the operator console.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Help,
    Status,
    Setup { username: String, password: String },
    Login,
    Logout,
    Apps,
    Windows,
    Open(String),
    Focus(String),
    Close(String),
    Reboot,
    Shutdown,
    Relaunch,
    Crash {
        process: String,
        kind: CrashKind,
        payload: Option<CrashPayload>,
    },
    Ack,
    Lockdown(String),
    Auth(String),
    Overlay(Overlay, bool),
    Tour,
    Hidden { name: String, arg: Option<String> },
    Key(KeyChord),
    Tick(u64),
    Wait,
    Quit,
}

/// Parse one console line. Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    // `!name [arg]` invokes a hidden command.
    if let Some(rest) = line.strip_prefix('!') {
        let mut parts = rest.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| FathomError::Command("missing hidden command name".to_string()))?;
        return Ok(Some(ConsoleCommand::Hidden {
            name: name.to_string(),
            arg: parts.next().map(str::to_string),
        }));
    }

    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let cmd = match head.to_ascii_lowercase().as_str() {
        "help" | "?" => ConsoleCommand::Help,
        "status" => ConsoleCommand::Status,
        "setup" => match args.as_slice() {
            [username, password] => ConsoleCommand::Setup {
                username: username.to_string(),
                password: password.to_string(),
            },
            _ => return Err(usage("setup <username> <password>")),
        },
        "login" => ConsoleCommand::Login,
        "logout" => ConsoleCommand::Logout,
        "apps" => ConsoleCommand::Apps,
        "ls" | "windows" => ConsoleCommand::Windows,
        "open" => ConsoleCommand::Open(single(&args, "open <app>")?),
        "focus" => ConsoleCommand::Focus(single(&args, "focus <app>")?),
        "close" => ConsoleCommand::Close(single(&args, "close <app>")?),
        "reboot" => ConsoleCommand::Reboot,
        "shutdown" => ConsoleCommand::Shutdown,
        "relaunch" | "power" => ConsoleCommand::Relaunch,
        "crash" => parse_crash(rest)?,
        "ack" => ConsoleCommand::Ack,
        "lockdown" => ConsoleCommand::Lockdown(if rest.is_empty() {
            "OMEGA".to_string()
        } else {
            rest.to_string()
        }),
        "auth" => ConsoleCommand::Auth(single(&args, "auth <password>")?),
        "overlay" => match args.as_slice() {
            [name, state] => ConsoleCommand::Overlay(name.parse()?, parse_switch(state)?),
            _ => return Err(usage("overlay <name> on|off")),
        },
        "tour" => ConsoleCommand::Tour,
        "key" => {
            let chord = KeyChord::parse(rest)
                .ok_or_else(|| FathomError::Command(format!("unknown key chord: {rest}")))?;
            ConsoleCommand::Key(chord)
        },
        "tick" => {
            let ms = single(&args, "tick <ms>")?
                .parse::<u64>()
                .map_err(|_| usage("tick <ms>"))?;
            ConsoleCommand::Tick(ms)
        },
        "wait" => ConsoleCommand::Wait,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(FathomError::Command(format!("unknown command: {other}"))),
    };
    Ok(Some(cmd))
}

/// `crash <process> <kind> [title | message]`
fn parse_crash(rest: &str) -> Result<ConsoleCommand> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let (Some(process), Some(kind)) = (parts.next(), parts.next()) else {
        return Err(usage("crash <process> <kind> [title | message]"));
    };
    let payload = parts
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|text| {
            let (title, message) = text.split_once('|').unwrap_or((text, ""));
            CrashPayload {
                title: title.trim().to_string(),
                message: message.trim().to_string(),
            }
        });
    Ok(ConsoleCommand::Crash {
        process: process.to_string(),
        kind: kind.parse()?,
        payload,
    })
}

fn single(args: &[&str], usage_text: &str) -> Result<String> {
    match args {
        [one] => Ok(one.to_string()),
        _ => Err(usage(usage_text)),
    }
}

fn parse_switch(s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "open" | "true" | "1" => Ok(true),
        "off" | "close" | "false" | "0" => Ok(false),
        _ => Err(usage("expected on|off")),
    }
}

fn usage(text: &str) -> FathomError {
    FathomError::Command(format!("usage: {text}"))
}

/// Apply a parsed command. Returns the lines to print.
pub fn apply(cmd: ConsoleCommand, orch: &mut SessionOrchestrator) -> Vec<String> {
    let mut out = Vec::new();
    match cmd {
        ConsoleCommand::Help => {
            out.extend(HELP.iter().map(|l| l.to_string()));
            out.extend(
                orch.command_bus()
                    .describe()
                    .into_iter()
                    .map(|(name, about)| format!("  !{name:<24}{about}")),
            );
        },
        ConsoleCommand::Status => {},
        ConsoleCommand::Setup { username, password } => {
            if let Err(e) = orch.complete_admin_setup(AdminCredential::new(username, password)) {
                out.push(format!("error: {e}"));
            }
        },
        ConsoleCommand::Login => orch.login(),
        ConsoleCommand::Logout => orch.logout(),
        ConsoleCommand::Apps => {
            for app in builtin_apps() {
                out.push(format!("{} {:<14} {}", app.glyph, app.id, app.title));
            }
        },
        ConsoleCommand::Windows => {
            if orch.mode() != Mode::Session {
                out.push("no session".to_string());
            }
            for w in orch.windows() {
                out.push(format!("z={:<4} {:<14} {}", w.z_index, w.id, w.app.title));
            }
        },
        ConsoleCommand::Open(id) => out.extend(describe(orch.open_app(&id))),
        ConsoleCommand::Focus(id) => out.extend(describe(orch.focus_window(&id))),
        ConsoleCommand::Close(id) => out.extend(describe(orch.close_window(&id))),
        ConsoleCommand::Reboot => orch.request_reboot(),
        ConsoleCommand::Shutdown => orch.request_shutdown(),
        ConsoleCommand::Relaunch => orch.relaunch(),
        ConsoleCommand::Crash {
            process,
            kind,
            payload,
        } => orch.handle_app_request(AppRequest::CriticalKill {
            process,
            kind,
            payload,
        }),
        ConsoleCommand::Ack => orch.acknowledge_crash_and_reboot(),
        ConsoleCommand::Lockdown(protocol) => orch.handle_app_request(AppRequest::lockdown(protocol)),
        ConsoleCommand::Auth(password) => {
            if let Err(e) = orch.authorize_lockdown(&password) {
                out.push(format!("ACCESS DENIED: {e}"));
            }
        },
        ConsoleCommand::Overlay(overlay, open) => {
            if !orch.set_overlay(overlay, open) {
                out.push("overlays need an active session".to_string());
            }
        },
        ConsoleCommand::Tour => {
            if let Err(e) = orch.complete_tour() {
                out.push(format!("error: {e}"));
            }
        },
        ConsoleCommand::Hidden { name, arg } => {
            if let Err(e) = orch.invoke_hidden_command(&name, arg.as_deref()) {
                out.push(format!("error: {e}"));
            }
        },
        ConsoleCommand::Key(chord) => {
            if !orch.handle_input(&InputEvent::KeyPress(chord)) {
                log::debug!("Key {chord:?} not handled");
            }
        },
        ConsoleCommand::Tick(ms) => orch.tick(ms),
        ConsoleCommand::Wait => {
            let elapsed = orch.run_until_idle(MAX_WAIT_MS);
            out.push(format!("({elapsed} ms)"));
        },
        ConsoleCommand::Quit => {},
    }
    out
}

fn describe(event: WmEvent) -> Option<String> {
    match event {
        WmEvent::WindowOpened(id) => Some(format!("opened {id}")),
        WmEvent::WindowFocused(id) => Some(format!("focused {id}")),
        WmEvent::WindowClosed(id) => Some(format!("closed {id}")),
        WmEvent::None => None,
    }
}

const HELP: &[&str] = &[
    "setup <user> <pass>        create the administrator (first run)",
    "login | logout             enter or leave the desktop",
    "apps | ls                  list installed apps | open windows",
    "open|focus|close <app>     window management",
    "reboot | shutdown          power controls",
    "relaunch                   power on after shutdown",
    "crash <proc> <kind> [t|m]  simulate a critical failure",
    "ack                        acknowledge the crash screen",
    "lockdown [protocol]        engage a lockdown",
    "auth <password>            authorize a lockdown override",
    "overlay <name> on|off      toggle a session overlay",
    "tour                       dismiss the first-run tour",
    "!<command> [arg]           hidden console command",
    "key <chord>                send a key chord (ctrl+alt+delete)",
    "tick <ms> | wait           advance the clock",
    "status | quit",
];
