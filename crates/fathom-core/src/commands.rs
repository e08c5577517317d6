//! Hidden developer-console commands.
//!
//! A small registry of zero/one-argument commands invocable outside the
//! normal UI. Commands never touch orchestrator state directly: they return
//! [`CommandAction`]s that the orchestrator applies under its own rules, so
//! an action aimed at a session overlay is still a no-op outside a session.

use std::collections::BTreeMap;

use fathom_types::error::{FathomError, Result};

use crate::session::Overlay;

/// Effect requested by a hidden command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    SetOverlay(Overlay, bool),
}

/// Read-only context handed to every command.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// Shared secret accepted by `adminPanel`.
    pub admin_secret: &'a str,
}

/// A single hidden command.
pub trait HiddenCommand {
    /// Name as typed on the console. Matched case-insensitively.
    fn name(&self) -> &str;

    /// One-line description for listings.
    fn description(&self) -> &str;

    /// Execute with an optional argument.
    fn execute(&self, arg: Option<&str>, ctx: &CommandContext<'_>) -> Result<Vec<CommandAction>>;
}

/// Registry of hidden commands with dispatch.
///
/// Owned by the orchestrator; built explicitly and passed in at
/// construction rather than living in a process-wide table.
pub struct CommandBus {
    commands: BTreeMap<String, Box<dyn HiddenCommand>>,
}

impl CommandBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// A bus with `adminPanel`, `maintenanceMode` and `normalMode`.
    pub fn with_builtins() -> Self {
        let mut bus = Self::new();
        bus.register(Box::new(AdminPanelCmd));
        bus.register(Box::new(MaintenanceModeCmd));
        bus.register(Box::new(NormalModeCmd));
        bus
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn HiddenCommand>) {
        self.commands.insert(cmd.name().to_ascii_lowercase(), cmd);
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.commands.values().map(|c| c.name()).collect()
    }

    /// (name, description) pairs for listings.
    pub fn describe(&self) -> Vec<(&str, &str)> {
        self.commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect()
    }

    /// Look up and run a command.
    pub fn dispatch(
        &self,
        name: &str,
        arg: Option<&str>,
        ctx: &CommandContext<'_>,
    ) -> Result<Vec<CommandAction>> {
        let cmd = self
            .commands
            .get(&name.trim().to_ascii_lowercase())
            .ok_or_else(|| FathomError::Command(format!("unknown command: {name}")))?;
        cmd.execute(arg, ctx)
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::with_builtins()
    }
}

// ---------------------------------------------------------------------------
// adminPanel
// ---------------------------------------------------------------------------

/// Opens the admin panel. With no argument the caller is trusted; with an
/// argument it must equal the shared secret. An easter egg, not a boundary.
struct AdminPanelCmd;
impl HiddenCommand for AdminPanelCmd {
    fn name(&self) -> &str {
        "adminPanel"
    }
    fn description(&self) -> &str {
        "Open the facility admin panel"
    }
    fn execute(&self, arg: Option<&str>, ctx: &CommandContext<'_>) -> Result<Vec<CommandAction>> {
        match arg {
            Some(code) if code != ctx.admin_secret => {
                log::warn!("adminPanel: rejected access code");
                Err(FathomError::Authorization(
                    "invalid admin access code".to_string(),
                ))
            },
            _ => Ok(vec![CommandAction::SetOverlay(Overlay::AdminPanel, true)]),
        }
    }
}

// ---------------------------------------------------------------------------
// maintenanceMode / normalMode
// ---------------------------------------------------------------------------

struct MaintenanceModeCmd;
impl HiddenCommand for MaintenanceModeCmd {
    fn name(&self) -> &str {
        "maintenanceMode"
    }
    fn description(&self) -> &str {
        "Show the maintenance banner"
    }
    fn execute(&self, _arg: Option<&str>, _ctx: &CommandContext<'_>) -> Result<Vec<CommandAction>> {
        Ok(vec![CommandAction::SetOverlay(Overlay::Maintenance, true)])
    }
}

struct NormalModeCmd;
impl HiddenCommand for NormalModeCmd {
    fn name(&self) -> &str {
        "normalMode"
    }
    fn description(&self) -> &str {
        "Leave maintenance mode"
    }
    fn execute(&self, _arg: Option<&str>, _ctx: &CommandContext<'_>) -> Result<Vec<CommandAction>> {
        Ok(vec![CommandAction::SetOverlay(Overlay::Maintenance, false)])
    }
}
