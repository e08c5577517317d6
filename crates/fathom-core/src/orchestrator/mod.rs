//! The session orchestrator.
//!
//! Owns the current screen, the timer queue, the persistent store and the
//! global z-order counter. Every trigger (user action, app request, fired
//! timer) goes through one method here; triggers that do not apply to the
//! current mode are logged and ignored.
//!
//! Screen-owned state lives inside the [`Screen`] variant that needs it: the
//! window manager and overlays only exist inside a session, a crash context
//! only inside the crash screen. Leaving a screen drops that state and
//! cancels every timer it scheduled, so a script started under one screen can
//! never complete into another.

use std::mem;

use fathom_store::keys;
use fathom_store::{AdminCredential, PersistentStore, StoreExt};
use fathom_types::config::FathomConfig;
use fathom_types::error::{FathomError, Result};
use fathom_types::input::{InputEvent, KeyChord};
use fathom_wm::{AppRef, Window, WmEvent, ZOrderCounter, find_app};

use crate::commands::{CommandAction, CommandBus, CommandContext};
use crate::incident::{CrashContext, CrashKind, CrashPayload, LockdownContext, RecoveryPolicy};
use crate::mode::Mode;
use crate::recovery::RecoveryConsole;
use crate::requests::AppRequest;
use crate::rng::{RandomSource, StdRandom};
use crate::script::{ScriptProgress, TimedScriptPlayer, builtin};
use crate::session::{Overlay, Session};
use crate::timer::{Epoch, FiredTimer, TimerEvent, TimerId, TimerQueue};

/// Greeting used when no credential is on record.
const FALLBACK_USER: &str = "operator";

/// The active screen and the state only it owns.
#[derive(Debug)]
enum Screen {
    NeedsAdminSetup,
    Installing(TimedScriptPlayer),
    Booting(TimedScriptPlayer),
    LoggedOut,
    Session(Session),
    ShuttingDown {
        player: TimedScriptPlayer,
        halted: bool,
    },
    Rebooting(TimedScriptPlayer),
    BlackScreenPause,
    Crashed(CrashContext),
    Lockdown {
        context: LockdownContext,
        /// The interrupted session, resumed intact on release.
        suspended: Session,
    },
    RecoveryMode(RecoveryConsole),
}

impl Screen {
    fn mode(&self) -> Mode {
        match self {
            Screen::NeedsAdminSetup => Mode::NeedsAdminSetup,
            Screen::Installing(_) => Mode::Installing,
            Screen::Booting(_) => Mode::Booting,
            Screen::LoggedOut => Mode::LoggedOut,
            Screen::Session(_) => Mode::Session,
            Screen::ShuttingDown { .. } => Mode::ShuttingDown,
            Screen::Rebooting(_) => Mode::Rebooting,
            Screen::BlackScreenPause => Mode::BlackScreenPause,
            Screen::Crashed(_) => Mode::Crashed,
            Screen::Lockdown { .. } => Mode::Lockdown,
            Screen::RecoveryMode(_) => Mode::RecoveryMode,
        }
    }

    fn player(&self) -> Option<&TimedScriptPlayer> {
        match self {
            Screen::Installing(p)
            | Screen::Booting(p)
            | Screen::Rebooting(p)
            | Screen::ShuttingDown { player: p, .. } => Some(p),
            _ => None,
        }
    }

    fn player_mut(&mut self) -> Option<&mut TimedScriptPlayer> {
        match self {
            Screen::Installing(p)
            | Screen::Booting(p)
            | Screen::Rebooting(p)
            | Screen::ShuttingDown { player: p, .. } => Some(p),
            _ => None,
        }
    }
}

/// Top-level state machine of the facility terminal.
pub struct SessionOrchestrator {
    config: FathomConfig,
    store: Box<dyn PersistentStore>,
    rng: Box<dyn RandomSource>,
    bus: CommandBus,
    policy: RecoveryPolicy,
    timers: TimerQueue,
    z_counter: ZOrderCounter,
    screen: Screen,
    epoch: Epoch,
    needs_recovery: bool,
}

impl SessionOrchestrator {
    /// Build an orchestrator and power it on.
    ///
    /// Starts in `NeedsAdminSetup` when the store holds no administrator
    /// credential, otherwise in `Booting`.
    pub fn new(
        config: FathomConfig,
        store: Box<dyn PersistentStore>,
        rng: Box<dyn RandomSource>,
        bus: CommandBus,
    ) -> Self {
        let policy = RecoveryPolicy::new(config.recovery_probability);
        let mut orch = Self {
            config,
            store,
            rng,
            bus,
            policy,
            timers: TimerQueue::new(),
            z_counter: ZOrderCounter::new(),
            screen: Screen::NeedsAdminSetup,
            epoch: 0,
            needs_recovery: false,
        };
        orch.power_on();
        orch
    }

    /// Build with the OS (or configured) RNG and the built-in commands.
    pub fn from_config(config: FathomConfig, store: Box<dyn PersistentStore>) -> Self {
        let rng = StdRandom::from_seed_option(config.rng_seed);
        Self::new(config, store, Box::new(rng), CommandBus::with_builtins())
    }

    // -- queries ----------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.screen.mode()
    }

    /// The live session, if one is showing.
    pub fn session(&self) -> Option<&Session> {
        match &self.screen {
            Screen::Session(s) => Some(s),
            _ => None,
        }
    }

    /// Visible windows in z order. Empty outside a session.
    pub fn windows(&self) -> Vec<&Window> {
        self.session()
            .map(|s| s.windows().list_windows())
            .unwrap_or_default()
    }

    /// Lines shown so far by the active script. Empty on unscripted screens.
    pub fn script_log(&self) -> &[String] {
        self.screen
            .player()
            .map(TimedScriptPlayer::log)
            .unwrap_or_default()
    }

    /// Fraction of the active script shown, for progress bars.
    pub fn script_progress(&self) -> Option<f32> {
        self.screen.player().map(TimedScriptPlayer::progress)
    }

    pub fn crash_context(&self) -> Option<&CrashContext> {
        match &self.screen {
            Screen::Crashed(c) => Some(c),
            _ => None,
        }
    }

    pub fn lockdown_context(&self) -> Option<&LockdownContext> {
        match &self.screen {
            Screen::Lockdown { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn recovery_console(&self) -> Option<&RecoveryConsole> {
        match &self.screen {
            Screen::RecoveryMode(c) => Some(c),
            _ => None,
        }
    }

    /// Outcome of the recovery roll of the current crash.
    pub fn needs_recovery(&self) -> bool {
        self.needs_recovery
    }

    /// Whether the shutdown script has finished and the terminal is dark.
    pub fn is_halted(&self) -> bool {
        matches!(self.screen, Screen::ShuttingDown { halted: true, .. })
    }

    pub fn store(&self) -> &dyn PersistentStore {
        self.store.as_ref()
    }

    /// Mutable store access for apps persisting their own state.
    pub fn store_mut(&mut self) -> &mut dyn PersistentStore {
        self.store.as_mut()
    }

    pub fn config(&self) -> &FathomConfig {
        &self.config
    }

    pub fn command_bus(&self) -> &CommandBus {
        &self.bus
    }

    pub fn admin_credential(&self) -> Option<AdminCredential> {
        AdminCredential::load(self.store.as_ref())
    }

    /// Current virtual time.
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    // -- install / boot ---------------------------------------------------

    /// Persist the first administrator and play the install script.
    pub fn complete_admin_setup(&mut self, credential: AdminCredential) -> Result<()> {
        if self.mode() != Mode::NeedsAdminSetup {
            self.ignore("complete_admin_setup");
            return Ok(());
        }
        if credential.username.trim().is_empty() {
            return Err(FathomError::Store(
                "administrator username must not be empty".to_string(),
            ));
        }
        credential.save(self.store.as_mut())?;
        log::info!("Administrator '{}' registered", credential.username);
        let player = TimedScriptPlayer::new(builtin::install(
            &credential.username,
            &self.config.script,
        ));
        self.transition(move |_| Screen::Installing(player));
        Ok(())
    }

    /// Boot script finished: show the login screen.
    pub fn boot_complete(&mut self) {
        if self.mode() != Mode::Booting {
            self.ignore("boot_complete");
            return;
        }
        self.transition(|_| Screen::LoggedOut);
    }

    // -- login / logout ---------------------------------------------------

    /// Start a fresh session with no windows.
    ///
    /// Maintenance and admin overlays start closed. The first-run tour starts
    /// open until [`complete_tour`](Self::complete_tour) has been recorded.
    pub fn login(&mut self) {
        if self.mode() != Mode::LoggedOut {
            self.ignore("login");
            return;
        }
        let user = self
            .admin_credential()
            .map(|c| c.greeting_name().to_string())
            .unwrap_or_else(|| FALLBACK_USER.to_string());
        let show_tour = !self.store.get(keys::TOUR_COMPLETED, false);
        let session = Session::new(user, self.z_counter.share(), show_tour);
        self.transition(move |_| Screen::Session(session));
    }

    /// End the session. All windows and overlays are discarded.
    pub fn logout(&mut self) {
        if self.mode() != Mode::Session {
            self.ignore("logout");
            return;
        }
        self.transition(|_| Screen::LoggedOut);
    }

    // -- reboot / shutdown ------------------------------------------------

    /// Warm reboot from a session or the login screen.
    pub fn request_reboot(&mut self) {
        if !matches!(self.mode(), Mode::Session | Mode::LoggedOut) {
            self.ignore("request_reboot");
            return;
        }
        let player = TimedScriptPlayer::new(builtin::reboot(&self.config.script));
        self.transition(move |_| Screen::Rebooting(player));
    }

    /// Orderly shutdown. The terminal halts when the script finishes.
    pub fn request_shutdown(&mut self) {
        if self.mode() != Mode::Session {
            self.ignore("request_shutdown");
            return;
        }
        let player = TimedScriptPlayer::new(builtin::shutdown(&self.config.script));
        self.transition(move |_| Screen::ShuttingDown {
            player,
            halted: false,
        });
    }

    /// Power back on after a completed shutdown.
    pub fn relaunch(&mut self) {
        if !self.is_halted() {
            self.ignore("relaunch");
            return;
        }
        self.power_on();
    }

    // -- crash / recovery -------------------------------------------------

    /// A leaf app killed something critical.
    ///
    /// Ignored before an administrator exists, while shutting down, while
    /// already crashed, in lockdown and in recovery. A second report while crashed does not re-roll recovery.
    pub fn report_critical_failure(
        &mut self,
        process_name: &str,
        kind: CrashKind,
        custom_payload: Option<CrashPayload>,
    ) {
        let mode = self.mode();
        if !mode.accepts_crash() {
            log::warn!("Critical failure in {process_name} ({kind}) ignored in mode {mode}");
            return;
        }
        self.needs_recovery = self.policy.requires_recovery(kind, self.rng.as_mut());
        log::error!(
            "Critical failure in {process_name}: {kind} (recovery required: {})",
            self.needs_recovery
        );
        let context = CrashContext {
            process_name: process_name.to_string(),
            kind,
            custom_payload,
        };
        self.transition(move |_| Screen::Crashed(context));
    }

    /// Leave the crash screen: recovery console if the roll demanded it,
    /// otherwise straight to login.
    pub fn acknowledge_crash_and_reboot(&mut self) {
        if self.mode() != Mode::Crashed {
            self.ignore("acknowledge_crash_and_reboot");
            return;
        }
        if self.needs_recovery {
            self.transition(|_| Screen::RecoveryMode(RecoveryConsole::new()));
        } else {
            self.return_to_login();
        }
    }

    /// Leave recovery mode for the login screen.
    pub fn exit_recovery_mode(&mut self) {
        if self.mode() != Mode::RecoveryMode {
            self.ignore("exit_recovery_mode");
            return;
        }
        self.needs_recovery = false;
        self.return_to_login();
    }

    /// Login screen, or first-run setup when no administrator is on record.
    fn return_to_login(&mut self) {
        if self.admin_credential().is_none() {
            log::warn!("No administrator on record, restarting setup");
            self.power_on();
        } else {
            self.transition(|_| Screen::LoggedOut);
        }
    }

    /// Run one line on the recovery console. Returns its output.
    pub fn recovery_command(&mut self, line: &str) -> Vec<String> {
        let Screen::RecoveryMode(console) = &mut self.screen else {
            self.ignore("recovery_command");
            return Vec::new();
        };
        let outcome = console.execute(line);
        if outcome.exit {
            self.exit_recovery_mode();
        }
        outcome.output
    }

    // -- lockdown ---------------------------------------------------------

    /// Lock the terminal. The session is suspended, not discarded.
    pub fn trigger_lockdown(&mut self, protocol_name: &str) {
        if self.mode() != Mode::Session {
            self.ignore("trigger_lockdown");
            return;
        }
        log::warn!("Lockdown protocol {protocol_name} engaged");
        let context = LockdownContext::new(protocol_name);
        self.transition(move |old| match old {
            Screen::Session(suspended) => Screen::Lockdown { context, suspended },
            other => other,
        });
    }

    /// Check an override password against the stored administrator.
    ///
    /// On success the session resumes after `lockdown_release_ms`. On failure
    /// the lockdown stays and the attempt is counted.
    pub fn authorize_lockdown(&mut self, supplied: &str) -> Result<()> {
        let credential = self.admin_credential();
        let Screen::Lockdown { context, .. } = &mut self.screen else {
            self.ignore("authorize_lockdown");
            return Ok(());
        };
        if context.releasing {
            return Ok(());
        }
        let Some(credential) = credential else {
            context.failed_attempts += 1;
            return Err(FathomError::Authorization(
                "no administrator credential on record".to_string(),
            ));
        };
        if !credential.verify(supplied) {
            context.failed_attempts += 1;
            log::warn!(
                "Rejected override for {} (attempt {})",
                context.protocol_name,
                context.failed_attempts
            );
            return Err(FathomError::Authorization(
                "invalid override code".to_string(),
            ));
        }
        context.releasing = true;
        log::info!("Lockdown {} authorized, releasing", context.protocol_name);

        let delay = self.config.lockdown_release_ms;
        if delay == 0 {
            self.release_lockdown();
        } else {
            self.timers
                .schedule(self.epoch, delay, TimerEvent::LockdownRelease);
        }
        Ok(())
    }

    fn release_lockdown(&mut self) {
        if !matches!(&self.screen, Screen::Lockdown { context, .. } if context.releasing) {
            return;
        }
        self.transition(|old| match old {
            Screen::Lockdown { suspended, .. } => Screen::Session(suspended),
            other => other,
        });
    }

    // -- overlays / hidden commands ---------------------------------------

    /// Set one overlay flag. Returns false (and changes nothing) outside a
    /// session.
    pub fn set_overlay(&mut self, overlay: Overlay, open: bool) -> bool {
        let Screen::Session(session) = &mut self.screen else {
            self.ignore("set_overlay");
            return false;
        };
        session.set_overlay(overlay, open);
        log::debug!("Overlay {overlay} -> {open}");
        true
    }

    /// Close the first-run tour and remember that it was seen.
    pub fn complete_tour(&mut self) -> Result<()> {
        if !self.set_overlay(Overlay::FirstRunTour, false) {
            return Ok(());
        }
        self.store.set(keys::TOUR_COMPLETED, &true)
    }

    /// Run a hidden console command and apply its actions.
    pub fn invoke_hidden_command(&mut self, name: &str, arg: Option<&str>) -> Result<()> {
        let ctx = CommandContext {
            admin_secret: &self.config.admin_panel_secret,
        };
        let actions = self.bus.dispatch(name, arg, &ctx)?;
        log::info!("Hidden command {name}");
        for action in actions {
            match action {
                CommandAction::SetOverlay(overlay, open) => {
                    self.set_overlay(overlay, open);
                },
            }
        }
        Ok(())
    }

    // -- input / app requests ---------------------------------------------

    /// Global key handling. Returns whether the event was consumed.
    ///
    /// Ctrl+Alt+Delete reboots only from a session with no overlay open;
    /// everything else is left to the focused app.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::KeyPress(chord) if *chord == KeyChord::REBOOT => {
                let blocked = self.session().is_none_or(|s| s.overlays().any_open());
                if blocked {
                    return false;
                }
                self.request_reboot();
                true
            },
            _ => false,
        }
    }

    /// Apply a request raised by a leaf app.
    pub fn handle_app_request(&mut self, request: AppRequest) {
        match request {
            AppRequest::CriticalKill {
                process,
                kind,
                payload,
            } => self.report_critical_failure(&process, kind, payload),
            AppRequest::OpenAdminPanel => {
                self.set_overlay(Overlay::AdminPanel, true);
            },
            AppRequest::Lockdown { protocol } => self.trigger_lockdown(&protocol),
        }
    }

    // -- windows ----------------------------------------------------------

    pub fn open_window(&mut self, app: &AppRef) -> WmEvent {
        match &mut self.screen {
            Screen::Session(s) => s.windows_mut().open_window(app),
            _ => {
                self.ignore("open_window");
                WmEvent::None
            },
        }
    }

    /// Open a catalog app by id.
    pub fn open_app(&mut self, app_id: &str) -> WmEvent {
        match find_app(app_id) {
            Some(app) => self.open_window(&app),
            None => {
                log::warn!("Unknown app: {app_id}");
                WmEvent::None
            },
        }
    }

    pub fn focus_window(&mut self, id: &str) -> WmEvent {
        match &mut self.screen {
            Screen::Session(s) => s.windows_mut().focus_window(id),
            _ => WmEvent::None,
        }
    }

    pub fn close_window(&mut self, id: &str) -> WmEvent {
        match &mut self.screen {
            Screen::Session(s) => s.windows_mut().close_window(id),
            _ => WmEvent::None,
        }
    }

    // -- time -------------------------------------------------------------

    /// Advance the virtual clock by `dt_ms`, firing everything that comes due.
    pub fn tick(&mut self, dt_ms: u64) {
        let target = self.timers.now_ms().saturating_add(dt_ms);
        while let Some(fired) = self.timers.pop_due(target) {
            self.on_timer(fired);
        }
        self.timers.advance_to(target);
    }

    /// Fire timers until none are pending or the next one lies more than
    /// `max_ms` ahead. Returns the virtual time that passed.
    pub fn run_until_idle(&mut self, max_ms: u64) -> u64 {
        let start = self.timers.now_ms();
        let limit = start.saturating_add(max_ms);
        while let Some(due) = self.timers.next_due_ms() {
            if due > limit {
                break;
            }
            let now = self.timers.now_ms();
            self.tick(due.saturating_sub(now));
        }
        self.timers.now_ms() - start
    }

    // -- internals --------------------------------------------------------

    /// Enter the first screen after power-on or relaunch.
    fn power_on(&mut self) {
        self.needs_recovery = false;
        if self.admin_credential().is_some() {
            let player = TimedScriptPlayer::new(builtin::boot(
                &self.config.facility_name,
                &self.config.script,
            ));
            self.transition(move |_| Screen::Booting(player));
        } else {
            self.transition(|_| Screen::NeedsAdminSetup);
        }
    }

    /// Replace the current screen. Cancels everything the old screen
    /// scheduled before the new one starts.
    fn transition(&mut self, next: impl FnOnce(Screen) -> Screen) {
        let from = self.mode();
        if let Some(player) = self.screen.player_mut() {
            player.cancel(&mut self.timers);
        }
        self.timers.cancel_epoch(self.epoch);
        self.epoch += 1;

        let old = mem::replace(&mut self.screen, Screen::LoggedOut);
        self.screen = next(old);
        log::info!("Mode {from} -> {}", self.mode());
        self.start_screen();
    }

    fn start_screen(&mut self) {
        let epoch = self.epoch;
        match &mut self.screen {
            Screen::Installing(p)
            | Screen::Booting(p)
            | Screen::Rebooting(p)
            | Screen::ShuttingDown { player: p, .. } => {
                if let Err(e) = p.start(epoch, &mut self.timers, self.rng.as_mut()) {
                    log::warn!("Script did not start: {e}");
                }
            },
            Screen::BlackScreenPause => {
                self.timers.schedule(
                    epoch,
                    self.config.black_screen_ms,
                    TimerEvent::BlackScreenElapsed,
                );
            },
            _ => {},
        }
    }

    fn on_timer(&mut self, fired: FiredTimer) {
        if fired.epoch != self.epoch {
            log::debug!("Dropping stale timer {} of epoch {}", fired.id, fired.epoch);
            return;
        }
        match fired.event {
            TimerEvent::ScriptStep => self.on_script_step(fired.id),
            TimerEvent::BlackScreenElapsed => {
                if self.mode() == Mode::BlackScreenPause {
                    self.power_on();
                }
            },
            TimerEvent::LockdownRelease => self.release_lockdown(),
        }
    }

    fn on_script_step(&mut self, id: TimerId) {
        let Some(player) = self.screen.player_mut() else {
            return;
        };
        let progress = player.on_timer(id, &mut self.timers, self.rng.as_mut());
        if progress != ScriptProgress::Completed {
            return;
        }
        match self.mode() {
            Mode::Installing => self.power_on(),
            Mode::Booting => self.boot_complete(),
            Mode::Rebooting => self.transition(|_| Screen::BlackScreenPause),
            Mode::ShuttingDown => {
                if let Screen::ShuttingDown { halted, .. } = &mut self.screen {
                    *halted = true;
                }
                log::info!("{} halted", self.config.facility_name);
            },
            _ => {},
        }
    }

    fn ignore(&self, trigger: &str) {
        log::warn!("{trigger} ignored in mode {}", self.mode());
    }
}
