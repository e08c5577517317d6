//! Restricted console shown in recovery mode.

/// Maximum transcript lines kept for rendering.
const MAX_TRANSCRIPT: usize = 200;

/// Outcome of one console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOutcome {
    pub output: Vec<String>,
    /// The operator asked to leave recovery mode.
    pub exit: bool,
}

/// Command console for the recovery screen.
#[derive(Debug, Clone, Default)]
pub struct RecoveryConsole {
    diagnosed: bool,
    repaired: bool,
    transcript: Vec<String>,
}

impl RecoveryConsole {
    pub fn new() -> Self {
        let mut console = Self::default();
        console.transcript.extend([
            "FATHOM_OS RECOVERY CONSOLE".to_string(),
            "The system was halted by a critical incident.".to_string(),
            "Type 'help' for available commands.".to_string(),
        ]);
        console
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn is_repaired(&self) -> bool {
        self.repaired
    }

    /// Run one console line.
    pub fn execute(&mut self, line: &str) -> RecoveryOutcome {
        let cmd = line.trim().to_ascii_lowercase();
        let mut exit = false;
        let output: Vec<String> = match cmd.as_str() {
            "" => Vec::new(),
            "help" => vec![
                "help      show this list".to_string(),
                "status    show repair status".to_string(),
                "diagnose  scan station volumes".to_string(),
                "repair    repair damaged volumes".to_string(),
                "exit      leave recovery and return to login".to_string(),
            ],
            "status" => vec![format!(
                "diagnosed: {}  repaired: {}",
                yes_no(self.diagnosed),
                yes_no(self.repaired)
            )],
            "diagnose" => {
                self.diagnosed = true;
                vec![
                    "Scanning /station ........ 3 damaged inodes".to_string(),
                    "Scanning /research ....... clean".to_string(),
                    "Scanning /ballast ........ 1 orphaned journal entry".to_string(),
                ]
            },
            "repair" if !self.diagnosed => {
                vec!["repair: nothing scheduled, run 'diagnose' first".to_string()]
            },
            "repair" => {
                self.repaired = true;
                vec![
                    "Replaying journal ........ done".to_string(),
                    "Rebuilding inode tables .. done".to_string(),
                    "All volumes consistent.".to_string(),
                ]
            },
            "exit" | "reboot" => {
                exit = true;
                if self.repaired {
                    vec!["Leaving recovery mode.".to_string()]
                } else {
                    vec!["WARNING: leaving recovery with unrepaired volumes.".to_string()]
                }
            },
            other => vec![format!("{other}: command not available in recovery mode")],
        };

        self.transcript.push(format!("recovery# {}", line.trim()));
        self.transcript.extend(output.iter().cloned());
        if self.transcript.len() > MAX_TRANSCRIPT {
            let excess = self.transcript.len() - MAX_TRANSCRIPT;
            self.transcript.drain(..excess);
        }
        RecoveryOutcome { output, exit }
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}
