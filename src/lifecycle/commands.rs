//! External command execution.
//!
//! # Responsibilities
//! - Run the configured check/start/reload commands
//! - Report every outcome as a value, never as a panic or error
//!
//! # Design Decisions
//! - Commands run through `sh -c` so operators can use pipes and `&&`
//! - Calls block until the command exits; there is no internal timeout
//! - Spawn failures become unsuccessful outcomes carrying the OS error

use std::process::Command;

/// Result of running one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the command exited with status 0.
    pub success: bool,
    /// Trimmed stdout, followed by trimmed stderr when present.
    pub output: String,
}

impl CommandOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Executes external commands on behalf of the generator.
pub trait CommandRunner {
    fn run(&self, command: &str) -> CommandOutcome;
}

/// Runs commands through the system shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> CommandOutcome {
        tracing::debug!(command = %command, "Running external command");

        match Command::new("sh").arg("-c").arg(command).output() {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                let text = match (stdout.trim(), stderr.trim()) {
                    (out, "") => out.to_string(),
                    ("", err) => err.to_string(),
                    (out, err) => format!("{out}\n{err}"),
                };
                CommandOutcome {
                    success: output.status.success(),
                    output: text,
                }
            }
            Err(e) => CommandOutcome::failure(format!("failed to spawn `{command}`: {e}")),
        }
    }
}
