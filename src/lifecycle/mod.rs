//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Commands (commands.rs):
//!     check / start / reload command string → sh -c → CommandOutcome
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C → broadcast → control loop exits
//! ```
//!
//! # Design Decisions
//! - External process failures are values, the control loop decides what to log
//! - The proxy process itself is not supervised, only started and reloaded

pub mod commands;
pub mod shutdown;

pub use commands::{CommandOutcome, CommandRunner, ShellRunner};
pub use shutdown::Shutdown;
