//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! restart request (accepted write)
//!     → restart.rs (virtual clock admission check)
//!     → backoff.rs (next admission = interval + jitter)
//!     → start (once) + reload command
//!     → deferred requests retried on a later tick
//! ```
//!
//! # Design Decisions
//! - Time is a tick counter, not wall-clock time
//! - Jittered spacing desynchronizes reloads across instances
//! - Failed reloads are not retried until the next admitted restart

pub mod backoff;
pub mod restart;

pub use restart::{RestartLimiter, RestartOutcome, RestartState};
