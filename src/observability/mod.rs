//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (service, revision, command, path)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stdout)
//! ```

pub mod logging;
