//! Change-gated configuration writes.
//!
//! # Responsibilities
//! - Compare a new document with the one on disk, ignoring the header line
//! - Replace the file atomically when they differ
//! - Validate the written file with the check command
//!
//! # Design Decisions
//! - A missing file reads as an empty document
//! - A failed check leaves the new file in place and reports "unchanged",
//!   so no reload is requested for it

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::lifecycle::CommandRunner;

/// Writes generated documents to disk and validates them.
#[derive(Debug, Clone)]
pub struct ConfigWriter {
    path: PathBuf,
    check_command: String,
}

impl ConfigWriter {
    pub fn new(path: impl Into<PathBuf>, check_command: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            check_command: check_command.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `document` if it differs from the file on disk.
    ///
    /// Returns `true` only when the file was rewritten and the check command
    /// accepted it.
    pub fn write<C: CommandRunner + ?Sized>(&self, document: &str, runner: &C) -> bool {
        let existing = self.read_existing();
        if same_ignoring_header(&existing, document) {
            tracing::debug!(path = ?self.path, "nginx config unchanged");
            return false;
        }

        if let Err(e) = persist(&self.path, document) {
            tracing::error!(path = ?self.path, error = %e, "Failed to write nginx config");
            return false;
        }
        tracing::info!(path = ?self.path, "Wrote new nginx config");

        let check = runner.run(&self.check_command);
        if !check.success {
            tracing::error!(
                command = %self.check_command,
                output = %check.output,
                "nginx configuration is invalid, not restarting nginx"
            );
            return false;
        }

        true
    }

    fn read_existing(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = ?self.path, "No existing nginx config file");
                String::new()
            }
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Could not read nginx config file");
                String::new()
            }
        }
    }
}

/// Whether two documents are byte-for-byte equal once their first lines are
/// dropped. Line endings and the final newline count as content.
pub fn same_ignoring_header(old: &str, new: &str) -> bool {
    body(old) == body(new)
}

fn body(document: &str) -> &str {
    document.split_once('\n').map_or("", |(_, rest)| rest)
}

/// Replace `path` with `document` through a temporary file in the same
/// directory, keeping the permissions of the file being replaced.
fn persist(path: &Path, document: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(document.as_bytes())?;
    file.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
