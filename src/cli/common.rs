//! Shared types for CLI command handlers.

use crate::config::Config;
use crate::keymap::Keymap;
use std::fmt;
use std::path::Path;

/// Process exit codes used by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Input was rejected (bad script, invalid keymap, bad configuration)
    ValidationFailed = 1,
    /// A file could not be read or written
    IoError = 2,
}

impl ExitCode {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code the process should terminate with
    pub code: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Rejected input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::ValidationFailed,
            message: message.into(),
        }
    }

    /// File system failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::IoError,
            message: message.into(),
        }
    }

    /// Numeric process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.code.code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Loads `file`, else the configured keymap, else the built-in one.
///
/// Unreadable files are I/O errors; files that fail to parse or validate are
/// validation errors.
pub fn load_keymap(file: Option<&Path>, config: &Config) -> CliResult<Keymap> {
    match file.or(config.keymap.path.as_deref()) {
        Some(path) => {
            let content = read_keymap_file(path)?;
            Keymap::from_json5(&content).map_err(|e| {
                CliError::validation(format!("Invalid keymap file {}: {e:#}", path.display()))
            })
        }
        None => Ok(Keymap::datahand_dvorak()),
    }
}

/// Reads a keymap file, mapping failures to I/O errors.
pub fn read_keymap_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        CliError::io(format!(
            "Failed to read keymap file {}: {e}",
            path.display()
        ))
    })
}

/// Comma-separated list, or `(none)`.
pub(crate) fn join_or_none<T: fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
