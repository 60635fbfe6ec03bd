//! Error types for building and executing engine commands

use std::path::PathBuf;
use thiserror::Error;

/// Exit code reported when the engine did not exit on its own
/// (killed after a timeout or terminated by a signal).
pub const TERMINATED_EXIT_CODE: i32 = -1;

/// Unified error type for report command building and execution
#[derive(Error, Debug)]
pub enum Error {
    /// The input file path was empty
    #[error("invalid input file: path is empty")]
    InvalidInputFile,

    /// An output format the engine does not support was requested
    #[error("invalid output format: '{format}'")]
    InvalidFormat {
        /// The rejected format string
        format: String,
    },

    /// A database connection key outside the supported set was supplied
    #[error("invalid database connection key: '{key}'")]
    InvalidConnectionKey {
        /// The rejected key
        key: String,
    },

    /// A report parameter name the engine cannot accept
    #[error("invalid report parameter name: '{key}'")]
    InvalidParameter {
        /// The rejected parameter name
        key: String,
    },

    /// Execution was requested for a command that was never built
    #[error("no command to execute")]
    InvalidCommandExecutable,

    /// The engine's resource directory is missing
    #[error("engine resource directory not found: {}", path.display())]
    InvalidResourceDirectory {
        /// The directory that was expected to exist
        path: PathBuf,
    },

    /// The engine ran but exited with a non-zero status
    #[error("engine exited with code {exit_code}: {stderr}")]
    ExecutionError {
        /// Exit code of the engine process
        exit_code: i32,
        /// Everything the engine wrote to standard error
        stderr: String,
    },

    /// The engine process could not be started
    #[error("failed to spawn process: {reason}")]
    SpawnFailed {
        /// The reason for the spawn failure
        reason: String,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid format error
    pub fn invalid_format(format: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format: format.into(),
        }
    }

    /// Create a spawn failed error
    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            reason: reason.into(),
        }
    }

    /// Create an execution error
    pub fn execution(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ExecutionError {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Returns true if this error was raised before any process was spawned
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidInputFile
                | Error::InvalidFormat { .. }
                | Error::InvalidConnectionKey { .. }
                | Error::InvalidParameter { .. }
                | Error::InvalidCommandExecutable
                | Error::InvalidResourceDirectory { .. }
        )
    }

    /// Exit code of the engine, if the engine ran and failed
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::ExecutionError { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_display() {
        let err = Error::execution(2, "boom");
        assert_eq!(err.to_string(), "engine exited with code 2: boom");
        assert_eq!(err.exit_code(), Some(2));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_errors() {
        assert!(Error::InvalidInputFile.is_validation());
        assert!(Error::invalid_format("gif").is_validation());
        assert!(Error::InvalidCommandExecutable.is_validation());
        assert!(
            Error::InvalidParameter {
                key: "a;b".to_string()
            }
            .is_validation()
        );
        assert!(
            Error::InvalidResourceDirectory {
                path: PathBuf::from("/nope")
            }
            .is_validation()
        );
        assert!(!Error::spawn_failed("no such file").is_validation());
        assert_eq!(Error::InvalidInputFile.exit_code(), None);
    }
}
