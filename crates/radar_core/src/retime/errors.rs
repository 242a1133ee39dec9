//! Error types for the retiming engine.
//!
//! Every variant aborts the unit being processed. A missing source file is
//! not an error: the driver reports it as a skipped unit instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::SceneKey;

/// Failure while retiming a unit.
#[derive(Error, Debug)]
pub enum RetimeError {
    /// An external command exited unsuccessfully.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    ExternalToolFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The trimmer executable could not be found or started.
    #[error("Tool not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    /// A tool reported success but left no output behind.
    #[error("Expected output missing: {}", .0.display())]
    OutputMissing(PathBuf),

    /// No silent clip exists for the requested bitrate.
    #[error("No silence clip for bitrate {bitrate} (looked for {})", .path.display())]
    MissingSilenceAsset { bitrate: String, path: PathBuf },

    /// An offset refers to a scene with no target chapter.
    #[error("No target chapter for scene '{0}'")]
    MissingChapter(SceneKey),

    /// Copy, move, write or delete failure.
    #[error("I/O error in {operation}: {source}")]
    Filesystem {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl RetimeError {
    /// Create an external tool failure.
    pub fn tool_failed(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::ExternalToolFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create a filesystem error with context.
    pub fn filesystem(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Filesystem {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for retiming operations.
pub type RetimeResult<T> = Result<T, RetimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failure_displays_context() {
        let err = RetimeError::tool_failed("delaycut", 3, "bad frame header");
        let msg = err.to_string();
        assert!(msg.contains("delaycut"));
        assert!(msg.contains("exit code 3"));
        assert!(msg.contains("bad frame header"));
    }

    #[test]
    fn filesystem_error_names_operation() {
        let err = RetimeError::filesystem(
            "copy source",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("copy source"));
    }

    #[test]
    fn missing_chapter_names_scene() {
        let err = RetimeError::MissingChapter(SceneKey::PartB);
        assert!(err.to_string().contains("partB"));
    }
}
