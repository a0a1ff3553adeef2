use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for the codeweave library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// The process lacks permission to read a path.
    #[error("No permission to read '{path}'")]
    PermissionDenied {
        /// Path that could not be read
        path: PathBuf,
    },

    /// A path vanished or never existed.
    #[error("File '{path}' does not exist")]
    NotFound {
        /// Missing path
        path: PathBuf,
    },

    /// File content could not be decoded, even after encoding detection.
    #[error("Unable to decode '{path}' as {encoding}. File may be binary or use an unsupported encoding.")]
    Undecodable {
        /// Path to the file with encoding issues
        path: PathBuf,
        /// Name of the last encoding that was tried
        encoding: String,
    },

    /// Template rendering error.
    #[error("Failed to render template '{template}': {message}")]
    Template {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    ///
    /// Permission and not-found failures get their own variants so callers can
    /// tell them apart without inspecting the message.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io {
                path,
                message: source.to_string(),
            },
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a template error.
    #[must_use]
    pub fn template(template: impl Into<String>, source: &tera::Error) -> Self {
        // Tera nests the useful part of the message in its source chain.
        let mut message = source.to_string();
        let mut cause = std::error::Error::source(source);
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = std::error::Error::source(inner);
        }

        Self::Template {
            template: template.into(),
            message,
        }
    }

    /// Creates an undecodable-content error.
    #[must_use]
    pub fn undecodable(path: impl Into<PathBuf>, encoding: impl Into<String>) -> Self {
        Self::Undecodable {
            path: path.into(),
            encoding: encoding.into(),
        }
    }

    /// Returns the path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. }
            | Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Undecodable { path, .. } => Some(path),
            Self::Template { .. } | Self::Config { .. } => None,
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::PermissionDenied { .. } | Self::NotFound { .. }
        )
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this error means a single file could not be read.
    ///
    /// These are skipped by the pipeline rather than aborting the run.
    #[must_use]
    pub const fn is_unreadable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::PermissionDenied { .. }
                | Self::NotFound { .. }
                | Self::Undecodable { .. }
        )
    }
}
