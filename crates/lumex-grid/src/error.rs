//! Error types for the grid engine.

use std::path::PathBuf;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur while configuring or driving a grid.
///
/// Cell-level validation never produces an error; rejected values are
/// recorded as invalid cells instead. A load superseded by a newer one is
/// not an error either.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Mutually exclusive or out-of-range options.
    #[error("Invalid grid configuration ({parameters}): {message}")]
    Configuration { parameters: String, message: String },

    /// The external data provider failed a request.
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Reading the clipboard failed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Options file could not be parsed.
    #[error("Invalid grid options: {0}")]
    Config(#[from] toml::de::Error),

    /// Options file could not be read.
    #[error("Failed to read grid options '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GridError {
    /// Create a configuration error.
    pub fn configuration(parameters: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            parameters: parameters.into(),
            message: message.into(),
        }
    }

    /// Create a data source error.
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource(message.into())
    }

    /// Create a clipboard error.
    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard(message.into())
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GridError::configuration("items, provider", "only one data source may be bound");
        assert_eq!(
            err.to_string(),
            "Invalid grid configuration (items, provider): only one data source may be bound"
        );
        assert!(err.is_configuration());
        assert!(!GridError::data_source("offline").is_configuration());
    }
}
