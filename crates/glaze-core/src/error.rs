/// Core error types for Glaze.
use std::path::PathBuf;

/// A specialized Result type for Glaze operations.
pub type GlazeResult<T> = Result<T, GlazeError>;

/// Error type for the fallible edges of Glaze (config loading, host IO).
///
/// The uniform parser and the transpiler are total and never produce one.
#[derive(Debug, thiserror::Error)]
pub enum GlazeError {
    #[error("config error: {message} ({path:?})")]
    Config { message: String, path: PathBuf },

    #[error("config decode error: {0}")]
    ConfigDecode(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl GlazeError {
    /// Create a config error tied to the file it came from.
    pub fn config(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        GlazeError::Config {
            message: message.into(),
            path: path.into(),
        }
    }
}
