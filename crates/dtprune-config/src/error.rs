use thiserror::Error;

/// Result type local to dtprune-config.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] dtprune_core::Error),

    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported config format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("environment variable {var}={value:?} is not a valid {expected}")]
    Env {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Error {
    /// The underlying missing-parameter error, if that is what this is.
    pub fn missing_parameter(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Error::Core(dtprune_core::Error::MissingParameter { criterion, field }) => {
                Some((*criterion, *field))
            }
            _ => None,
        }
    }
}
