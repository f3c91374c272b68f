use thiserror::Error;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures while building a [`ServerFacade`](crate::ServerFacade).
///
/// Once built, the facade reports everything through `Response`.
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("failed to start the I/O runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
