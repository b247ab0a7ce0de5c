#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Too many invalid attempts. Try again later")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage capacity exceeded: {used} of {max} bytes in use")]
    QuotaExceeded { used: u64, max: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
