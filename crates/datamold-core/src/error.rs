use thiserror::Error;

/// Core error type shared across Datamold crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A node is neither a typed leaf nor a group.
    #[error("malformed schema: {0}")]
    MalformedSchema(String),
    /// Schema text could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by Datamold crates.
pub type Result<T> = std::result::Result<T, Error>;
