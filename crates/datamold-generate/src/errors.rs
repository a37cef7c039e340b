use thiserror::Error;

/// Errors emitted by the generation engine.
///
/// Every variant is terminal for the `generate()` call that raised it; no
/// partially generated record is returned alongside.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unknown generator type '{0}'")]
    UnknownGeneratorType(String),
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),
    #[error("invalid date expression '{0}'")]
    InvalidDateExpression(String),
    #[error("malformed schema: {0}")]
    MalformedSchema(String),
    #[error("generator '{0}' is already registered")]
    DuplicateGenerator(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<datamold_core::Error> for GenerationError {
    fn from(err: datamold_core::Error) -> Self {
        match err {
            datamold_core::Error::MalformedSchema(message) => Self::MalformedSchema(message),
            datamold_core::Error::Json(err) => Self::Json(err),
        }
    }
}
