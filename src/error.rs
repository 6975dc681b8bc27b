use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A keyword-only operation was applied to another node kind.
    #[error("expected a keyword node, found {found}")]
    NotKeyword { found: &'static str },

    #[error("text accumulator rejected a write")]
    Fmt(#[from] std::fmt::Error),

    #[error("failed to escape string: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
