//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Record rejected at ingestion (negative amount, missing key).
    /// The rest of the batch continues; callers count rejections.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A join required a canonical code that the reconciler could not produce.
    #[error("unresolved identifier: {0}")]
    UnresolvedIdentifier(String),

    #[error("store error: {0}")]
    Store(String),

    /// Source adapter failure (file missing, HTTP timeout). Fails the refresh
    /// cycle for that source only.
    #[error("source error: {0}")]
    Source(String),

    #[error("model store error: {0}")]
    ModelStore(String),

    /// Terminal prompt/interaction failure.
    #[error("input error: {0}")]
    Input(String),

    /// Invalid inference input. Rejected before touching the model.
    #[error("validation error: {0}")]
    Validation(String),

    /// Fatal to a training run only, never to the process.
    #[error("training data insufficient: {0}")]
    TrainingDataInsufficient(String),
}
