use thiserror::Error;

use trinary_types::TernaryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    #[error(transparent)]
    Ternary(#[from] TernaryError),

    #[error("proof-of-work search cancelled")]
    Cancelled,

    #[error("proof-of-work worker failed: {0}")]
    Worker(String),
}
