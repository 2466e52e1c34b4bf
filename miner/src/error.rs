use thiserror::Error;

use trinary_types::TernaryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinerError {
    #[error(transparent)]
    Ternary(#[from] TernaryError),

    #[error("bundle mining cancelled")]
    Cancelled,

    #[error("bundle mining worker failed: {0}")]
    Worker(String),
}
