// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Error Types
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numerical instability at iteration {iteration}, position {position:?}: {message}")]
    NumericalInstability {
        iteration: usize,
        position: [f64; 3],
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TraceResult<T> = Result<T, TraceError>;
