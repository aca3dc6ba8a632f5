use thiserror::Error;

pub type Result<T> = std::result::Result<T, KmeansError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KmeansError {
    #[error("invalid config '{field}': {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// The dataset is malformed: empty, jagged, zero-width or non-finite.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data: cannot create {k} clusters from {n_points} points")]
    InsufficientData {
        k: usize,
        n_points: usize,
    },

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
    },

    #[error("model is not fitted; call fit first")]
    NotFitted,

    /// A distance or centroid coordinate became NaN or infinite.
    #[error("numeric error: {0}")]
    Numeric(String),
}

impl KmeansError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "InvalidConfig",
            Self::InvalidInput(_) => "InvalidInput",
            Self::InsufficientData { .. } => "InsufficientData",
            Self::DimensionMismatch { .. } => "DimensionMismatch",
            Self::NotFitted => "NotFitted",
            Self::Numeric(_) => "NumericError",
        }
    }
}
