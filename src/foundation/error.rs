/// Crate-wide result alias.
pub type OmmResult<T> = Result<T, OmmError>;

/// Errors produced by baker construction, texture upload and baking.
#[derive(thiserror::Error, Debug)]
pub enum OmmError {
    /// Input descriptor or texture descriptor failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Workload validation rejected a bake that would touch too many texels.
    #[error("workload too big: {0}")]
    WorkloadTooBig(String),

    /// Serializer could not represent the result (offset overflow).
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OmmError {
    /// Build an [`OmmError::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build an [`OmmError::WorkloadTooBig`].
    pub fn workload_too_big(msg: impl Into<String>) -> Self {
        Self::WorkloadTooBig(msg.into())
    }

    /// Build an [`OmmError::Serialization`].
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
