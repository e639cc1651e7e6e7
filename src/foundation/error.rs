/// Convenience result type used across traitforge.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Top-level error taxonomy used by catalog, generation and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum ForgeError {
    /// Invalid user-provided catalog or parameters. Raised before any state changes.
    #[error("validation error: {0}")]
    Validation(String),

    /// More unique combinations requested than the catalog can produce.
    #[error("capacity error: requested {requested} unique items but {detail}")]
    Capacity {
        /// Number of unique items the caller asked for.
        requested: u64,
        /// Human-readable description of what is achievable.
        detail: String,
    },

    /// Variant bytes could not be read or decoded as an image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Raster or archive serialization failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ForgeError {
    /// Build a [`ForgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ForgeError::Capacity`] value.
    pub fn capacity(requested: u64, detail: impl Into<String>) -> Self {
        Self::Capacity {
            requested,
            detail: detail.into(),
        }
    }

    /// Build a [`ForgeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ForgeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Return `true` for [`ForgeError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Return `true` for [`ForgeError::Capacity`].
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::Capacity { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
