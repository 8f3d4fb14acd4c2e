/// Convenience result type used across pixcache.
pub type PixcacheResult<T> = Result<T, PixcacheError>;

/// Top-level error taxonomy used by cache and registry APIs.
///
/// Cache misses, zero-area requests and capacity pressure are never errors.
#[derive(thiserror::Error, Debug)]
pub enum PixcacheError {
    /// Role id, dimension or spec outside the encodable or valid range.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Declared aliases form a cycle; the configuration load is rejected.
    #[error("alias cycle between roles {roles:?}")]
    AliasCycle {
        /// Roles participating in the cycle, in declaration order.
        roles: Vec<u32>,
    },

    /// Internal buffer invariant violated while generating an image.
    #[error("generation error: {0}")]
    Generation(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixcacheError {
    /// Build a [`PixcacheError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`PixcacheError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`PixcacheError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
