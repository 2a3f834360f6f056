/// Crate-wide result alias.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors raised outside the node collection itself.
///
/// The collection and its access context never fail; absence is reported as `None`. These
/// variants cover loading and running replay scripts.
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    /// A replay script or option value is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A replay script referenced something it never declared.
    #[error("script error: {0}")]
    Script(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayoutError {
    /// Build a [`LayoutError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LayoutError::Script`].
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Build a [`LayoutError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}
