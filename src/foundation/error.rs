pub type FlipbookResult<T> = Result<T, FlipbookError>;

/// Failure category, independent of the message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameErrorKind {
    NotFound,
    FetchFailed,
    DecodeError,
    EnumerationFailed,
    Config,
    Other,
}

#[derive(thiserror::Error, Debug)]
pub enum FlipbookError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("fetch failed: {0}")]
    FetchFailed(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipbookError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        Self::FetchFailed(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    pub fn enumeration(msg: impl Into<String>) -> Self {
        Self::EnumerationFailed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn kind(&self) -> FrameErrorKind {
        match self {
            Self::NotFound(_) => FrameErrorKind::NotFound,
            Self::FetchFailed(_) => FrameErrorKind::FetchFailed,
            Self::DecodeError(_) => FrameErrorKind::DecodeError,
            Self::EnumerationFailed(_) => FrameErrorKind::EnumerationFailed,
            Self::Config(_) => FrameErrorKind::Config,
            Self::Other(_) => FrameErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
