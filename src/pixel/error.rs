use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelErrorCode {
    InvalidArgument,
    Internal,
    Network,
    Sink,
}

impl PixelErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelErrorCode::InvalidArgument => "pixel/invalid-argument",
            PixelErrorCode::Internal => "pixel/internal",
            PixelErrorCode::Network => "pixel/network",
            PixelErrorCode::Sink => "pixel/sink",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PixelError {
    pub code: PixelErrorCode,
    message: String,
}

impl PixelError {
    pub fn new(code: PixelErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for PixelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for PixelError {}

pub type PixelResult<T> = Result<T, PixelError>;

pub fn invalid_argument(message: impl Into<String>) -> PixelError {
    PixelError::new(PixelErrorCode::InvalidArgument, message)
}

pub fn internal_error(message: impl Into<String>) -> PixelError {
    PixelError::new(PixelErrorCode::Internal, message)
}

pub fn network_error(message: impl Into<String>) -> PixelError {
    PixelError::new(PixelErrorCode::Network, message)
}

/// Raised by a sink when the underlying tracking function itself fails.
pub fn sink_error(message: impl Into<String>) -> PixelError {
    PixelError::new(PixelErrorCode::Sink, message)
}
