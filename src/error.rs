use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Invalid viewport size: {0}")]
    InvalidViewport(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("Context creation failed: {0}")]
    ContextFailed(String),

    #[error("Navigation failed for {url}: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("Screenshot capture failed: {0}")]
    CaptureFailed(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl CaptureError {
    /// True for errors raised by request validation, before any browser
    /// resource is acquired.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CaptureError::InvalidUrl(_)
                | CaptureError::InvalidSelector(_)
                | CaptureError::InvalidFilename(_)
                | CaptureError::InvalidViewport(_)
        )
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CaptureError::FileNotFound(err.to_string()),
            _ => CaptureError::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::SerializationError(err.to_string())
    }
}
