use thiserror::Error;

/// Failures reported by the external collaborators (catalog, credential
/// store, update source, launcher). None of these are fatal to the UI.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewerError {
    /// The credential store has no entry, or the entry could not be parsed
    #[error("no stored credentials")]
    NoStoredCredentials,

    /// The remote service rejected the credentials
    #[error("authentication failed ({api}): {reason}")]
    Authentication { api: String, reason: String },

    /// Request never got an HTTP response
    #[error("network error: {0}")]
    Network(String),

    /// Server returned an error status
    #[error("server returned {0}: {1}")]
    ServerError(u16, String),

    /// Failed to parse a response body
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// External player or browser could not be started
    #[error("failed to launch {0}: {1}")]
    Launch(String, String),

    /// Credential store read/write failure
    #[error("credential store error: {0}")]
    Store(String),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(String),
}

impl ViewerError {
    /// Longer description with a hint, shown in the output pane
    pub fn diagnostics(&self) -> String {
        match self {
            ViewerError::NoStoredCredentials => {
                "No saved login found. Enter your email and password in the form.".to_string()
            }
            ViewerError::Authentication { api, reason } => {
                format!("Login rejected by the {} API: {}. Check email and password.", api, reason)
            }
            ViewerError::Network(source) => {
                format!("Network error: {}. Check your connection.", source)
            }
            ViewerError::ServerError(status, message) => {
                format!("Server error {}: {}. Try again later.", status, message)
            }
            ViewerError::Parse(source) => {
                format!("Unexpected response: {}", source)
            }
            ViewerError::Launch(what, source) => {
                format!("Could not start {}: {}. Is it installed and in PATH?", what, source)
            }
            ViewerError::Store(source) => format!("Credential store: {}", source),
            ViewerError::Io(source) => format!("IO: {}", source),
        }
    }

    /// True for failures the pollers should just retry on the next tick
    pub fn is_transient(&self) -> bool {
        matches!(self, ViewerError::Network(_) | ViewerError::ServerError(..))
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ViewerError::ServerError(status.as_u16(), e.to_string())
        } else if e.is_decode() {
            ViewerError::Parse(e.to_string())
        } else {
            ViewerError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(e: std::io::Error) -> Self {
        ViewerError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(e: serde_json::Error) -> Self {
        ViewerError::Parse(e.to_string())
    }
}
