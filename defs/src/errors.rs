use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request to {url} failed ({}): {message}", status_label(.status))]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("The server rejected the payload sent to {url} (422 Unprocessable Entity): {body}")]
    Validation { url: String, body: String },

    #[error("Failed to parse desired-state document {path}: {message}")]
    Parse { path: String, message: String },
}

impl SyncError {
    /// HTTP status of the failed request, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Transport { status, .. } => *status,
            SyncError::Validation { .. } => Some(422),
            _ => None,
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no response".to_string(),
    }
}
