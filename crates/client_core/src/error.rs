use reqwest::StatusCode;
use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("word service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("word service returned {status}{}", describe_api_error(.api_error))]
    Status {
        status: StatusCode,
        api_error: Option<ApiError>,
    },
    #[error("malformed word payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("local cache failure: {0:#}")]
    Cache(anyhow::Error),
    #[error("invalid word service url '{0}'")]
    InvalidBaseUrl(String),
}

impl StoreError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

fn describe_api_error(api_error: &Option<ApiError>) -> String {
    api_error
        .as_ref()
        .map(|e| format!(" ({:?}: {})", e.code, e.message))
        .unwrap_or_default()
}
