use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single chat completion call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication failed ({status}): {body}")]
    Auth { status: u16, body: String },
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("the model returned an empty response")]
    Empty,
}

impl ApiError {
    /// Classify a non-2xx response.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth {
                status: status.as_u16(),
                body,
            },
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(body),
            _ => ApiError::Status {
                status: status.as_u16(),
                body,
            },
        }
    }
}

/// Return the response body as text, or the classified error for non-2xx.
pub(crate) async fn read_success_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status, body));
    }
    Ok(response.text().await?)
}
