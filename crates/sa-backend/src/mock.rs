//! Mock backend for testing.
//!
//! Replays a scripted sequence of replies and records every request, so the
//! dispatcher can be tested without real HTTP.

use std::collections::VecDeque;
use std::sync::Mutex;

use sa_protocol::Turn;

use crate::{ApiError, ChatBackend};

/// One scripted outcome of a `complete` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Fail as if the server answered with this status.
    Fail { status: u16, body: String },
    /// Fail with an empty-response error.
    Empty,
}

impl MockReply {
    pub fn text(content: &str) -> Self {
        MockReply::Text(content.to_string())
    }

    pub fn fail(status: u16, body: &str) -> Self {
        MockReply::Fail {
            status,
            body: body.to_string(),
        }
    }
}

/// What the backend was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub history: Vec<Turn>,
    pub text: String,
}

/// Backend that replays [`MockReply`] values in order.
#[derive(Debug, Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<MockRequest>>,
}

impl MockBackend {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ChatBackend for MockBackend {
    async fn complete(&self, history: &[Turn], new_user_text: &str) -> Result<String, ApiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(MockRequest {
                history: history.to_vec(),
                text: new_user_text.to_string(),
            });
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match next {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail { status, body }) => {
                let status = reqwest::StatusCode::from_u16(status)
                    .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                Err(ApiError::from_status(status, body))
            }
            Some(MockReply::Empty) => Err(ApiError::Empty),
            None => Err(ApiError::Status {
                status: 500,
                body: "mock backend has no replies left".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
