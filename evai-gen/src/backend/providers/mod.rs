//! HTTP providers behind the backend client

pub mod elevenlabs;
pub mod openai_compat;

use crate::error::BackendError;

/// Turn a non-success response into a classified error
pub(crate) async fn error_for_response(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BackendError::from_status(status, &body)
}
