use crate::ServiceError;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

/// Create a JSON request, parse the response.
/// Failures are tagged with their [`crate::ErrorKind`] here, where the
/// transport still knows what went wrong.
pub async fn send_json<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: reqwest::header::HeaderMap,
    provider: &'static str,
) -> Result<R, ServiceError> {
    let response = client
        .post(url)
        .headers(headers)
        .json(data)
        .send()
        .await
        .map_err(classify_send_error)?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| {
            ServiceError::Transient(format!("failed to load response body: {}", e.without_url()))
        })?;

    if !status.is_success() {
        return Err(classify_status(
            status,
            String::from_utf8_lossy(&body).into_owned(),
        ));
    }

    serde_json::from_slice(&body).map_err(|e| {
        ServiceError::Invariant(provider, format!("Failed to parse response: {e}"))
    })
}

/// The request URL carries the API key, so it is stripped before the error is
/// wrapped into anything that ends up in logs or notices.
fn classify_send_error(error: reqwest::Error) -> ServiceError {
    let error = error.without_url();
    if error.is_timeout() {
        ServiceError::Transient(format!("request timed out: {error}"))
    } else if error.is_connect() || error.is_request() {
        ServiceError::Blocked(error)
    } else {
        ServiceError::Transport(error)
    }
}

pub(crate) fn classify_status(status: StatusCode, body: String) -> ServiceError {
    if status.is_server_error() {
        ServiceError::Transient(format!("{status}: {body}"))
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ServiceError::Configuration(format!("{status}: {body}"))
    } else {
        ServiceError::StatusCode(status, body)
    }
}
