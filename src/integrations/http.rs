//! Response handling shared by the GitHub and Todoist adapters

use crate::{Result, SyncError};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Send a request, reporting unreachable hosts and timeouts as [`SyncError::Network`]
pub(crate) async fn send(
    request: RequestBuilder,
    service: &str,
    operation: &str,
) -> Result<Response> {
    request.send().await.map_err(|e| {
        // Check for transport failures before anything reached the API
        if e.is_connect() || e.is_timeout() {
            SyncError::Network(format!("{} {}: {}", service, operation, e))
        } else {
            SyncError::Http(e)
        }
    })
}

/// Check the status of a response and decode its JSON body
///
/// Non-success statuses become [`SyncError::Integration`] carrying the body.
/// Bodies that are not the expected JSON are logged verbatim and become
/// [`SyncError::Parse`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    service: &str,
    operation: &str,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    // Map error statuses, keeping the body for the log line
    if !status.is_success() {
        return Err(match status {
            StatusCode::UNAUTHORIZED => {
                SyncError::Integration(format!("{} authentication failed", service))
            }
            StatusCode::FORBIDDEN => SyncError::Integration(format!(
                "{} API forbidden (rate limit?): {}",
                service, body
            )),
            status => SyncError::Integration(format!(
                "{} {} failed: HTTP {}: {}",
                service, operation, status, body
            )),
        });
    }

    // Log the raw body so a changed payload shape can be diagnosed
    serde_json::from_str(&body).map_err(|e| {
        warn!(
            service = %service,
            operation = %operation,
            error = %e,
            body = %body,
            "Failed to parse JSON response"
        );
        SyncError::Parse(format!("{} {}: {}", service, operation, e))
    })
}
