use crate::core::error::FxError;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "fxconv/0.1";

/// Builds the HTTP client shared by all providers.
///
/// Every request carries `timeout`; there are no retries.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, FxError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| FxError::fetch("HTTP client", e))
}

/// Fetches `url` and returns the body, mapping transport errors, timeouts and
/// non-2xx statuses to [`FxError::Fetch`].
pub async fn get_text(
    client: &reqwest::Client,
    url: &str,
    source_name: &str,
) -> Result<String, FxError> {
    debug!("Requesting {} from {}", source_name, url);

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FxError::fetch(source_name, format!("request timed out: {url}"))
        } else {
            FxError::fetch(source_name, format!("request error: {e}"))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FxError::fetch(source_name, format!("HTTP error: {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| FxError::fetch(source_name, format!("failed to read body: {e}")))
}
