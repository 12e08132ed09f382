use std::sync::Arc;
use std::time::Duration;

use super::types::MediaError;

/// Whole-file downloads can be slow on public CDNs.
const STREAM_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

pub(super) fn build_client() -> Result<reqwest::blocking::Client, MediaError> {
    reqwest::blocking::Client::builder()
        .timeout(STREAM_FETCH_TIMEOUT)
        .build()
        .map_err(|e| MediaError::Fetch(e.to_string()))
}

/// Download the stream at `url` into memory so it can be decoded and seeked.
pub(super) fn fetch_stream(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Arc<[u8]>, MediaError> {
    let response = client
        .get(url)
        .send()
        .map_err(|e| MediaError::Fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::Fetch(format!("HTTP {}", status.as_u16())));
    }

    let bytes = response
        .bytes()
        .map_err(|e| MediaError::Fetch(e.to_string()))?;
    if bytes.is_empty() {
        return Err(MediaError::Fetch("empty response body".to_string()));
    }
    Ok(Arc::from(bytes.as_ref()))
}
