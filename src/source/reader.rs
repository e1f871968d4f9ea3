//! Reading config sources from disk or over HTTP.

use std::time::Duration;

use crate::error::ConfigError;
use crate::source::SourceId;

const BOM: char = '\u{feff}';

/// Opens resolved sources and returns their text.
///
/// Sources are read whole; the handle (file or response body) is released
/// before `read` returns on every path.
#[derive(Debug, Clone)]
pub struct SourceReader {
    client: reqwest::Client,
}

impl SourceReader {
    /// Create a reader whose HTTP requests time out after `http_timeout`.
    pub fn new(http_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build configured HTTP client, using defaults");
                reqwest::Client::new()
            });
        Self { client }
    }

    /// Read `id` fully, strip a leading byte-order mark and decode UTF-8.
    pub async fn read(&self, id: &SourceId) -> Result<String, ConfigError> {
        let bytes = match id {
            SourceId::Local(path) => tokio::fs::read(path).await.map_err(|e| {
                tracing::warn!(source_id = %id, error = %e, "Cannot open config file");
                unavailable(id, e.to_string())
            })?,
            SourceId::Remote(url) => {
                let response = self.client.get(url.clone()).send().await.map_err(|e| {
                    tracing::warn!(source_id = %id, error = %e, "Cannot load config file");
                    unavailable(id, e.to_string())
                })?;
                let status = response.status();
                if status != reqwest::StatusCode::OK {
                    tracing::warn!(source_id = %id, status = %status, "Unexpected http status code for config file");
                    return Err(unavailable(id, format!("unexpected http status {}, expected 200", status)));
                }
                response
                    .bytes()
                    .await
                    .map_err(|e| unavailable(id, e.to_string()))?
                    .to_vec()
            }
        };
        decode(id, bytes)
    }
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

fn unavailable(id: &SourceId, reason: String) -> ConfigError {
    ConfigError::SourceUnavailable {
        source_id: id.to_string(),
        reason,
    }
}

fn decode(id: &SourceId, bytes: Vec<u8>) -> Result<String, ConfigError> {
    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        ConfigError::Syntax {
            source_id: id.to_string(),
            line,
            message: "invalid UTF-8".to_string(),
        }
    })?;
    Ok(match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
