//! Response replayer
//!
//! Reproduces a matched entry onto the live response, or signals that the
//! connection must be dropped to simulate a recorded network failure.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use tracing::warn;

use crate::replay::store::RecordedEntry;
use crate::{ReplayError, Result};

/// Builds live responses from recorded entries
pub struct ResponseReplayer;

impl ResponseReplayer {
    /// Build the live response for a matched entry
    ///
    /// Recorded headers are applied set-style (one value per name, last
    /// recorded wins), except `Content-Length`, which is never copied:
    /// the framework derives the true length from the body written here,
    /// so stale recorded lengths cannot poison the response. A non-empty
    /// recorded MIME type is applied last as `Content-Type`, overriding
    /// any copied header of any casing. Headers that are not valid HTTP
    /// tokens are skipped with a warning rather than failing the replay.
    ///
    /// # Errors
    ///
    /// Returns `ReplayError::SimulatedFailure` when the entry carries a
    /// recorded network failure; the caller must drop the connection
    /// without writing anything. Response construction failures propagate
    /// unmodified.
    pub fn replay(entry: &RecordedEntry) -> Result<Response<Full<Bytes>>> {
        if !entry.simulated_error.is_empty() {
            return Err(ReplayError::SimulatedFailure(
                entry.simulated_error.clone(),
            ));
        }

        let status = StatusCode::from_u16(entry.status).map_err(|_| {
            ReplayError::Other(format!("invalid recorded status code: {}", entry.status))
        })?;

        let mut response = Response::builder()
            .status(status)
            .body(Full::new(Bytes::from(entry.body_text.clone())))?;

        let headers = response.headers_mut();
        for (name, value) in &entry.headers {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }

            let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
                warn!("skipping recorded header with invalid name: {name:?}");
                continue;
            };
            let Ok(header_value) = HeaderValue::from_str(value) else {
                warn!("skipping recorded header {name} with invalid value");
                continue;
            };

            headers.insert(header_name, header_value);
        }

        if !entry.content_type.is_empty() {
            let mime = HeaderValue::from_str(&entry.content_type).map_err(|_| {
                ReplayError::Other(format!(
                    "invalid recorded MIME type: {:?}",
                    entry.content_type
                ))
            })?;
            headers.insert(CONTENT_TYPE, mime);
        }

        Ok(response)
    }
}
