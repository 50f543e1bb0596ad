//! Replay coordinator
//!
//! Wires the matcher and the responder together for each live request.
//! Holds no state of its own beyond the matcher's cursors; every request
//! is handled independently.

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use tracing::info;

use crate::replay::matcher::{RequestSignature, SignatureMatcher};
use crate::replay::responder::ResponseReplayer;
use crate::replay::store::RecordedTraffic;
use crate::Result;

/// Coordinates matching and response replay for live requests
pub struct ReplayCoordinator {
    matcher: SignatureMatcher,
    /// Emit per-request diagnostics. Injected at construction; never
    /// affects matching, only trace output.
    verbose: bool,
}

impl ReplayCoordinator {
    /// Create a coordinator over the given traffic store
    #[must_use]
    pub fn new(traffic: Arc<RecordedTraffic>, verbose: bool) -> Self {
        Self {
            matcher: SignatureMatcher::new(traffic),
            verbose,
        }
    }

    /// Handle one live request
    ///
    /// Derives the request signature from method and path (the caller
    /// passes the path component only), consumes the next matching entry,
    /// and produces its replayed response. An unmatched request yields a
    /// 404 naming the signature.
    ///
    /// # Errors
    ///
    /// Returns `ReplayError::SimulatedFailure` for entries recorded as
    /// network failures; the transport drops the connection unflushed.
    /// Response construction failures propagate unmodified.
    pub fn handle(&self, method: &str, path: &str) -> Result<Response<Full<Bytes>>> {
        let signature = RequestSignature::new(method, path);

        if self.verbose {
            info!("received request: {signature}");
        }

        let Some((index, entry)) = self.matcher.match_next(&signature) else {
            if self.verbose {
                info!("no remaining entry for request: {signature}");
            }
            return no_match_response(&signature);
        };

        if self.verbose {
            info!(
                "matched entry #{index}, replaying response (status: {}, error: {:?})",
                entry.status, entry.simulated_error
            );
        }

        ResponseReplayer::replay(entry)
    }
}

fn no_match_response(signature: &RequestSignature) -> Result<Response<Full<Bytes>>> {
    let body = format!("No more HAR entries for request: {signature}\n");

    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body)))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::store::RecordedEntry;
    use crate::ReplayError;
    use http_body_util::BodyExt;

    fn coordinator(entries: Vec<RecordedEntry>) -> ReplayCoordinator {
        ReplayCoordinator::new(Arc::new(RecordedTraffic::from_entries(entries)), false)
    }

    fn entry(method: &str, path: &str, body: &str) -> RecordedEntry {
        RecordedEntry {
            method: method.to_string(),
            path: Some(path.to_string()),
            status: 200,
            headers: vec![],
            body_text: body.to_string(),
            content_type: String::new(),
            simulated_error: String::new(),
        }
    }

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_matched_request_replayed() {
        let coordinator = coordinator(vec![entry("GET", "/foo", "ok")]);

        let response = coordinator.handle("GET", "/foo").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_unmatched_request_names_signature() {
        let coordinator = coordinator(vec![entry("GET", "/foo", "ok")]);

        let first = coordinator.handle("GET", "/foo").unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = coordinator.handle("GET", "/foo").unwrap();
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
        assert!(body_text(second).await.contains("GET /foo"));
    }

    #[tokio::test]
    async fn test_entries_served_in_order() {
        let coordinator = coordinator(vec![
            entry("GET", "/foo", "1"),
            entry("GET", "/foo", "2"),
        ]);

        assert_eq!(body_text(coordinator.handle("GET", "/foo").unwrap()).await, "1");
        assert_eq!(body_text(coordinator.handle("GET", "/foo").unwrap()).await, "2");
        assert_eq!(
            coordinator.handle("GET", "/foo").unwrap().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_simulated_error_propagates() {
        let mut failing = entry("GET", "/down", "");
        failing.simulated_error = "ERR_CONNECTION_REFUSED".to_string();

        let coordinator = coordinator(vec![failing]);

        let result = coordinator.handle("GET", "/down");
        assert!(matches!(result, Err(ReplayError::SimulatedFailure(_))));
    }

    #[tokio::test]
    async fn test_verbose_flag_does_not_change_matching() {
        let traffic = Arc::new(RecordedTraffic::from_entries(vec![
            entry("GET", "/foo", "1"),
        ]));
        let coordinator = ReplayCoordinator::new(traffic, true);

        assert_eq!(
            coordinator.handle("GET", "/foo").unwrap().status(),
            StatusCode::OK
        );
        assert_eq!(
            coordinator.handle("GET", "/foo").unwrap().status(),
            StatusCode::NOT_FOUND
        );
    }
}
