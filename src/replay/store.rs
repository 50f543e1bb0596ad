//! Immutable store of recorded traffic
//!
//! Built once at startup from a parsed HAR document and shared read-only
//! for the process lifetime; no locking is needed to read it.

use tracing::debug;
use url::Url;

use crate::har::Har;

/// One captured request/response pair, ready for replay
#[derive(Debug, Clone)]
pub struct RecordedEntry {
    /// HTTP verb as recorded
    pub method: String,
    /// Path component of the recorded URL; `None` when the URL could not
    /// be parsed (such entries never match and are skipped during scans)
    pub path: Option<String>,
    /// HTTP status code to replay
    pub status: u16,
    /// Ordered header pairs, duplicates allowed
    pub headers: Vec<(String, String)>,
    /// Literal response body, replayed verbatim
    pub body_text: String,
    /// MIME type; empty means none recorded
    pub content_type: String,
    /// Non-empty marks a recorded network-level failure; replayed by
    /// dropping the connection instead of sending a body
    pub simulated_error: String,
}

impl RecordedEntry {
    /// Whether this entry's method and path equal the given signature parts
    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path.as_deref() == Some(path)
    }
}

/// Ordered, immutable sequence of recorded entries
///
/// Index order is recording order. Never mutated after construction.
#[derive(Debug)]
pub struct RecordedTraffic {
    entries: Vec<RecordedEntry>,
}

impl RecordedTraffic {
    /// Build the store from a parsed HAR document, preserving entry order
    ///
    /// Recorded URLs are reduced to their path component here, once, so
    /// matching is plain string comparison. Entries with unparseable URLs
    /// are kept (indices stay stable) but can never match.
    #[must_use]
    pub fn from_har(document: Har) -> Self {
        let entries = document
            .log
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let path = recorded_path(&entry.request.url);
                if path.is_none() {
                    debug!(
                        "could not parse URL in HAR entry #{i}: {}",
                        entry.request.url
                    );
                }

                RecordedEntry {
                    method: entry.request.method,
                    path,
                    status: entry.response.status,
                    headers: entry
                        .response
                        .headers
                        .into_iter()
                        .map(|h| (h.name, h.value))
                        .collect(),
                    body_text: entry.response.content.text,
                    content_type: entry.response.content.mime_type,
                    simulated_error: entry.response.error,
                }
            })
            .collect();

        Self { entries }
    }

    /// Build a store directly from entries
    #[must_use]
    pub fn from_entries(entries: Vec<RecordedEntry>) -> Self {
        Self { entries }
    }

    /// Number of recorded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if in range
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RecordedEntry> {
        self.entries.get(index)
    }
}

/// Extract the path component of a recorded URL
///
/// Host, port, query string, and fragment are discarded. Bare paths
/// (no scheme) occasionally appear in hand-edited HAR files and are
/// accepted as-is up to any query or fragment.
fn recorded_path(raw: &str) -> Option<String> {
    match Url::parse(raw) {
        Ok(url) => Some(url.path().to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) if raw.starts_with('/') => {
            let end = raw.find(['?', '#']).unwrap_or(raw.len());
            Some(raw[..end].to_string())
        }
        Err(_) => None,
    }
}
