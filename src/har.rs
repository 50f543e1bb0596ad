//! HAR (HTTP Archive) document schema and loader
//!
//! Pure data parsing; the replay engine consumes the result and never
//! touches JSON itself. Only the fields replay needs are modeled, the
//! rest of the HAR spec is ignored during deserialization.

use std::path::Path;

use serde::Deserialize;

use crate::{ReplayError, Result};

/// Top-level HAR document
#[derive(Debug, Deserialize)]
pub struct Har {
    /// The archive log
    pub log: Log,
}

/// The `log` object holding the recorded entries
#[derive(Debug, Deserialize)]
pub struct Log {
    /// Captured request/response pairs, in recording order
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// One captured request/response pair
#[derive(Debug, Deserialize)]
pub struct Entry {
    /// The recorded request
    pub request: Request,
    /// The recorded response
    pub response: Response,
}

/// Recorded request fields used for matching
#[derive(Debug, Deserialize)]
pub struct Request {
    /// HTTP verb as recorded
    pub method: String,
    /// Full recorded URL; only its path component is used for matching
    pub url: String,
}

/// Recorded response fields used for replay
#[derive(Debug, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers, duplicates allowed, order preserved
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Response body
    #[serde(default)]
    pub content: Content,
    /// Non-empty marks a network-level failure captured by the recorder
    /// (e.g. `ERR_CONNECTION_REFUSED`)
    #[serde(rename = "_error", default)]
    pub error: String,
}

/// A single name/value header pair
#[derive(Debug, Deserialize)]
pub struct Header {
    /// Header name
    pub name: String,
    /// Header value
    pub value: String,
}

/// Response body and MIME type
#[derive(Debug, Default, Deserialize)]
pub struct Content {
    /// Literal body text
    #[serde(default)]
    pub text: String,
    /// MIME type; empty when none was recorded
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
}

/// Load and parse a HAR file from disk
///
/// # Errors
///
/// Returns error if the file does not exist, cannot be read, or is not
/// a valid HAR document. Load failures are fatal; the server must not
/// start serving without a traffic store.
pub fn load(path: &Path) -> Result<Har> {
    if !path.exists() {
        return Err(ReplayError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let document: Har = serde_json::from_slice(&bytes)?;
    Ok(document)
}
