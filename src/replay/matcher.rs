//! Stateful signature matcher
//!
//! Maps each live request to the next unconsumed recorded entry whose
//! method and path match, strictly in recording order per signature.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::replay::store::{RecordedEntry, RecordedTraffic};

/// Method + path of a live request, the only matching key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    /// HTTP verb of the live request
    pub method: String,
    /// Path component of the live request, query and fragment stripped
    pub path: String,
}

impl RequestSignature {
    /// Build a signature from a live request's method and path
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Stateful matcher holding one next-candidate cursor per distinct signature
///
/// Cursors only ever advance. A single mutex serializes every
/// read-scan-advance sequence; the critical section is in-memory string
/// comparison only and never blocks on I/O or awaits.
pub struct SignatureMatcher {
    traffic: Arc<RecordedTraffic>,
    /// Signature key -> next candidate index. Absent key means index 0;
    /// keys are created on first advance and never evicted.
    cursors: Mutex<HashMap<String, usize>>,
}

impl SignatureMatcher {
    /// Create a matcher over the given traffic store
    #[must_use]
    pub fn new(traffic: Arc<RecordedTraffic>) -> Self {
        Self {
            traffic,
            cursors: Mutex::new(HashMap::new()),
        }
    }

    /// Find and consume the next recorded entry matching `signature`
    ///
    /// Scans forward from the signature's cursor; entries below the cursor
    /// are never revisited. On a match the cursor advances past the matched
    /// index, so no index is ever handed out twice for the same signature.
    /// On a miss the cursor is left unchanged, keeping other signatures'
    /// scans of the same region unaffected.
    pub fn match_next(&self, signature: &RequestSignature) -> Option<(usize, &RecordedEntry)> {
        let key = signature.key();

        let mut cursors = self
            .cursors
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let start = cursors.get(&key).copied().unwrap_or(0);

        for i in start..self.traffic.len() {
            let entry = self.traffic.get(i)?;
            if entry.matches(&signature.method, &signature.path) {
                cursors.insert(key, i + 1);
                return Some((i, entry));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn matcher(entries: Vec<RecordedEntry>) -> SignatureMatcher {
        SignatureMatcher::new(Arc::new(RecordedTraffic::from_entries(entries)))
    }

    #[test]
    fn test_consumes_in_recording_order() {
        let matcher = matcher(vec![
            entry("GET", "/foo", "1"),
            entry("GET", "/bar", "other"),
            entry("GET", "/foo", "2"),
        ]);
        let sig = RequestSignature::new("GET", "/foo");

        let (i, first) = matcher.match_next(&sig).unwrap();
        assert_eq!(i, 0);
        assert_eq!(first.body_text, "1");

        let (i, second) = matcher.match_next(&sig).unwrap();
        assert_eq!(i, 2);
        assert_eq!(second.body_text, "2");

        assert!(matcher.match_next(&sig).is_none());
    }

    #[test]
    fn test_miss_leaves_cursor_unchanged() {
        let matcher = matcher(vec![entry("GET", "/foo", "1")]);

        assert!(matcher
            .match_next(&RequestSignature::new("GET", "/missing"))
            .is_none());

        // the exhausted scan for /missing must not consume /foo
        let (i, _) = matcher
            .match_next(&RequestSignature::new("GET", "/foo"))
            .unwrap();
        assert_eq!(i, 0);
    }

    #[test]
    fn test_cursors_are_independent() {
        let matcher = matcher(vec![
            entry("GET", "/a", "a1"),
            entry("GET", "/b", "b1"),
            entry("GET", "/a", "a2"),
            entry("GET", "/b", "b2"),
        ]);
        let sig_a = RequestSignature::new("GET", "/a");
        let sig_b = RequestSignature::new("GET", "/b");

        assert_eq!(matcher.match_next(&sig_a).unwrap().1.body_text, "a1");
        assert_eq!(matcher.match_next(&sig_b).unwrap().1.body_text, "b1");
        assert_eq!(matcher.match_next(&sig_a).unwrap().1.body_text, "a2");
        assert_eq!(matcher.match_next(&sig_b).unwrap().1.body_text, "b2");
        assert!(matcher.match_next(&sig_a).is_none());
        assert!(matcher.match_next(&sig_b).is_none());
    }

    #[test]
    fn test_method_distinguishes_signatures() {
        let matcher = matcher(vec![
            entry("POST", "/foo", "posted"),
            entry("GET", "/foo", "got"),
        ]);

        assert_eq!(
            matcher
                .match_next(&RequestSignature::new("GET", "/foo"))
                .unwrap()
                .1
                .body_text,
            "got"
        );
        assert_eq!(
            matcher
                .match_next(&RequestSignature::new("POST", "/foo"))
                .unwrap()
                .1
                .body_text,
            "posted"
        );
    }

    #[test]
    fn test_unparseable_entry_is_skipped() {
        let broken = RecordedEntry {
            method: "GET".to_string(),
            path: None,
            status: 200,
            headers: vec![],
            body_text: "broken".to_string(),
            content_type: String::new(),
            simulated_error: String::new(),
        };

        let matcher = matcher(vec![broken, entry("GET", "/foo", "ok")]);

        let (i, found) = matcher
            .match_next(&RequestSignature::new("GET", "/foo"))
            .unwrap();
        assert_eq!(i, 1);
        assert_eq!(found.body_text, "ok");
    }

    #[test]
    fn test_concurrent_same_signature_no_duplicates() {
        let matcher = Arc::new(matcher(vec![
            entry("GET", "/foo", "1"),
            entry("GET", "/foo", "2"),
            entry("GET", "/foo", "3"),
            entry("GET", "/foo", "4"),
        ]));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let matcher = Arc::clone(&matcher);
            handles.push(std::thread::spawn(move || {
                matcher
                    .match_next(&RequestSignature::new("GET", "/foo"))
                    .map(|(i, _)| i)
            }));
        }

        let mut indices: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        indices.sort_unstable();

        // every entry assigned exactly once, none lost
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }
}
