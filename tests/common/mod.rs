//! Shared fixtures: a Range-aware mock document server and doc builders.

use std::path::Path;
use std::sync::{Arc, Mutex};

use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use lexwatch::config::Config;

/// The marker phrase as consolidated-text pages actually ship it:
/// entity-encoded accents, date appended.
pub const MARKER_PREFIX: &str = "&Uacute;ltima actualizaci&oacute;n publicada el ";

/// Build a document of `total_len` filler bytes with the marker phrase
/// starting at `marker_pos`.
pub fn make_doc(total_len: usize, marker_pos: usize, date_text: &str) -> Vec<u8> {
    let marker = format!("{MARKER_PREFIX}{date_text}");
    assert!(
        marker_pos + marker.len() <= total_len,
        "marker must fit inside the document"
    );
    let mut doc = vec![b'.'; total_len];
    doc[marker_pos..marker_pos + marker.len()].copy_from_slice(marker.as_bytes());
    doc
}

/// Byte offset of the date digits inside `doc`.
pub fn digit_offset(doc: &[u8], date_text: &str) -> u64 {
    let needle = date_text.as_bytes();
    doc.windows(needle.len())
        .position(|w| w == needle)
        .expect("date digits present in doc") as u64
}

/// A mock origin serving one mutable document with HEAD, `Range`, and
/// plain GET semantics (206 for satisfiable ranges, 416 past the end).
pub struct RangeDoc {
    body: Arc<Mutex<Vec<u8>>>,
}

impl RangeDoc {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body: Arc::new(Mutex::new(body)),
        }
    }

    /// Handle for mutating the served document between runs.
    pub fn handle(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.body)
    }
}

impl Respond for RangeDoc {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body = self.body.lock().unwrap().clone();
        let total = body.len() as u64;
        let range = request
            .headers
            .get("range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_range);

        match range {
            Some((start, _)) if start >= total => {
                let cr = format!("bytes */{total}");
                ResponseTemplate::new(416).insert_header("content-range", cr.as_str())
            }
            Some((start, end)) => {
                let end = end.min(total - 1);
                let slice = body[start as usize..=end as usize].to_vec();
                let cr = format!("bytes {start}-{end}/{total}");
                ResponseTemplate::new(206)
                    .insert_header("content-range", cr.as_str())
                    .set_body_raw(slice, "text/html")
            }
            None => ResponseTemplate::new(200).set_body_raw(body, "text/html"),
        }
    }
}

fn parse_range(value: &str) -> Option<(u64, u64)> {
    let spec = value.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

/// Start a mock server serving `doc` at `/ley.html`.
///
/// Returns the server (keep it alive), the document URL, and a handle for
/// mutating the body.
pub async fn serve_doc(doc: Vec<u8>) -> (MockServer, String, Arc<Mutex<Vec<u8>>>) {
    let server = MockServer::start().await;
    let responder = RangeDoc::new(doc);
    let handle = responder.handle();
    Mock::given(any()).respond_with(responder).mount(&server).await;
    let url = format!("{}/ley.html", server.uri());
    (server, url, handle)
}

/// Test configuration: temp catalog, no courtesy pauses.
pub fn test_config(db_path: &Path) -> Config {
    Config {
        db_path: db_path.to_path_buf(),
        timeout_ms: 5_000,
        courtesy_delay_ms: 0,
        http_port: 0,
        user_agent: "lexwatch-test".to_string(),
    }
}
