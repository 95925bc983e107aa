//! JSON body parsing.
//!
//! A body is parsed only when it is non-empty and the request declares
//! `application/json`. Anything else reaches the handler unparsed. A body
//! that claims to be JSON but is not is answered with `400` and the handler
//! never runs.

use http::HeaderMap;
use http::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use crate::response::Response;
use crate::status::Status;

pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON body";

/// Returns the parsed body, `None` when there is nothing to parse, or the
/// `400` response to send instead of running the handler.
pub fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<Option<Value>, Response> {
    if body.is_empty() || !declares_json(headers) {
        return Ok(None);
    }
    match serde_json::from_slice(body) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            debug!("rejecting malformed JSON body: {e}");
            Err(Response::message(Status::BadRequest, INVALID_JSON_MESSAGE))
        }
    }
}

/// `application/json`, ignoring case and parameters such as `charset`.
fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}
