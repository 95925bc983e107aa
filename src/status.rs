//! HTTP status codes as a typed enum.
//!
//! Only the codes this server actually emits. Use [`Status`] wherever a
//! status code is accepted: `Response::message()` or `Response::builder().status()`.
//!
//! ```rust
//! use kennel::{Response, Status};
//!
//! Response::message(Status::NotFound, "Not found!");
//!
//! Response::builder()
//!     .status(Status::Created)
//!     .header("location", "/dogs/abc")
//!     .json(&serde_json::json!({ "id": "abc" }));
//! ```

use http::StatusCode;

/// HTTP status codes emitted by kennel handlers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    Created,             // 201

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    NotFound,            // 404
    PayloadTooLarge,     // 413

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl From<Status> for StatusCode {
    fn from(s: Status) -> StatusCode {
        match s {
            Status::Ok                  => StatusCode::OK,
            Status::Created             => StatusCode::CREATED,
            Status::BadRequest          => StatusCode::BAD_REQUEST,
            Status::NotFound            => StatusCode::NOT_FOUND,
            Status::PayloadTooLarge     => StatusCode::PAYLOAD_TOO_LARGE,
            Status::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        StatusCode::from(s).as_u16()
    }
}
