//! Unified error type.

/// The error type returned by kennel's fallible infrastructure operations.
///
/// Application-level errors (400, 404, 500) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// failures to start serving: a bad address or a port that cannot be bound.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid socket address `{0}`")]
    Address(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
