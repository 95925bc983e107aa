//! # kennel
//!
//! A small JSON resource server over in-memory collections. Two collections
//! ship with it, `dogs` and `hubs`, each with the usual CRUD verbs:
//!
//! - `GET /dogs`, `GET /dogs/{id}`
//! - `POST /dogs` (`name` and `breed` required)
//! - `PUT /dogs/{id}` (full replace), `DELETE /dogs/{id}`
//! - `PATCH /hubs/{id}` (merge; hubs only)
//!
//! Anything else gets `404 {"message": "Not found!"}`.
//!
//! Records live for the lifetime of the process. There is no persistence
//! and no authentication.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kennel::{App, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kennel::Error> {
//!     let app = App::new(true);
//!     Server::bind("0.0.0.0:5000").await?.serve(app.router()).await
//! }
//! ```
//!
//! ## Building blocks
//!
//! - Radix-tree routing via [`matchit`], one tree per method, with an
//!   explicit catch-all registered last ([`Router::fallback`])
//! - `application/json` bodies parsed before the handler runs, capped at
//!   100 kB by default (`413` beyond that)
//! - Async I/O on tokio + hyper, HTTP/1.1 and HTTP/2
//! - Graceful shutdown on SIGTERM / Ctrl-C, draining in-flight requests

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod app;
pub mod config;
pub mod health;
pub mod id;
pub mod middleware;
pub mod resource;
pub mod store;

pub use app::App;
pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{NOT_FOUND_MESSAGE, Router, not_found};
pub use server::{BODY_TOO_LARGE_MESSAGE, DEFAULT_BODY_LIMIT, Server};
pub use status::Status;
pub use store::{Record, Store, StoreError};
