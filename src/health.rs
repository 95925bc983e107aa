//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it serve traffic? |
//!
//! The stores live in memory and are built before the listener binds, so
//! the server is ready as soon as it is alive.

use serde_json::json;

use crate::{Request, Response};

/// Always `200 {"status": "ok"}`.
pub async fn liveness(_req: Request) -> Response {
    Response::json(&json!({ "status": "ok" }))
}

/// Always `200 {"status": "ready"}`.
pub async fn readiness(_req: Request) -> Response {
    Response::json(&json!({ "status": "ready" }))
}
