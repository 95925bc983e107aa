//! CRUD handlers for one resource collection.
//!
//! [`mount`] registers, for a [`Kind`] such as dogs:
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `GET /dogs` | 200, all records | — |
//! | `GET /dogs/{id}` | 200, record | 404 |
//! | `POST /dogs` | 201, created record | 400 missing fields |
//! | `PUT /dogs/{id}` | 200, replaced record | 404 |
//! | `PATCH /dogs/{id}` | 200, merged record (patchable kinds only) | 404 |
//! | `DELETE /dogs/{id}` | 200, confirmation | 404 |

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::handler::Handler;
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use crate::status::Status;
use crate::store::{Fields, Store, StoreError, capitalize, required_message};

/// Static description of a resource collection.
#[derive(Debug, Clone, Copy)]
pub struct Kind {
    /// Collection path, e.g. `/dogs`.
    pub path: &'static str,
    /// Singular noun used in messages, e.g. `dog`.
    pub noun: &'static str,
    /// Fields a create must carry as non-empty strings.
    pub required: &'static [&'static str],
    /// Whether `PATCH /{path}/{id}` is registered.
    pub patchable: bool,
}

pub const DOGS: Kind = Kind {
    path: "/dogs",
    noun: "dog",
    required: &["name", "breed"],
    patchable: false,
};

/// Hubs accept any body on create.
pub const HUBS: Kind = Kind {
    path: "/hubs",
    noun: "hub",
    required: &[],
    patchable: true,
};

// ── Errors ────────────────────────────────────────────────────────────────────

/// A handler failure, rendered as `{"message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => Response::message(Status::BadRequest, msg),
            ApiError::NotFound(msg) => Response::message(Status::NotFound, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "internal error");
                Response::internal_error()
            }
        }
    }
}

// ── Collection ────────────────────────────────────────────────────────────────

/// A kind together with the store holding its records. Cheap to clone; every
/// handler closure captures one.
#[derive(Clone)]
pub struct Collection {
    kind: Kind,
    store: Arc<Store>,
}

impl Collection {
    pub fn new(kind: Kind) -> Self {
        Self { kind, store: Arc::new(Store::new(kind.required)) }
    }

    pub fn store(&self) -> &Store { &self.store }

    fn error(&self, err: StoreError) -> ApiError {
        match err {
            StoreError::MissingFields(required) => {
                ApiError::BadRequest(required_message(required))
            }
            StoreError::NotFound(id) => {
                ApiError::NotFound(format!("No {} with id {id}", self.kind.noun))
            }
        }
    }
}

/// Registers every route of `collection` on `router`.
pub fn mount(router: Router, collection: Collection) -> Router {
    let kind = collection.kind;
    let item = format!("{}/{{id}}", kind.path);

    let router = router
        .on(Method::Get, kind.path, bind(collection.clone(), list))
        .on(Method::Get, &item, bind(collection.clone(), get))
        .on(Method::Post, kind.path, bind(collection.clone(), create))
        .on(Method::Put, &item, bind(collection.clone(), replace))
        .on(Method::Delete, &item, bind(collection.clone(), delete));

    if kind.patchable {
        router.on(Method::Patch, &item, bind(collection, patch))
    } else {
        router
    }
}

/// Closes `f` over its collection so it fits the router's handler shape.
fn bind<F, Fut>(collection: Collection, f: F) -> impl Handler
where
    F: Fn(Collection, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<Response>> + Send + 'static,
{
    move |req: Request| f(collection.clone(), req)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn list(col: Collection, _req: Request) -> ApiResult<Response> {
    Ok(Response::json(&col.store.list()))
}

async fn get(col: Collection, req: Request) -> ApiResult<Response> {
    let id = path_id(&req)?;
    let record = col.store.get(id).map_err(|e| col.error(e))?;
    Ok(Response::json(&record))
}

async fn create(col: Collection, mut req: Request) -> ApiResult<Response> {
    let fields = body_fields(&mut req)?;
    let record = col.store.create(fields).map_err(|e| {
        debug!(noun = col.kind.noun, "create rejected: {e}");
        col.error(e)
    })?;
    info!(noun = col.kind.noun, id = %record.id, "created");
    let location = format!("{}/{}", col.kind.path, record.id);
    Ok(Response::builder()
        .status(Status::Created)
        .header("location", &location)
        .json(&record))
}

async fn replace(col: Collection, mut req: Request) -> ApiResult<Response> {
    let fields = body_fields(&mut req)?;
    let id = path_id(&req)?;
    let record = col.store.replace(id, fields).map_err(|e| col.error(e))?;
    info!(noun = col.kind.noun, id, "replaced");
    Ok(Response::json(&record))
}

async fn patch(col: Collection, mut req: Request) -> ApiResult<Response> {
    let changes = body_fields(&mut req)?;
    let id = path_id(&req)?;
    let record = col.store.patch(id, changes).map_err(|e| col.error(e))?;
    info!(noun = col.kind.noun, id, "patched");
    Ok(Response::json(&record))
}

async fn delete(col: Collection, req: Request) -> ApiResult<Response> {
    let id = path_id(&req)?;
    col.store.delete(id).map_err(|e| col.error(e))?;
    info!(noun = col.kind.noun, id, "deleted");
    let message = format!("{} with id {id} deleted", capitalize(col.kind.noun));
    Ok(Response::message(Status::Ok, message))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The `{id}` segment. Always present on item routes; a miss means the route
/// table and the handler disagree.
fn path_id(req: &Request) -> ApiResult<&str> {
    req.param("id")
        .ok_or_else(|| ApiError::Internal(format!("route for {} has no id segment", req.path())))
}

/// The body as a field map. No body counts as an empty object.
fn body_fields(req: &mut Request) -> ApiResult<Fields> {
    match req.take_json() {
        None => Ok(Fields::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(ApiError::BadRequest("Request body must be a JSON object".into())),
    }
}
