//! Radix-tree request router with an explicit catch-all.
//!
//! One tree per HTTP method. O(path-length) lookup. Conflicting patterns are
//! rejected when they are registered, so at most one binding can match a
//! given (method, path) and the first registered binding is the only one.
//!
//! The catch-all is not a tree entry. It is consulted only after every tree
//! lookup has failed, and it must be registered last: calling [`Router::on`]
//! after [`Router::fallback`] panics, because a route added behind the
//! catch-all would be unreachable in a first-match router.
//!
//! Matching is lenient in two ways: one trailing slash is ignored
//! (`/dogs/` matches `/dogs`), and a `HEAD` request with no `HEAD` route of
//! its own is answered by the `GET` route. hyper drops the body of `HEAD`
//! responses on the wire.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::HeaderMap;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use tracing::{Instrument, Span, error};

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{json, trace};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Body of every catch-all `404`.
pub const NOT_FOUND_MESSAGE: &str = "Not found!";

/// The default catch-all handler: `404 {"message": "Not found!"}`.
pub async fn not_found(_req: Request) -> Response {
    Response::message(Status::NotFound, NOT_FOUND_MESSAGE)
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    fallback: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallback: None }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax, a trailing `{*name}` captures the
    /// rest of the path:
    ///
    /// ```rust,no_run
    /// # use kennel::{Method, Request, Response, Router};
    /// # async fn get_dog(_: Request) -> Response { Response::text("") }
    /// # async fn create_dog(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/dogs/{id}", get_dog)
    ///     .on(Method::Post, "/dogs",      create_dog);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the pattern is invalid, conflicts with an earlier
    /// registration, or the catch-all is already registered.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        if self.fallback.is_some() {
            panic!("route `{method} {path}` registered after the catch-all would never match");
        }
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    /// Register the catch-all handler, run when no route matches. This must
    /// be the final registration.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), decode(v)))
            .collect();
        Some((handler, params))
    }

    /// Resolves a request against the trees, applying the trailing-slash and
    /// `HEAD` leniency described in the module docs.
    fn find(
        &self,
        method: &http::Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let method = Method::try_from(method).ok()?;
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        self.lookup(method, path).or_else(|| match method {
            Method::Head => self.lookup(Method::Get, path),
            _ => None,
        })
    }

    /// Routes one request and produces one response.
    ///
    /// Never fails: unmatched requests go to the catch-all, malformed JSON
    /// becomes `400`, and a handler that panics becomes `500`. The server
    /// calls this for every request; tests can call it directly.
    pub async fn handle(
        &self,
        method: &http::Method,
        path: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let started = Instant::now();
        async {
            let res = self.respond(method, path, headers, body).await;
            trace::finish(res.status_code(), started);
            res
        }
        .instrument(trace::span(method, path))
        .await
    }

    async fn respond(
        &self,
        method: &http::Method,
        path: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let (handler, params) = match self.find(method, path) {
            Some(hit) => hit,
            None => match &self.fallback {
                Some(fallback) => (Arc::clone(fallback), HashMap::new()),
                None => return Response::message(Status::NotFound, NOT_FOUND_MESSAGE),
            },
        };

        let json = match json::parse_body(&headers, &body) {
            Ok(json) => json,
            Err(rejection) => return rejection,
        };

        let req = Request::new(path.to_owned(), json, params);

        // Own task so a panicking handler takes down only its own request.
        match tokio::spawn(handler.call(req).instrument(Span::current())).await {
            Ok(res) => res,
            Err(e) if e.is_panic() => {
                error!("handler panicked");
                Response::internal_error()
            }
            Err(e) => {
                error!("handler task failed: {e}");
                Response::internal_error()
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Percent-decodes one captured segment. Bytes that do not decode to UTF-8
/// leave the raw segment in place.
fn decode(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http::header::CONTENT_TYPE;
    use serde_json::Value;

    async fn echo_id(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or_default().to_owned())
    }

    async fn echo_json(req: Request) -> Response {
        Response::json(&req.json().cloned().unwrap_or(Value::Null))
    }

    async fn explode(_req: Request) -> Response {
        panic!("boom")
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn message(res: &Response) -> String {
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        body["message"].as_str().unwrap().to_owned()
    }

    #[test]
    fn lookup_extracts_named_segment() {
        let router = Router::new().on(Method::Get, "/dogs/{id}", echo_id);
        let (_, params) = router.lookup(Method::Get, "/dogs/abc").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("abc"));
        assert!(router.lookup(Method::Delete, "/dogs/abc").is_none());
        assert!(router.lookup(Method::Get, "/dogs/abc/extra").is_none());
    }

    #[test]
    fn wildcard_captures_rest_of_path() {
        let router = Router::new().on(Method::Get, "/files/{*rest}", echo_id);
        let (_, params) = router.lookup(Method::Get, "/files/a/b/c").unwrap();
        assert_eq!(params.get("rest").map(String::as_str), Some("a/b/c"));
    }

    #[test]
    fn params_are_percent_decoded() {
        let router = Router::new().on(Method::Get, "/dogs/{id}", echo_id);
        let (_, params) = router.lookup(Method::Get, "/dogs/does%20not").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("does not"));

        let (_, params) = router.lookup(Method::Get, "/dogs/bad%FF").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("bad%FF"));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let router = Router::new().on(Method::Get, "/dogs", echo_id);
        assert!(router.find(&http::Method::GET, "/dogs/").is_some());
        assert!(router.find(&http::Method::GET, "/dogs//").is_none());
        assert!(router.find(&http::Method::GET, "/").is_none());
    }

    #[test]
    fn head_falls_back_to_get_route() {
        let router = Router::new()
            .on(Method::Get, "/dogs", echo_id)
            .on(Method::Post, "/hubs", echo_id);
        assert!(router.find(&http::Method::HEAD, "/dogs").is_some());
        assert!(router.find(&http::Method::HEAD, "/hubs").is_none());
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .on(Method::Get, "/dogs/{id}", echo_id)
            .on(Method::Get, "/dogs/{name}", echo_id);
    }

    #[test]
    #[should_panic(expected = "after the catch-all")]
    fn route_after_fallback_panics() {
        let _ = Router::new()
            .fallback(not_found)
            .on(Method::Get, "/dogs", echo_id);
    }

    #[tokio::test]
    async fn unmatched_request_hits_fallback() {
        let router = Router::new()
            .on(Method::Get, "/dogs/{id}", echo_id)
            .fallback(not_found);
        let res = router
            .handle(&http::Method::GET, "/unknown/path", HeaderMap::new(), Bytes::new())
            .await;
        assert_eq!(res.status_code(), 404);
        assert_eq!(message(&res), NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn unknown_method_hits_fallback() {
        let router = Router::new()
            .on(Method::Get, "/dogs/{id}", echo_id)
            .fallback(not_found);
        let propfind = http::Method::from_bytes(b"PROPFIND").unwrap();
        let res = router.handle(&propfind, "/dogs/1", HeaderMap::new(), Bytes::new()).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn router_without_fallback_still_answers_404() {
        let router = Router::new();
        let res = router
            .handle(&http::Method::GET, "/", HeaderMap::new(), Bytes::new())
            .await;
        assert_eq!(res.status_code(), 404);
        assert_eq!(message(&res), NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn json_body_reaches_handler() {
        let router = Router::new().on(Method::Post, "/echo", echo_json);
        let res = router
            .handle(&http::Method::POST, "/echo", json_headers(), Bytes::from_static(br#"{"a":1}"#))
            .await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn malformed_json_is_400_and_skips_handler() {
        let router = Router::new().on(Method::Post, "/echo", explode);
        let res = router
            .handle(&http::Method::POST, "/echo", json_headers(), Bytes::from_static(b"{oops"))
            .await;
        assert_eq!(res.status_code(), 400);
        assert_eq!(message(&res), json::INVALID_JSON_MESSAGE);
    }

    #[tokio::test]
    async fn panicking_handler_becomes_500() {
        let router = Router::new()
            .on(Method::Get, "/boom", explode)
            .on(Method::Get, "/dogs/{id}", echo_id);
        let res = router
            .handle(&http::Method::GET, "/boom", HeaderMap::new(), Bytes::new())
            .await;
        assert_eq!(res.status_code(), 500);
        assert_eq!(message(&res), crate::response::INTERNAL_ERROR_MESSAGE);

        let res = router
            .handle(&http::Method::GET, "/dogs/7", HeaderMap::new(), Bytes::new())
            .await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"7");
    }
}
