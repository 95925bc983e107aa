//! Incoming HTTP request type.

use std::collections::HashMap;

use serde_json::Value;

/// An incoming request as a handler sees it: the path, its decoded path
/// parameters and the JSON body.
///
/// The body was read and parsed by the dispatcher before the handler runs;
/// see [`crate::middleware::json`].
pub struct Request {
    pub(crate) path: String,
    pub(crate) json: Option<Value>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(path: String, json: Option<Value>, params: HashMap<String, String>) -> Self {
        Self { path, json, params }
    }

    pub fn path(&self) -> &str { &self.path }

    /// The parsed JSON body. `None` when the request had no body or did not
    /// declare `application/json`.
    pub fn json(&self) -> Option<&Value> { self.json.as_ref() }

    /// Takes ownership of the parsed JSON body.
    pub fn take_json(&mut self) -> Option<Value> { self.json.take() }

    /// Returns a named path parameter, percent-decoded.
    ///
    /// For a route `/dogs/{id}`, `req.param("id")` on `/dogs/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
