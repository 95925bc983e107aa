//! Application wiring: collections, routes, catch-all.

use serde_json::json;
use tracing::{info, warn};

use crate::health;
use crate::method::Method;
use crate::resource::{self, Collection, DOGS, HUBS};
use crate::router::{Router, not_found};

/// Every collection the server exposes.
#[derive(Clone)]
pub struct App {
    pub dogs: Collection,
    pub hubs: Collection,
}

impl App {
    /// Fresh, empty collections; with `seed`, the dogs collection starts
    /// with one example record.
    pub fn new(seed: bool) -> Self {
        let app = Self {
            dogs: Collection::new(DOGS),
            hubs: Collection::new(HUBS),
        };
        if seed {
            app.seed();
        }
        app
    }

    fn seed(&self) {
        let bicho = json!({ "name": "Bicho", "breed": "Maltese" });
        let serde_json::Value::Object(fields) = bicho else { return };
        match self.dogs.store().create(fields) {
            Ok(record) => info!(id = %record.id, "seeded dogs"),
            Err(e) => warn!("seeding dogs failed: {e}"),
        }
    }

    /// Builds the router. The catch-all goes last; see [`Router::fallback`].
    pub fn router(&self) -> Router {
        let router = Router::new()
            .on(Method::Get, "/healthz", health::liveness)
            .on(Method::Get, "/readyz", health::readiness);
        let router = resource::mount(router, self.dogs.clone());
        let router = resource::mount(router, self.hubs.clone());
        router.fallback(not_found)
    }
}
