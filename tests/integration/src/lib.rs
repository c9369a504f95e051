//! End-to-end scenario tests for the silo facade.
//!
//! Every scenario drives the public client surface against the in-memory
//! backend, so the whole suite is self-contained and runs under a plain
//! `cargo test -p silo-integration`. The backend's fault planner stands in
//! for a misbehaving store where a scenario needs one.

use std::sync::Arc;
use std::sync::Once;

use silo_core::SiloClient;
use silo_core::backend::memory::InMemoryBackend;
use silo_core::config::ClientConfig;
use silo_model::ScopeConfig;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A client over a fresh in-memory backend, plus the backend itself for
/// call inspection and fault planning.
#[must_use]
pub fn make_client() -> (Arc<InMemoryBackend>, SiloClient) {
    init_tracing();
    let backend = Arc::new(InMemoryBackend::new());
    let client = SiloClient::new(backend.clone(), ClientConfig::default());
    (backend, client)
}

/// Same as [`make_client`], but with a client-level default region.
#[must_use]
pub fn make_regional_client(region: &str) -> (Arc<InMemoryBackend>, SiloClient) {
    init_tracing();
    let backend = Arc::new(InMemoryBackend::new());
    let config = ClientConfig::builder()
        .scope(ScopeConfig::builder().region(region).build())
        .build();
    let client = SiloClient::new(backend.clone(), config);
    (backend, client)
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

mod test_bucket_lifecycle;
mod test_listing;
mod test_purge;
mod test_scope;
mod test_tags;
mod test_touch_dirs;
