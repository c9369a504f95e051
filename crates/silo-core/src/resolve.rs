//! Scope cascade resolution.
//!
//! Every facade operation resolves its effective configuration exactly once,
//! before the first backend call, by cascading three [`ScopeConfig`] layers:
//! the call's own scope, the resource handle's scope, and the client's
//! scope. Resolution is a pure merge with no I/O.

use silo_model::{ResolvedScope, ScopeConfig};

/// Cascade three configuration scopes into the effective configuration for
/// one backend call.
///
/// The region is the first one set, checking call, then resource, then
/// client. For
/// headers and query parameters the maps are unioned; a key claimed by more
/// than one scope takes the narrowest scope's values wholesale.
#[must_use]
pub fn resolve(call: &ScopeConfig, resource: &ScopeConfig, client: &ScopeConfig) -> ResolvedScope {
    let region = call
        .region
        .clone()
        .or_else(|| resource.region.clone())
        .or_else(|| client.region.clone());

    let headers = client
        .headers
        .overlay(&resource.headers)
        .overlay(&call.headers);
    let query = client.query.overlay(&resource.query).overlay(&call.query);

    ResolvedScope {
        region,
        headers,
        query,
    }
}
