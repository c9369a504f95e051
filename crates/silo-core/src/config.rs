//! Client configuration.
//!
//! Provides [`ClientConfig`] for configuring a [`SiloClient`](crate::SiloClient)
//! and [`Credentials`] for authenticating against the store. Configuration
//! values can be loaded from environment variables via
//! [`ClientConfig::from_env`].

use anyhow::Context;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use silo_model::ScopeConfig;

/// Credentials for request authentication.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    /// The access key ID.
    pub access_key_id: String,
    /// The secret access key.
    pub secret_access_key: String,
    /// Optional session token for temporary credentials.
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Client-level configuration.
///
/// Holds the endpoint, credentials, and the outermost layer of the scope
/// cascade. The `scope` field provides the region, headers, and query
/// parameters every operation falls back to when neither the call nor the
/// bucket handle overrides them.
///
/// # Examples
///
/// ```
/// use silo_core::config::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.endpoint, "http://localhost:9000");
/// assert!(config.path_style);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Endpoint URL of the store (e.g. `"http://localhost:9000"`).
    #[builder(default = String::from("http://localhost:9000"), setter(into))]
    pub endpoint: String,

    /// Credentials presented with every request.
    #[builder(default)]
    pub credentials: Credentials,

    /// Whether to use path-style addressing instead of virtual hosting.
    #[builder(default = true)]
    pub path_style: bool,

    /// Client-level scope defaults (region, headers, query parameters).
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://localhost:9000"),
            credentials: Credentials::default(),
            path_style: true,
            scope: ScopeConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SILO_ENDPOINT` | `http://localhost:9000` |
    /// | `SILO_PATH_STYLE` | `true` |
    /// | `SILO_REGION` | unset |
    /// | `SILO_ACCESS_KEY` (or `AWS_ACCESS_KEY_ID`) | empty |
    /// | `SILO_SECRET_KEY` (or `AWS_SECRET_ACCESS_KEY`) | empty |
    /// | `SILO_SESSION_TOKEN` (or `AWS_SESSION_TOKEN`) | unset |
    ///
    /// # Examples
    ///
    /// ```
    /// use silo_core::config::ClientConfig;
    ///
    /// let config = ClientConfig::from_env();
    /// assert!(!config.endpoint.is_empty());
    /// ```
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SILO_ENDPOINT") {
            config.endpoint = v;
        }
        if let Ok(v) = std::env::var("SILO_PATH_STYLE") {
            config.path_style = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("SILO_REGION") {
            config.scope.region = Some(v);
        }
        if let Ok(v) =
            std::env::var("SILO_ACCESS_KEY").or_else(|_| std::env::var("AWS_ACCESS_KEY_ID"))
        {
            config.credentials.access_key_id = v;
        }
        if let Ok(v) =
            std::env::var("SILO_SECRET_KEY").or_else(|_| std::env::var("AWS_SECRET_ACCESS_KEY"))
        {
            config.credentials.secret_access_key = v;
        }
        if let Ok(v) =
            std::env::var("SILO_SESSION_TOKEN").or_else(|_| std::env::var("AWS_SESSION_TOKEN"))
        {
            config.credentials.session_token = Some(v);
        }

        config
    }

    /// Parse the configured endpoint as a URI.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint is not a valid URI.
    pub fn endpoint_uri(&self) -> anyhow::Result<http::Uri> {
        self.endpoint
            .parse::<http::Uri>()
            .with_context(|| format!("invalid endpoint {:?}", self.endpoint))
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
