//! Engine configuration (C9 §2.10): the handful of knobs that are
//! environment-driven rather than per-operation, grounded on the teacher's
//! `EnterpriseClientBuilder`/`EnterpriseClient::from_env` pair in the now
//! removed `client.rs` — same builder-plus-env-loader shape, generalized to
//! the engine's own knobs instead of a single base URL/credential pair.

use crate::tls::{ClientCertPair, TlsOptions};
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Fallback used when `NODE_STATE_POLLING_TIMEOUT` is unset or unparsable
/// (§4.6, §6.4).
pub const DEFAULT_POLLING_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Engine-wide configuration threaded into every run. Built either via
/// [`EngineConfig::builder`] or [`EngineConfig::from_env`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct EngineConfig {
    /// How long a [`crate::operation::polling::poll_state`] loop may run
    /// before giving up (P6).
    #[builder(default = DEFAULT_POLLING_TIMEOUT)]
    pub node_state_polling_timeout: Duration,

    /// Per-request transport timeout, copied onto every `Request` a
    /// `prepare` implementation builds unless it overrides one explicitly.
    #[builder(default = crate::request::DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,

    /// Whether the dispatcher should issue plaintext HTTP against
    /// `wiremock` fixtures instead of HTTPS.
    #[builder(default = false)]
    pub insecure_test_transport: bool,

    /// Whether the NMA's server certificate is verified (§2.10, §4.1, P2).
    #[builder(default = true)]
    pub verify_nma_server_cert: bool,

    /// Whether the HTTPS-DB service's server certificate is verified.
    #[builder(default = true)]
    pub verify_https_server_cert: bool,

    /// Whether hostname verification is also enforced, on top of base
    /// certificate verification (only takes effect when the relevant
    /// `verify_*_server_cert` flag above is also set, per
    /// [`crate::tls::VerificationMode::new`]).
    #[builder(default = true)]
    pub verify_peer_cert_hostname: bool,

    /// Optional client-certificate triple presented to both services.
    #[builder(default, setter(strip_option))]
    pub client_cert: Option<ClientCertPair>,
}

impl EngineConfig {
    /// Read configuration from the process environment, falling back to
    /// defaults on missing or unparsable values (§2.10):
    /// - `NODE_STATE_POLLING_TIMEOUT`: seconds, default 300.
    /// - `OPENGINE_REQUEST_TIMEOUT`: seconds, default 30.
    /// - `OPENGINE_VERIFY_NMA_SERVER_CERT`: `"false"`/`"0"` to disable, default on.
    /// - `OPENGINE_VERIFY_HTTPS_SERVER_CERT`: `"false"`/`"0"` to disable, default on.
    /// - `OPENGINE_VERIFY_PEER_CERT_HOSTNAME`: `"false"`/`"0"` to disable, default on.
    ///
    /// Client certificates are not environment-driven; build one with
    /// [`EngineConfig::builder`] when a caller needs mutual TLS.
    pub fn from_env() -> Self {
        let node_state_polling_timeout = std::env::var("NODE_STATE_POLLING_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLLING_TIMEOUT);

        let request_timeout = std::env::var("OPENGINE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(crate::request::DEFAULT_REQUEST_TIMEOUT);

        let read_bool_env = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| !matches!(v.as_str(), "false" | "0"))
                .unwrap_or(true)
        };

        Self {
            node_state_polling_timeout,
            request_timeout,
            insecure_test_transport: false,
            verify_nma_server_cert: read_bool_env("OPENGINE_VERIFY_NMA_SERVER_CERT"),
            verify_https_server_cert: read_bool_env("OPENGINE_VERIFY_HTTPS_SERVER_CERT"),
            verify_peer_cert_hostname: read_bool_env("OPENGINE_VERIFY_PEER_CERT_HOSTNAME"),
            client_cert: None,
        }
    }

    /// Build the [`TlsOptions`] this configuration describes, ready to hand
    /// to [`crate::engine::OperationEngine::from_config`].
    pub fn tls_options(&self) -> TlsOptions {
        let options = TlsOptions::new(
            self.verify_nma_server_cert,
            self.verify_https_server_cert,
            self.verify_peer_cert_hostname,
        );
        match &self.client_cert {
            Some(pair) => options.with_client_cert(pair.clone()),
            None => options,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn from_env_falls_back_to_defaults_when_unset() {
        unsafe {
            std::env::remove_var("NODE_STATE_POLLING_TIMEOUT");
            std::env::remove_var("OPENGINE_REQUEST_TIMEOUT");
        }
        let config = EngineConfig::from_env();
        assert_eq!(config.node_state_polling_timeout, DEFAULT_POLLING_TIMEOUT);
        assert_eq!(config.request_timeout, crate::request::DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    #[serial]
    fn from_env_reads_polling_timeout_override() {
        unsafe {
            std::env::set_var("NODE_STATE_POLLING_TIMEOUT", "120");
        }
        let config = EngineConfig::from_env();
        assert_eq!(config.node_state_polling_timeout, Duration::from_secs(120));
        unsafe {
            std::env::remove_var("NODE_STATE_POLLING_TIMEOUT");
        }
    }

    #[test]
    fn builder_defaults_match_constants() {
        let config = EngineConfig::builder().build();
        assert_eq!(config.node_state_polling_timeout, DEFAULT_POLLING_TIMEOUT);
        assert!(!config.insecure_test_transport);
        assert!(config.verify_nma_server_cert);
        assert!(config.verify_https_server_cert);
        assert!(config.client_cert.is_none());
    }

    #[test]
    #[serial]
    fn from_env_reads_tls_verification_overrides() {
        unsafe {
            std::env::set_var("OPENGINE_VERIFY_NMA_SERVER_CERT", "false");
            std::env::set_var("OPENGINE_VERIFY_HTTPS_SERVER_CERT", "0");
        }
        let config = EngineConfig::from_env();
        assert!(!config.verify_nma_server_cert);
        assert!(!config.verify_https_server_cert);
        assert!(config.verify_peer_cert_hostname);
        unsafe {
            std::env::remove_var("OPENGINE_VERIFY_NMA_SERVER_CERT");
            std::env::remove_var("OPENGINE_VERIFY_HTTPS_SERVER_CERT");
        }
    }

    #[test]
    fn tls_options_reflects_the_configured_verification_flags() {
        let config = EngineConfig::builder()
            .verify_nma_server_cert(true)
            .verify_https_server_cert(false)
            .verify_peer_cert_hostname(true)
            .build();
        let options = config.tls_options();
        assert!(options.mode_for(crate::tls::Service::Nma).verify_server_cert);
        assert!(!options.mode_for(crate::tls::Service::HttpsDb).verify_server_cert);
    }
}
