//! TLS policy (C1 §4.1): the `{certs, modes}` pair the engine copies into
//! every outbound request during `applyTLSOptions`.

use std::sync::Arc;

/// Which of the two agent services a request targets. Each carries its own
/// TLS verification policy (§3.6, P2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// The per-host Node Management Agent.
    Nma,
    /// The HTTPS endpoint embedded in the running database.
    HttpsDb,
}

impl Service {
    pub fn api_root(self) -> &'static str {
        match self {
            Service::Nma => crate::endpoints::NMA_API_ROOT,
            Service::HttpsDb => crate::endpoints::HTTPS_API_ROOT,
        }
    }
}

/// An optional client-certificate triple (`{key, cert, ca-cert}`).
#[derive(Debug, Clone)]
pub struct ClientCertPair {
    pub key_pem: Vec<u8>,
    pub cert_pem: Vec<u8>,
    pub ca_cert_pem: Option<Vec<u8>>,
}

/// Three independent verification booleans, per service. Hostname
/// verification is only honoured when base verification is also on (P2).
#[derive(Debug, Clone, Copy, Default)]
pub struct VerificationMode {
    pub verify_server_cert: bool,
    pub verify_peer_cert_hostname: bool,
}

impl VerificationMode {
    pub fn new(verify_server_cert: bool, verify_peer_cert_hostname: bool) -> Self {
        Self {
            verify_server_cert,
            // Hostname verification is meaningless without base verification.
            verify_peer_cert_hostname: verify_server_cert && verify_peer_cert_hostname,
        }
    }

    pub fn insecure() -> Self {
        Self {
            verify_server_cert: false,
            verify_peer_cert_hostname: false,
        }
    }
}

/// The caller-supplied `{certs, modes}` pair copied into every request in an
/// operation's collection once `prepare` has populated the request map.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    pub nma_mode: VerificationMode,
    pub https_mode: VerificationMode,
    pub client_cert: Option<Arc<ClientCertPair>>,
}

impl TlsOptions {
    pub fn new(
        verify_nma_server_cert: bool,
        verify_https_server_cert: bool,
        verify_peer_cert_hostname: bool,
    ) -> Self {
        Self {
            nma_mode: VerificationMode::new(verify_nma_server_cert, verify_peer_cert_hostname),
            https_mode: VerificationMode::new(verify_https_server_cert, verify_peer_cert_hostname),
            client_cert: None,
        }
    }

    pub fn with_client_cert(mut self, pair: ClientCertPair) -> Self {
        self.client_cert = Some(Arc::new(pair));
        self
    }

    /// The mode for the given service, per P2: derived from
    /// `verify_nma_server_cert` when the request is an NMA command, else
    /// from `verify_https_server_cert`.
    pub fn mode_for(&self, service: Service) -> VerificationMode {
        match service {
            Service::Nma => self.nma_mode,
            Service::HttpsDb => self.https_mode,
        }
    }
}

/// The resolved TLS mode attached to a single `Request` once
/// `apply_tls_options` has run. Distinct from `TlsOptions` (the engine-wide
/// policy) because a request only ever targets one service.
#[derive(Debug, Clone, Default)]
pub struct RequestTls {
    pub mode: Option<VerificationMode>,
    pub client_cert: Option<Arc<ClientCertPair>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_verification_requires_base_verification() {
        let mode = VerificationMode::new(false, true);
        assert!(!mode.verify_server_cert);
        assert!(!mode.verify_peer_cert_hostname);
    }

    #[test]
    fn mode_for_selects_by_service() {
        let opts = TlsOptions::new(true, false, true);
        assert!(opts.mode_for(Service::Nma).verify_server_cert);
        assert!(!opts.mode_for(Service::HttpsDb).verify_server_cert);
    }
}
