use std::sync::Arc;

use rustls::RootCertStore;
use rustls_pki_types::CertificateDer;

/// Wraps the `rustls` client configuration this transport negotiates TLS
/// with. Built from a caller-supplied root store rather than reaching for a
/// system-cert-store crate the teacher pack never depended on — hosts that
/// want OS trust roots supply them when constructing this.
#[derive(Clone)]
pub struct TlsConfig {
    pub(crate) inner: Arc<rustls::ClientConfig>,
}

impl TlsConfig {
    pub fn new(roots: RootCertStore) -> Self {
        let inner = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Self { inner: Arc::new(inner) }
    }

    /// Builds a root store from DER-encoded certificates (e.g. a pinned
    /// PubNub origin chain shipped alongside the binary) and wraps it the
    /// same way [`TlsConfig::new`] does. Certificates that fail to parse are
    /// skipped rather than failing the whole store, matching how `rustls`'s
    /// own `RootCertStore::add` reports per-certificate errors.
    pub fn from_der_certs(certs: impl IntoIterator<Item = CertificateDer<'static>>) -> Self {
        let mut roots = RootCertStore::empty();
        for cert in certs {
            let _ = roots.add(cert);
        }
        Self::new(roots)
    }
}
