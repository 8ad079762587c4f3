//! DNS lookups used by the verifier.
//!
//! [`DnsResolver`] is the seam between the engine and the network: the
//! verifier only ever asks for NS hosts, IPv4 addresses and MX records.
//! [`SystemResolver`] answers through hickory using the host's resolver
//! configuration; tests substitute in-memory implementations.
//!
//! An empty answer (NXDOMAIN, NODATA) is `Ok(vec![])`. Transport failures are
//! `Err`; the verifier treats both the same way, as "no records".

use crate::error::VerifyError;
use crate::types::MxRecord;
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, warn};

/// The three lookups a verification needs.
///
/// Implementations must be cheap to share across tasks.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Authoritative nameserver hosts, trailing dots stripped.
    async fn lookup_ns(&self, domain: &str) -> Result<Vec<String>, VerifyError>;

    /// IPv4 addresses in answer order. IPv6 is never returned.
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<String>, VerifyError>;

    /// Mail exchangers in answer order (not yet sorted).
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, VerifyError>;
}

/// Resolver backed by the system configuration (`/etc/resolv.conf` and friends).
#[derive(Clone)]
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Build from the system configuration, falling back to hickory's
    /// default upstreams when none can be read.
    pub fn new() -> Self {
        let inner = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!("System resolver configuration unavailable ({}), using defaults", e);
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self { inner }
    }

    /// Wrap an already configured hickory resolver.
    pub fn from_resolver(inner: TokioAsyncResolver) -> Self {
        Self { inner }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute form so search domains are never appended.
fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// NXDOMAIN and NODATA are answers, not failures.
fn empty_or_error<T>(record: &str, name: &str, err: ResolveError) -> Result<Vec<T>, VerifyError> {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => {
            debug!("{} lookup for {}: no records", record, name);
            Ok(Vec::new())
        }
        _ => {
            debug!("{} lookup for {} failed: {}", record, name, err);
            Err(VerifyError::network_with_source(
                format!("{} lookup for {} failed", record, name),
                err.to_string(),
            ))
        }
    }
}

#[async_trait]
impl DnsResolver for SystemResolver {
    async fn lookup_ns(&self, domain: &str) -> Result<Vec<String>, VerifyError> {
        match self.inner.ns_lookup(absolute(domain)).await {
            Ok(lookup) => {
                let hosts: Vec<String> = lookup
                    .iter()
                    .map(|ns| ns.0.to_utf8().trim_end_matches('.').to_string())
                    .collect();
                debug!("NS lookup for {}: {} hosts", domain, hosts.len());
                Ok(hosts)
            }
            Err(e) => empty_or_error("NS", domain, e),
        }
    }

    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<String>, VerifyError> {
        match self.inner.ipv4_lookup(absolute(host)).await {
            Ok(lookup) => {
                let ips: Vec<String> = lookup.iter().map(|a| a.0.to_string()).collect();
                debug!("A lookup for {}: {} addresses", host, ips.len());
                Ok(ips)
            }
            Err(e) => empty_or_error("A", host, e),
        }
    }

    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, VerifyError> {
        match self.inner.mx_lookup(absolute(domain)).await {
            Ok(lookup) => {
                let records: Vec<MxRecord> = lookup
                    .iter()
                    .map(|mx| MxRecord::new(mx.exchange().to_utf8(), mx.preference()))
                    .collect();
                debug!("MX lookup for {}: {} exchanges", domain, records.len());
                Ok(records)
            }
            Err(e) => empty_or_error("MX", domain, e),
        }
    }
}
