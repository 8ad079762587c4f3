//! Single-domain verification.
//!
//! This module provides [`DomainVerifier`], which gathers the DNS and WHOIS
//! signals for one domain and folds them into a [`VerificationRecord`].

use crate::context::CheckContext;
use crate::error::VerifyError;
use crate::protocols::dns::{DnsResolver, SystemResolver};
use crate::protocols::whois::WhoisClient;
use crate::types::{MxRecord, VerificationRecord, VerifyConfig};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Checks one domain for delegation, owner, A/MX records and parking.
///
/// Cloning is cheap; clones share the resolver and the WHOIS client.
///
/// # Example
///
/// ```rust,no_run
/// use domain_verify_lib::{CheckContext, DomainVerifier};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let verifier = DomainVerifier::new();
///     let ctx = CheckContext::with_timeout(Duration::from_secs(30));
///     let record = verifier.verify(&ctx, "example.com").await?;
///     println!("registered: {}", record.is_registered());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DomainVerifier {
    resolver: Arc<dyn DnsResolver>,
    whois: WhoisClient,
    config: VerifyConfig,
}

impl DomainVerifier {
    /// Create a verifier using the system resolver and default settings.
    pub fn new() -> Self {
        Self::with_config(VerifyConfig::default())
    }

    /// Create a verifier with custom configuration.
    pub fn with_config(config: VerifyConfig) -> Self {
        Self {
            resolver: Arc::new(SystemResolver::new()),
            whois: WhoisClient::from_config(&config),
            config,
        }
    }

    /// Assemble a verifier from explicit collaborators.
    pub fn from_parts(
        resolver: Arc<dyn DnsResolver>,
        whois: WhoisClient,
        config: VerifyConfig,
    ) -> Self {
        Self {
            resolver,
            whois,
            config,
        }
    }

    /// Replace the DNS resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn DnsResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the WHOIS client.
    pub fn with_whois(mut self, whois: WhoisClient) -> Self {
        self.whois = whois;
        self
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Verify a canonical FQDN.
    ///
    /// Registration is decided by NS presence alone. For a delegated domain
    /// the A, MX and WHOIS lookups run concurrently; a failure in any of them
    /// only empties that signal. Fails only with a cancellation-kind error,
    /// when `ctx` is already done at the start or finishes before the signals
    /// are in, so a half-gathered record is never reported as complete.
    pub async fn verify(
        &self,
        ctx: &CheckContext,
        domain: &str,
    ) -> Result<VerificationRecord, VerifyError> {
        ctx.check()?;

        let nameservers = self
            .gather(ctx, "NS", domain, self.resolver.lookup_ns(domain))
            .await;
        ctx.check()?;

        if nameservers.is_empty() {
            debug!("{} has no NS records, treating as unregistered", domain);
            return Ok(VerificationRecord::unregistered(domain));
        }

        let (a_records, mx_records, owner) = tokio::join!(
            self.gather(ctx, "A", domain, self.resolver.lookup_ipv4(domain)),
            self.mail_exchangers(ctx, domain),
            self.owner(ctx, domain),
        );
        ctx.check()?;

        let record =
            VerificationRecord::registered(domain, nameservers, owner, a_records, mx_records);
        debug!(
            "{}: a={} mx={} owner={} parked={}",
            domain,
            record.a_records().len(),
            record.mx_records().len(),
            record.owner().is_some(),
            record.is_parked()
        );
        Ok(record)
    }

    /// Run one lookup under `ctx`; any failure means "no records".
    async fn gather<T, F>(&self, ctx: &CheckContext, kind: &str, name: &str, lookup: F) -> Vec<T>
    where
        F: Future<Output = Result<Vec<T>, VerifyError>>,
    {
        match ctx.run(kind, lookup).await {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                debug!("{} lookup for {} degraded to empty: {}", kind, name, e);
                Vec::new()
            }
            Err(e) => {
                debug!("{} lookup for {} interrupted: {}", kind, name, e);
                Vec::new()
            }
        }
    }

    async fn mail_exchangers(&self, ctx: &CheckContext, domain: &str) -> Vec<MxRecord> {
        let mut records = self
            .gather(ctx, "MX", domain, self.resolver.lookup_mx(domain))
            .await;

        if self.config.resolve_mx_ips && !records.is_empty() {
            let lookups = records.iter().map(|mx| {
                self.gather(ctx, "A", &mx.host, self.resolver.lookup_ipv4(&mx.host))
            });
            let resolved = join_all(lookups).await;
            for (mx, ips) in records.iter_mut().zip(resolved) {
                mx.resolved_ips = ips;
            }
        }

        records
    }

    async fn owner(&self, ctx: &CheckContext, domain: &str) -> Option<String> {
        if !self.config.lookup_owner {
            return None;
        }
        self.whois.resolve_owner(ctx, domain).await
    }
}

impl Default for DomainVerifier {
    fn default() -> Self {
        Self::new()
    }
}
