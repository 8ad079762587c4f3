//! WHOIS protocol client for owner lookups.
//!
//! WHOIS is a line-oriented text protocol on TCP port 43: the client writes
//! one query line and the server streams its answer until it closes the
//! connection. Responses are unstructured, so owner and referral extraction
//! are best effort.
//!
//! Every connection in the process goes through one permit pool of
//! [`WHOIS_MAX_CONCURRENT`] slots, however many domains are being checked in
//! parallel. Registries rate-limit and blacklist aggressive clients; the pool
//! keeps us under their radar.

use crate::context::CheckContext;
use crate::error::{describe_duration, VerifyError};
use crate::protocols::registry::whois_server_for;
use crate::types::VerifyConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};

/// Maximum simultaneous WHOIS connections across the process.
pub const WHOIS_MAX_CONCURRENT: usize = 5;

/// Standard WHOIS port.
pub const WHOIS_PORT: u16 = 43;

/// Deadline applied when the caller's context has none.
pub const WHOIS_FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Labels that point at a more specific WHOIS server, in normalised form.
pub const REFERRAL_FIELDS: &[&str] = &[
    "registrar whois server",
    "referralserver",
    "referral server",
    "whois server",
    "refer",
];

/// Owner labels in priority order, in normalised form.
pub const OWNER_FIELDS: &[&str] = &[
    "registrant organization",
    "registrant name",
    "registrant",
    "org-name",
    "organisation",
    "organization",
    "holder",
];

lazy_static::lazy_static! {
    static ref WHOIS_PERMITS: Arc<Semaphore> = Arc::new(Semaphore::new(WHOIS_MAX_CONCURRENT));
}

/// A bidirectional byte stream to a WHOIS server.
pub trait WhoisStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> WhoisStream for T {}

/// Opens connections to WHOIS servers.
#[async_trait]
pub trait WhoisDialer: Send + Sync {
    async fn dial(&self, server: &str, port: u16) -> std::io::Result<Box<dyn WhoisStream>>;
}

/// Plain TCP dialer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

#[async_trait]
impl WhoisDialer for TcpDialer {
    async fn dial(&self, server: &str, port: u16) -> std::io::Result<Box<dyn WhoisStream>> {
        let stream = TcpStream::connect((server, port)).await?;
        Ok(Box::new(stream))
    }
}

/// WHOIS client with referral chasing and a shared connection cap.
///
/// Clones share the dialer, the permit pool and the server overrides.
#[derive(Clone)]
pub struct WhoisClient {
    dialer: Arc<dyn WhoisDialer>,
    permits: Arc<Semaphore>,
    port: u16,
    fallback_timeout: Duration,
    server_overrides: Arc<HashMap<String, String>>,
    referral_fields: Arc<Vec<String>>,
}

impl std::fmt::Debug for WhoisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhoisClient")
            .field("port", &self.port)
            .field("fallback_timeout", &self.fallback_timeout)
            .field("server_overrides", &self.server_overrides)
            .field("referral_fields", &self.referral_fields)
            .finish_non_exhaustive()
    }
}

impl WhoisClient {
    /// Create a TCP client on the process-wide permit pool.
    pub fn new() -> Self {
        Self {
            dialer: Arc::new(TcpDialer),
            permits: Arc::clone(&WHOIS_PERMITS),
            port: WHOIS_PORT,
            fallback_timeout: WHOIS_FALLBACK_TIMEOUT,
            server_overrides: Arc::new(HashMap::new()),
            referral_fields: Arc::new(REFERRAL_FIELDS.iter().map(|f| f.to_string()).collect()),
        }
    }

    /// Create a client honouring the WHOIS settings of `config`.
    pub fn from_config(config: &VerifyConfig) -> Self {
        let mut referral_fields: Vec<String> =
            REFERRAL_FIELDS.iter().map(|f| f.to_string()).collect();
        for extra in &config.referral_fields {
            let label = normalize_label(extra.trim_end_matches(':'));
            if !label.is_empty() && !referral_fields.contains(&label) {
                referral_fields.push(label);
            }
        }

        let overrides = config
            .whois_servers
            .iter()
            .map(|(tld, server)| (tld.to_ascii_lowercase(), server.clone()))
            .collect();

        Self {
            port: config.whois_port,
            fallback_timeout: config.whois_fallback_timeout,
            server_overrides: Arc::new(overrides),
            referral_fields: Arc::new(referral_fields),
            ..Self::new()
        }
    }

    /// Replace the dialer (custom transports, test doubles).
    pub fn with_dialer(mut self, dialer: Arc<dyn WhoisDialer>) -> Self {
        self.dialer = dialer;
        self
    }

    /// Use a separate permit pool instead of the process-wide one.
    pub fn with_pool(mut self, permits: Arc<Semaphore>) -> Self {
        self.permits = permits;
        self
    }

    /// WHOIS server to ask first about `domain`.
    pub fn server_for(&self, domain: &str) -> String {
        whois_server_for(domain, &self.server_overrides)
    }

    /// Send one query to `server` and return the full response text.
    ///
    /// Waits for a permit first; a context that finishes during the wait
    /// returns a cancellation-kind error without dialing. Without a context
    /// deadline, the fallback timeout starts once the permit is held. Lines are joined
    /// with `\n`. If reading fails after data arrived, the error is
    /// [`VerifyError::WhoisRead`] carrying the partial text.
    pub async fn query(
        &self,
        ctx: &CheckContext,
        server: &str,
        domain: &str,
    ) -> Result<String, VerifyError> {
        // Released on every return path when dropped
        let _permit = ctx
            .run("WHOIS permit wait", self.permits.acquire())
            .await?
            .map_err(|_| VerifyError::internal("WHOIS permit pool closed"))?;
        trace!("Acquired WHOIS permit for {} -> {}", domain, server);

        // The fallback bounds the connection only, never the queueing
        let ctx = if ctx.deadline().is_some() {
            ctx.clone()
        } else {
            trace!(
                "No deadline on context, bounding WHOIS to {}",
                describe_duration(self.fallback_timeout)
            );
            ctx.child(Some(self.fallback_timeout))
        };

        let mut stream = ctx
            .run("WHOIS dial", self.dialer.dial(server, self.port))
            .await?
            .map_err(|e| {
                VerifyError::whois(server, format!("dial {}:{} failed: {}", server, self.port, e))
            })?;

        let request = format!("{}\r\n", domain);
        ctx.run("WHOIS write", stream.write_all(request.as_bytes()))
            .await?
            .map_err(|e| VerifyError::whois(server, format!("write failed: {}", e)))?;

        let mut reader = BufReader::new(stream);
        let mut response = String::new();
        let mut line = Vec::new();

        loop {
            line.clear();
            match ctx.run("WHOIS read", reader.read_until(b'\n', &mut line)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(_)) => {
                    let text = String::from_utf8_lossy(&line);
                    response.push_str(text.trim_end_matches(&['\r', '\n'][..]));
                    response.push('\n');
                }
                Ok(Err(e)) => {
                    return Err(VerifyError::whois_read(server, e.to_string(), response));
                }
                Err(e) if response.is_empty() => return Err(e),
                Err(e) => {
                    return Err(VerifyError::whois_read(server, e.to_string(), response));
                }
            }
        }

        debug!(
            "WHOIS {} answered {} bytes for {}",
            server,
            response.len(),
            domain
        );
        Ok(response)
    }

    /// Best-effort registrant for `domain`, following one referral.
    ///
    /// Never fails: network trouble at either hop only means less data.
    /// A registrar-level answer wins over the registry's when it names an owner.
    pub async fn resolve_owner(&self, ctx: &CheckContext, domain: &str) -> Option<String> {
        let server = self.server_for(domain);

        let response = match self.query(ctx, &server, domain).await {
            Ok(response) => response,
            Err(e) => match e.partial_response() {
                Some(partial) => {
                    debug!("Using partial WHOIS answer from {}: {}", server, e);
                    partial.to_string()
                }
                None => {
                    warn!("WHOIS lookup for {} via {} failed: {}", domain, server, e);
                    return None;
                }
            },
        };

        if response.trim().is_empty() {
            debug!("WHOIS {} returned nothing for {}", server, domain);
            return None;
        }

        if let Some(referral) = extract_referral_with(&response, &self.referral_fields) {
            if !referral.eq_ignore_ascii_case(&server) {
                debug!("Following WHOIS referral {} -> {} for {}", server, referral, domain);
                let referred = match self.query(ctx, &referral, domain).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!("WHOIS referral {} for {} failed: {}", referral, domain, e);
                        e.partial_response().map(str::to_string)
                    }
                };
                if let Some(owner) = referred.as_deref().and_then(extract_owner) {
                    return Some(owner);
                }
            }
        }

        extract_owner(&response)
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase and collapse internal whitespace: `"Registrar  WHOIS Server"`
/// becomes `"registrar whois server"`.
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// `label: value` pairs of a response, labels normalised, values trimmed.
fn fields(response: &str) -> impl Iterator<Item = (String, &str)> {
    response.lines().filter_map(|line| {
        let (label, value) = line.trim().split_once(':')?;
        Some((normalize_label(label), value.trim()))
    })
}

/// Reduce a referral value to a bare host name.
///
/// `whois://whois.example.com:43/` becomes `whois.example.com`.
fn clean_referral(value: &str) -> String {
    let mut host = value.trim();
    for scheme in ["whois://", "http://", "https://"] {
        if let Some(rest) = host
            .get(..scheme.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .map(|_| &host[scheme.len()..])
        {
            host = rest;
        }
    }
    let end = host.find(&[':', '/'][..]).unwrap_or(host.len());
    host[..end].trim().to_ascii_lowercase()
}

/// First referral server named in `response`, using the built-in labels.
pub fn extract_referral_server(response: &str) -> Option<String> {
    extract_referral_with(response, REFERRAL_FIELDS)
}

fn extract_referral_with<S: AsRef<str>>(response: &str, labels: &[S]) -> Option<String> {
    fields(response)
        .filter(|(label, _)| labels.iter().any(|l| l.as_ref() == label))
        .map(|(_, value)| clean_referral(value))
        .find(|host| !host.is_empty())
}

/// Registrant organisation or name from a WHOIS response.
///
/// Labels are tried in [`OWNER_FIELDS`] order and the first non-empty value
/// wins. Values starting with `REDACTED` (any case) count as absent.
pub fn extract_owner(response: &str) -> Option<String> {
    let parsed: Vec<(String, &str)> = fields(response).collect();

    OWNER_FIELDS.iter().find_map(|field| {
        parsed
            .iter()
            .filter(|(label, _)| label == field)
            .map(|(_, value)| *value)
            .find(|value| !value.is_empty() && !is_redacted(value))
            .map(str::to_string)
    })
}

fn is_redacted(value: &str) -> bool {
    value
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("redacted"))
}
