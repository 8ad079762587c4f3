//! Network-free doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use domain_verify_lib::{
    DnsResolver, DomainVerifier, MxRecord, VerifyConfig, VerifyError, WhoisClient, WhoisDialer,
    WhoisStream, WHOIS_MAX_CONCURRENT,
};
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Semaphore;

/// DNS data for one name.
#[derive(Debug, Clone, Default)]
pub struct MockZone {
    pub ns: Vec<String>,
    pub a: Vec<String>,
    pub mx: Vec<(String, u16)>,
    /// Applied to the NS lookup
    pub delay: Option<Duration>,
    /// NS lookup returns a network error
    pub fail_ns: bool,
}

impl MockZone {
    pub fn delegated(ns: &[&str]) -> Self {
        Self {
            ns: ns.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_a(mut self, ips: &[&str]) -> Self {
        self.a = ips.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_mx(mut self, mx: &[(&str, u16)]) -> Self {
        self.mx = mx.iter().map(|(h, p)| (h.to_string(), *p)).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// In-memory resolver. Unknown names have no records.
#[derive(Debug, Default)]
pub struct MockResolver {
    zones: HashMap<String, MockZone>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, name: &str, zone: MockZone) -> Self {
        self.zones.insert(name.to_string(), zone);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for MockResolver {
    async fn lookup_ns(&self, domain: &str) -> Result<Vec<String>, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(zone) = self.zones.get(domain) else {
            return Ok(Vec::new());
        };
        if let Some(delay) = zone.delay {
            tokio::time::sleep(delay).await;
        }
        if zone.fail_ns {
            return Err(VerifyError::network("SERVFAIL"));
        }
        Ok(zone.ns.clone())
    }

    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<String>, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.zones.get(host).map(|z| z.a.clone()).unwrap_or_default())
    }

    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .zones
            .get(domain)
            .map(|z| z.mx.iter().map(|(h, p)| MxRecord::new(h, *p)).collect())
            .unwrap_or_default())
    }
}

/// WHOIS dialer serving canned responses over in-memory duplex streams.
///
/// Servers without a script refuse the connection. Tracks how many
/// connections are open at once.
#[derive(Debug, Default)]
pub struct ScriptedDialer {
    responses: HashMap<String, String>,
    delay: Duration,
    open: Arc<AtomicUsize>,
    max_open: Arc<AtomicUsize>,
    dials: Arc<Mutex<Vec<String>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, server: &str, response: &str) -> Self {
        self.responses
            .insert(server.to_string(), response.to_string());
        self
    }

    /// Hold each connection open this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn dials(&self) -> Vec<String> {
        self.dials.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WhoisDialer for ScriptedDialer {
    async fn dial(&self, server: &str, port: u16) -> io::Result<Box<dyn WhoisStream>> {
        assert_eq!(port, 43);
        self.dials.lock().unwrap().push(server.to_string());

        let Some(response) = self.responses.get(server).cloned() else {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{} refused", server),
            ));
        };

        let now_open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(now_open, Ordering::SeqCst);

        let (client, remote) = tokio::io::duplex(64 * 1024);
        let open = Arc::clone(&self.open);
        let queries = Arc::clone(&self.queries);
        let delay = self.delay;

        tokio::spawn(async move {
            let mut reader = BufReader::new(remote);
            let mut query = Vec::new();
            if reader.read_until(b'\n', &mut query).await.is_ok() {
                queries
                    .lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&query).into_owned());
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let _ = reader.get_mut().write_all(response.as_bytes()).await;
            open.fetch_sub(1, Ordering::SeqCst);
            // Dropping the stream closes it, which ends the client's read
        });

        Ok(Box::new(client))
    }
}

/// WHOIS client on the given dialer with its own full-size permit pool.
pub fn whois_client(dialer: Arc<ScriptedDialer>, config: &VerifyConfig) -> WhoisClient {
    WhoisClient::from_config(config)
        .with_dialer(dialer)
        .with_pool(Arc::new(Semaphore::new(WHOIS_MAX_CONCURRENT)))
}

/// Verifier wired to the doubles.
pub fn verifier(
    resolver: Arc<MockResolver>,
    dialer: Arc<ScriptedDialer>,
    config: VerifyConfig,
) -> DomainVerifier {
    let whois = whois_client(dialer, &config);
    DomainVerifier::from_parts(resolver, whois, config)
}
