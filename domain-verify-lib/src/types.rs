//! Core data types for domain verification.
//!
//! This module defines the verification record produced per domain, the
//! candidate input consumed by bulk checks, the per-candidate bulk outcome,
//! and the runtime configuration.

use crate::error::VerifyError;
use crate::parking::classify_parked;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::time::Duration;

/// Result of verifying a single domain.
///
/// Records are built only through [`VerificationRecord::unregistered`] and
/// [`VerificationRecord::registered`], which keep the derived flags honest:
/// `has_a_records` mirrors `a_records`, `has_mx_records` mirrors `mx_records`,
/// `is_parked` is computed from nameservers and A records, and an
/// unregistered domain never carries dependent data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationRecord {
    /// Canonical FQDN that was checked
    domain: String,

    /// True iff the domain has at least one NS record
    #[serde(rename = "isRegistered")]
    is_registered: bool,

    /// Best-effort registrant name or organization from WHOIS
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,

    /// Authoritative nameserver hosts (no trailing dot)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nameservers: Vec<String>,

    #[serde(rename = "hasARecords")]
    has_a_records: bool,

    /// IPv4 addresses in resolution order
    #[serde(rename = "aRecords", skip_serializing_if = "Vec::is_empty")]
    a_records: Vec<String>,

    #[serde(rename = "hasMXRecords")]
    has_mx_records: bool,

    /// Mail exchangers sorted ascending by preference
    #[serde(rename = "mxRecords", skip_serializing_if = "Vec::is_empty")]
    mx_records: Vec<MxRecord>,

    #[serde(rename = "isParked")]
    is_parked: bool,
}

impl VerificationRecord {
    /// Record for a domain without delegation: every dependent signal is empty.
    pub fn unregistered<D: Into<String>>(domain: D) -> Self {
        Self {
            domain: domain.into(),
            is_registered: false,
            owner: None,
            nameservers: Vec::new(),
            has_a_records: false,
            a_records: Vec::new(),
            has_mx_records: false,
            mx_records: Vec::new(),
            is_parked: false,
        }
    }

    /// Record for a delegated domain.
    ///
    /// Falls back to [`VerificationRecord::unregistered`] when `nameservers`
    /// is empty, since NS presence is the only source of truth for delegation.
    /// MX records are stably sorted by preference so ties keep resolution order.
    pub fn registered<D: Into<String>>(
        domain: D,
        nameservers: Vec<String>,
        owner: Option<String>,
        a_records: Vec<String>,
        mut mx_records: Vec<MxRecord>,
    ) -> Self {
        if nameservers.is_empty() {
            return Self::unregistered(domain);
        }

        mx_records.sort_by_key(|mx| mx.preference);
        let is_parked = classify_parked(&nameservers, &a_records);
        let owner = owner.filter(|o| !o.trim().is_empty());

        Self {
            domain: domain.into(),
            is_registered: true,
            owner,
            has_a_records: !a_records.is_empty(),
            has_mx_records: !mx_records.is_empty(),
            nameservers,
            a_records,
            mx_records,
            is_parked,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_registered(&self) -> bool {
        self.is_registered
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn nameservers(&self) -> &[String] {
        &self.nameservers
    }

    pub fn has_a_records(&self) -> bool {
        self.has_a_records
    }

    pub fn a_records(&self) -> &[String] {
        &self.a_records
    }

    pub fn has_mx_records(&self) -> bool {
        self.has_mx_records
    }

    pub fn mx_records(&self) -> &[MxRecord] {
        &self.mx_records
    }

    pub fn is_parked(&self) -> bool {
        self.is_parked
    }
}

/// A mail exchanger for a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MxRecord {
    /// Exchange hostname without trailing dot
    pub host: String,

    /// Lower values are preferred
    pub preference: u16,

    /// IPv4 addresses the exchange host resolves to
    #[serde(rename = "resolvedIPs", skip_serializing_if = "Vec::is_empty")]
    pub resolved_ips: Vec<String>,
}

impl MxRecord {
    pub fn new<H: AsRef<str>>(host: H, preference: u16) -> Self {
        Self {
            host: host.as_ref().trim_end_matches('.').to_string(),
            preference,
            resolved_ips: Vec::new(),
        }
    }
}

/// A ranked candidate domain handed over by a generator.
///
/// The coordinator treats candidates as read-only and assumes they are
/// already well-formed FQDNs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: String,
    pub rank: f64,
}

impl Candidate {
    pub fn new<N: Into<String>>(name: N, rank: f64) -> Self {
        Self {
            name: name.into(),
            rank,
        }
    }
}

impl From<&str> for Candidate {
    fn from(name: &str) -> Self {
        Self::new(name, 0.0)
    }
}

impl From<String> for Candidate {
    fn from(name: String) -> Self {
        Self::new(name, 0.0)
    }
}

/// One bulk-check row: the candidate and what happened to it.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub candidate: Candidate,
    pub result: Result<VerificationRecord, VerifyError>,
}

impl CheckOutcome {
    pub fn new(candidate: Candidate, result: Result<VerificationRecord, VerifyError>) -> Self {
        Self { candidate, result }
    }

    /// `"ok"` for a produced record, otherwise the error's status label.
    pub fn status(&self) -> &'static str {
        match &self.result {
            Ok(_) => "ok",
            Err(e) => e.status_label(),
        }
    }

    pub fn record(&self) -> Option<&VerificationRecord> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&VerifyError> {
        self.result.as_ref().err()
    }
}

impl Serialize for CheckOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CheckOutcome", 5)?;
        state.serialize_field("domain", &self.candidate.name)?;
        state.serialize_field("rank", &self.candidate.rank)?;
        state.serialize_field("status", self.status())?;
        match &self.result {
            Ok(record) => {
                state.serialize_field("record", record)?;
                state.skip_field("error")?;
            }
            Err(e) => {
                state.skip_field("record")?;
                state.serialize_field("error", &e.to_string())?;
            }
        }
        state.end()
    }
}

/// Runtime configuration for the verification engine.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Overall deadline for a bulk run (callers build their context from it)
    /// Default: 2 minutes
    pub timeout: Duration,

    /// WHOIS deadline used when the context carries none
    /// Default: 10 seconds
    pub whois_fallback_timeout: Duration,

    /// TCP port WHOIS servers listen on
    /// Default: 43
    pub whois_port: u16,

    /// Whether to query WHOIS for the registrant
    /// Default: true
    pub lookup_owner: bool,

    /// Whether to resolve MX exchange hosts to IPv4 addresses
    /// Default: true
    pub resolve_mx_ips: bool,

    /// TLD -> WHOIS server overrides consulted before the built-in table
    pub whois_servers: HashMap<String, String>,

    /// Extra referral labels recognised after the built-in ones
    pub referral_fields: Vec<String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            whois_fallback_timeout: Duration::from_secs(10),
            whois_port: 43,
            lookup_owner: true,
            resolve_mx_ips: true,
            whois_servers: HashMap::new(),
            referral_fields: Vec::new(),
        }
    }
}

impl VerifyConfig {
    /// Set the overall bulk deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the WHOIS fallback deadline.
    pub fn with_whois_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.whois_fallback_timeout = timeout;
        self
    }

    /// Enable or disable WHOIS owner lookups.
    pub fn with_owner_lookup(mut self, enabled: bool) -> Self {
        self.lookup_owner = enabled;
        self
    }

    /// Enable or disable MX host resolution.
    pub fn with_mx_resolution(mut self, enabled: bool) -> Self {
        self.resolve_mx_ips = enabled;
        self
    }

    /// Override the WHOIS server for a TLD.
    pub fn with_whois_server<T: AsRef<str>, S: Into<String>>(mut self, tld: T, server: S) -> Self {
        self.whois_servers
            .insert(tld.as_ref().to_ascii_lowercase(), server.into());
        self
    }

    /// Recognise an additional referral label such as `"Registrar URL"`.
    pub fn with_referral_field<F: Into<String>>(mut self, field: F) -> Self {
        self.referral_fields.push(field.into());
        self
    }
}
