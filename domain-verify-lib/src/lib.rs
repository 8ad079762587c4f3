//! # Domain Verify Library
//!
//! Concurrent verification of candidate domain names: is the name delegated,
//! who appears to own it, does it serve web or mail, and is it parked.
//!
//! Registration is read from NS records. Owners come from WHOIS, following a
//! referral to the registrar when the registry points at one. Parking is
//! detected from well-known provider nameservers and address blocks. Every
//! network step is bounded by a shared [`CheckContext`], and all WHOIS traffic
//! in the process shares a pool of five connections.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_verify_lib::{check_top, Candidate, CheckContext, DomainVerifier};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let verifier = DomainVerifier::new();
//!     let ctx = CheckContext::with_timeout(Duration::from_secs(120));
//!     let candidates = vec![
//!         Candidate::new("g00gle.com", 0.92),
//!         Candidate::new("go0gle.com", 0.87),
//!     ];
//!
//!     for outcome in check_top(&verifier, &ctx, &candidates, 10).await {
//!         match &outcome.result {
//!             Ok(record) => println!("{}: registered={}", record.domain(), record.is_registered()),
//!             Err(e) => println!("{}: {}", outcome.candidate.name, e),
//!         }
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - **Delegation check**: NS presence is the single source of truth
//! - **WHOIS owners**: raw port-43 client with referral chasing and redaction handling
//! - **Parking detection**: nameserver suffix and address prefix catalogs
//! - **Bulk checks**: one task per candidate, results in input order
//! - **Configurable**: TOML files and `DV_*` environment variables

// Re-export main public API types and functions
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    WhoisFileConfig,
};
pub use context::CheckContext;
pub use coordinator::{check_top, check_top_with_progress};
pub use error::VerifyError;
pub use parking::classify_parked;
pub use protocols::dns::{DnsResolver, SystemResolver};
pub use protocols::whois::{
    extract_owner, extract_referral_server, TcpDialer, WhoisClient, WhoisDialer, WhoisStream,
    WHOIS_MAX_CONCURRENT,
};
pub use types::{Candidate, CheckOutcome, MxRecord, VerificationRecord, VerifyConfig};
pub use utils::{extract_tld, parse_candidates, validate_domain, SkippedLine};
pub use verifier::DomainVerifier;

// Public modules
pub mod parking;
pub mod protocols;

// Internal modules - these are not part of the public API
mod config;
mod context;
mod coordinator;
mod error;
mod types;
mod utils;
mod verifier;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VerifyError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        whois_max_concurrent: WHOIS_MAX_CONCURRENT,
        known_whois_tlds: protocols::registry::known_tld_count(),
    }
}

/// Information about the library build
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub whois_max_concurrent: usize,
    pub known_whois_tlds: usize,
}
