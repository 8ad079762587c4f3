//! Network protocol implementations used by the verifier.
//!
//! DNS answers delegation, address and mail questions; WHOIS answers the
//! ownership question; the registry table says which WHOIS server to ask.

/// DNS lookups (NS, A, MX)
pub mod dns;

/// WHOIS protocol client
pub mod whois;

/// TLD to WHOIS server mappings
pub mod registry;

pub use dns::{DnsResolver, SystemResolver};
pub use registry::{get_whois_server, whois_server_for};
pub use whois::{WhoisClient, WhoisDialer};
