//! TLD to WHOIS server mappings.
//!
//! The table covers the TLDs candidates most often land in. Anything else
//! falls back to `whois.nic.<tld>`, which most newer gTLD registries serve.

use crate::utils::extract_tld;
use std::collections::HashMap;

lazy_static::lazy_static! {
    static ref WHOIS_SERVERS: HashMap<&'static str, &'static str> = HashMap::from([
        // Generic TLDs
        ("com", "whois.verisign-grs.com"),
        ("net", "whois.verisign-grs.com"),
        ("org", "whois.pir.org"),
        ("info", "whois.afilias.net"),
        ("biz", "whois.biz"),
        ("xyz", "whois.nic.xyz"),
        // Google registry
        ("app", "whois.nic.google"),
        ("dev", "whois.nic.google"),
        // Popular ccTLDs used generically
        ("io", "whois.nic.io"),
        ("co", "whois.nic.co"),
        ("me", "whois.nic.me"),
        // Americas
        ("us", "whois.nic.us"),
        ("ca", "whois.cira.ca"),
        ("br", "whois.registro.br"),
        // Europe
        ("uk", "whois.nic.uk"),
        ("de", "whois.denic.de"),
        ("fr", "whois.nic.fr"),
        ("eu", "whois.eu"),
        ("ru", "whois.tcinet.ru"),
        ("nl", "whois.sidn.nl"),
        ("be", "whois.dns.be"),
        ("at", "whois.nic.at"),
        ("ch", "whois.nic.ch"),
        ("it", "whois.nic.it"),
        ("se", "whois.iis.se"),
        ("no", "whois.norid.no"),
        ("dk", "whois.dk-hostmaster.dk"),
        ("fi", "whois.fi"),
        ("pl", "whois.dns.pl"),
        ("cz", "whois.nic.cz"),
        // Asia-Pacific
        ("au", "whois.auda.org.au"),
        ("in", "whois.registry.in"),
        ("jp", "whois.jprs.jp"),
        ("kr", "whois.kr"),
        ("cn", "whois.cnnic.cn"),
        ("tw", "whois.twnic.net.tw"),
    ]);
}

/// Built-in WHOIS server for a TLD, if the table knows it.
pub fn get_whois_server(tld: &str) -> Option<&'static str> {
    WHOIS_SERVERS.get(tld.to_ascii_lowercase().as_str()).copied()
}

/// Resolve the WHOIS server to ask about `domain`.
///
/// Lookup order: caller overrides, the built-in table, then
/// `whois.nic.<tld>`. Override keys are expected lowercase.
pub fn whois_server_for(domain: &str, overrides: &HashMap<String, String>) -> String {
    let tld = extract_tld(domain);

    if let Some(server) = overrides.get(&tld) {
        return server.clone();
    }

    match get_whois_server(&tld) {
        Some(server) => server.to_string(),
        None => format!("whois.nic.{}", tld),
    }
}

/// Number of TLDs with a built-in server.
pub fn known_tld_count() -> usize {
    WHOIS_SERVERS.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_servers() {
        let none = HashMap::new();
        assert_eq!(whois_server_for("example.com", &none), "whois.verisign-grs.com");
        assert_eq!(whois_server_for("example.NET", &none), "whois.verisign-grs.com");
        assert_eq!(whois_server_for("sub.example.co", &none), "whois.nic.co");
        assert_eq!(whois_server_for("thing.dev", &none), "whois.nic.google");
        assert_eq!(known_tld_count(), 36);
    }

    #[test]
    fn test_unknown_tld_fallback() {
        let none = HashMap::new();
        assert_eq!(whois_server_for("example.shop", &none), "whois.nic.shop");
        assert!(get_whois_server("shop").is_none());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = HashMap::from([("com".to_string(), "whois.internal.test".to_string())]);
        assert_eq!(whois_server_for("example.com", &overrides), "whois.internal.test");
        assert_eq!(whois_server_for("example.org", &overrides), "whois.pir.org");
    }
}
