//! Parking detection from nameserver and address patterns.
//!
//! A parked domain points at an advertising or "for sale" placeholder run by
//! one of a handful of providers. Those providers are recognisable by the
//! nameservers they hand out and by the address blocks they serve from.
//!
//! Address matching is a plain string prefix on the dotted-quad form, not
//! CIDR containment. `"91.195.240."` matches `91.195.240.0/24` exactly, but
//! the table cannot express anything narrower or wider than an octet boundary.

/// Nameserver suffixes of known parking providers.
pub const PARKING_NAMESERVERS: &[&str] = &[
    "sedoparking.com",
    "bodis.com",
    "parkingcrew.net",
    "above.com",
    "pendingrenewaldeletion.com",
    "parklogic.com",
    "parkitonline.com",
    "domainparking.com",
    "hugedomains.com",
    "afternic.com",
    "undeveloped.com",
    "dan.com",
    "uniregistry.com",
    "domaincontrol.com",
    "registrar-servers.com",
];

/// IPv4 prefixes of known parking providers.
pub const PARKING_IP_PREFIXES: &[&str] = &[
    // Sedo
    "52.119.124.",
    // GoDaddy
    "34.102.136.",
    "184.168.131.",
    // Bodis
    "199.59.242.",
    "199.59.243.",
    // ParkingCrew
    "104.219.248.",
    "104.219.249.",
    // Sedoparking
    "91.195.240.",
    "91.195.241.",
    // Above.com
    "66.96.149.",
    // HugeDomains
    "65.55.72.",
    // Team Internet / ParkLogic
    "185.53.178.",
    "185.53.179.",
];

/// True if any nameserver or any IPv4 address belongs to a parking provider.
///
/// Nameservers are checked first and the scan stops at the first hit.
pub fn classify_parked<N, I>(ns_hosts: &[N], ipv4s: &[I]) -> bool
where
    N: AsRef<str>,
    I: AsRef<str>,
{
    ns_hosts.iter().any(|ns| is_parking_ns(ns.as_ref()))
        || ipv4s.iter().any(|ip| is_parking_ip(ip.as_ref()))
}

/// Case-insensitive suffix match against [`PARKING_NAMESERVERS`].
pub fn is_parking_ns(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    PARKING_NAMESERVERS
        .iter()
        .any(|suffix| host.ends_with(suffix))
}

/// String prefix match against [`PARKING_IP_PREFIXES`].
pub fn is_parking_ip(ip: &str) -> bool {
    PARKING_IP_PREFIXES
        .iter()
        .any(|prefix| ip.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn test_empty_inputs_are_not_parked() {
        assert!(!classify_parked(NONE, NONE));
    }

    #[test]
    fn test_parking_nameserver_case_insensitive() {
        assert!(classify_parked(&["NS1.SedoParking.com"], NONE));
        assert!(classify_parked(&["ns2.bodis.com."], NONE));
        assert!(!classify_parked(&["ns1.google.com"], NONE));
    }

    #[test]
    fn test_parking_ip_prefix() {
        assert!(classify_parked(NONE, &["91.195.240.123"]));
        assert!(classify_parked(NONE, &["8.8.8.8", "185.53.179.7"]));
        assert!(!classify_parked(NONE, &["93.184.216.34"]));
    }

    #[test]
    fn test_prefix_is_string_based() {
        // 91.195.240.x only; a neighbouring /24 is not covered
        assert!(!is_parking_ip("91.195.242.1"));
        assert!(is_parking_ip("66.96.149.200"));
    }

    #[test]
    fn test_adding_catalog_member_always_parks() {
        let benign_ns = ["ns1.example.net", "ns2.example.net"];
        let benign_ips = ["192.0.2.1", "198.51.100.7"];
        assert!(!classify_parked(&benign_ns, &benign_ips));

        for suffix in PARKING_NAMESERVERS {
            let mut ns: Vec<String> = benign_ns.iter().map(|s| s.to_string()).collect();
            ns.push(format!("ns1.{}", suffix));
            assert!(classify_parked(&ns, &benign_ips), "suffix {}", suffix);
        }

        for prefix in PARKING_IP_PREFIXES {
            let mut ips: Vec<String> = benign_ips.iter().map(|s| s.to_string()).collect();
            ips.push(format!("{}10", prefix));
            assert!(classify_parked(&benign_ns, &ips), "prefix {}", prefix);
        }
    }
}
