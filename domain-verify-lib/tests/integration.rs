// domain-verify-lib/tests/integration.rs

//! Integration tests for domain-verify-lib exports and core functionality

use domain_verify_lib::parking::{PARKING_IP_PREFIXES, PARKING_NAMESERVERS};
use domain_verify_lib::protocols::registry::whois_server_for;
use domain_verify_lib::{
    classify_parked, extract_owner, extract_referral_server, extract_tld, info, parse_candidates,
    validate_domain, Candidate, CheckContext, DomainVerifier, VerificationRecord,
    WHOIS_MAX_CONCURRENT,
};
use std::collections::HashMap;
use std::time::Duration;

#[test]
fn test_library_info() {
    let info = info();
    assert!(!info.version.is_empty());
    assert_eq!(info.whois_max_concurrent, 5);
    assert_eq!(WHOIS_MAX_CONCURRENT, 5);
    assert_eq!(info.known_whois_tlds, 36);
}

#[test]
fn test_parking_catalogs_exported() {
    assert_eq!(PARKING_NAMESERVERS.len(), 15);
    assert_eq!(PARKING_IP_PREFIXES.len(), 13);
    assert!(PARKING_IP_PREFIXES.iter().all(|p| p.ends_with('.')));

    let none: &[&str] = &[];
    assert!(classify_parked(&["ns1.parkingcrew.net"], none));
    assert!(!classify_parked(none, none));
}

#[test]
fn test_referral_then_owner_chain() {
    let registry = "Registrar WHOIS Server: whois.example-registrar.com\n";
    let registrar = "Registrant Organization: Acme Corp\n";

    assert_eq!(
        extract_referral_server(registry).as_deref(),
        Some("whois.example-registrar.com")
    );
    assert_eq!(extract_owner(registry), None);
    assert_eq!(extract_owner(registrar).as_deref(), Some("Acme Corp"));
}

#[test]
fn test_whois_server_table() {
    let none = HashMap::new();
    assert_eq!(whois_server_for("example.de", &none), "whois.denic.de");
    assert_eq!(whois_server_for("example.tw", &none), "whois.twnic.net.tw");
    assert_eq!(whois_server_for("example.museum", &none), "whois.nic.museum");
}

#[test]
fn test_input_helpers() {
    assert_eq!(validate_domain("Example.COM").unwrap(), "example.com");
    assert_eq!(extract_tld("www.example.co.uk"), "uk");

    let (candidates, skipped) = parse_candidates("g00gle.com,0.9\ngo0gle.com 0.8\n");
    assert_eq!(
        candidates,
        vec![Candidate::new("g00gle.com", 0.9), Candidate::new("go0gle.com", 0.8)]
    );
    assert!(skipped.is_empty());
}

#[test]
fn test_record_always_serializes_flags() {
    let json = serde_json::to_string(&VerificationRecord::unregistered("g00gle.com")).unwrap();
    assert_eq!(
        json,
        r#"{"domain":"g00gle.com","isRegistered":false,"hasARecords":false,"hasMXRecords":false,"isParked":false}"#
    );
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_verify_live_domain() {
    let verifier = DomainVerifier::new();
    let ctx = CheckContext::with_timeout(Duration::from_secs(60));

    let record = verifier.verify(&ctx, "google.com").await.unwrap();
    assert!(record.is_registered());
    assert!(record.has_a_records());
    assert!(record.has_mx_records());

    let missing = verifier
        .verify(&ctx, "this-domain-should-not-exist-98765.com")
        .await
        .unwrap();
    assert!(!missing.is_registered());
}
