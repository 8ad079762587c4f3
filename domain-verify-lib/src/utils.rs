//! Utility functions for domain processing and validation.
//!
//! The engine itself assumes canonical FQDNs. These helpers are for callers
//! that need to get there: normalising user input, extracting the TLD, and
//! reading ranked candidate lists from text.

use crate::error::VerifyError;
use crate::types::Candidate;

/// Normalise and validate a domain name.
///
/// Trims whitespace, lowercases, and drops a single trailing root dot.
/// Returns the canonical form, or an `InvalidDomain` error.
///
/// # Examples
///
/// ```rust
/// use domain_verify_lib::validate_domain;
///
/// assert_eq!(validate_domain(" Example.COM. ").unwrap(), "example.com");
/// assert!(validate_domain("https://example.com").is_err());
/// ```
pub fn validate_domain(domain: &str) -> Result<String, VerifyError> {
    let trimmed = domain.trim();

    if trimmed.is_empty() {
        return Err(VerifyError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    let canonical = trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    if canonical.contains("://") {
        return Err(VerifyError::invalid_domain(
            domain,
            "Expected a bare domain name, not a URL",
        ));
    }

    if !is_valid_fqdn(&canonical) {
        return Err(VerifyError::invalid_domain(
            domain,
            "Not a well-formed fully qualified domain name",
        ));
    }

    Ok(canonical)
}

/// Extract the top-level label, lowercased.
///
/// A name without dots is returned whole. Multi-level public suffixes such
/// as `co.uk` are not special-cased; WHOIS for those is served per last label.
pub fn extract_tld(domain: &str) -> String {
    let domain = domain.trim_end_matches('.');
    match domain.rfind('.') {
        Some(idx) => domain[idx + 1..].to_ascii_lowercase(),
        None => domain.to_ascii_lowercase(),
    }
}

/// Validate that an FQDN has basic valid structure.
pub fn is_valid_fqdn(domain: &str) -> bool {
    if domain.len() < 4 || domain.len() > 253 {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    for part in domain.split('.') {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        // Cannot start or end with hyphen
        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }

        if !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}

/// A candidate list line that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub reason: String,
}

/// Parse a ranked candidate list.
///
/// One candidate per line, as `name`, `name,score` or `name score`.
/// Blank lines and `#` comments are ignored. Lines with an invalid domain or
/// score are returned in the second vector instead of failing the whole list.
/// Names without a score get rank `0.0`. Input order is preserved.
pub fn parse_candidates(content: &str) -> (Vec<Candidate>, Vec<SkippedLine>) {
    let mut candidates = Vec::new();
    let mut skipped = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();

        if line.is_empty() {
            continue;
        }

        match parse_candidate_line(line) {
            Ok(candidate) => candidates.push(candidate),
            Err(reason) => skipped.push(SkippedLine {
                line: idx + 1,
                reason,
            }),
        }
    }

    (candidates, skipped)
}

fn parse_candidate_line(line: &str) -> Result<Candidate, String> {
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());

    let name = parts.next().ok_or_else(|| "missing domain".to_string())?;
    let name = validate_domain(name).map_err(|e| e.to_string())?;

    let rank = match parts.next() {
        Some(score) => score
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite())
            .ok_or_else(|| format!("invalid score '{}'", score))?,
        None => 0.0,
    };

    if let Some(extra) = parts.next() {
        return Err(format!("unexpected trailing field '{}'", extra));
    }

    Ok(Candidate::new(name, rank))
}
