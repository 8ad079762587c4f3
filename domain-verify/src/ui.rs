//! Terminal display logic for domain-verify.
//!
//! This module handles the table output, spinner animation, headers and
//! summaries. Uses only the `console` crate.

use console::{pad_str, style, Alignment, Term};
use domain_verify_lib::{Candidate, CheckOutcome, SkippedLine, VerifyConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
///
/// Shows `[done/total]` from a shared counter the caller bumps as checks finish.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a new spinner (e.g. "Checking 8 candidates...").
    pub fn start(message: String, done: Arc<AtomicUsize>, total: usize) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let progress = format!("[{}/{}]", done.load(Ordering::Relaxed), total);
                let _ = term.clear_line();
                let _ = term.write_str(&format!(
                    "{} {} {}",
                    style(frame).cyan(),
                    message,
                    style(progress).dim()
                ));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header on stderr at the start of a run.
pub fn print_header(selected: usize, available: usize, config: &VerifyConfig) {
    eprintln!(
        "{} {} {}",
        style("domain-verify").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Checking {} of {} candidate{}",
            selected,
            available,
            if available == 1 { "" } else { "s" }
        ))
        .dim(),
    );

    let mut meta_parts = vec![format!("Timeout: {}s", config.timeout.as_secs())];
    if !config.lookup_owner {
        meta_parts.push("WHOIS: off".to_string());
    }
    if !config.resolve_mx_ips {
        meta_parts.push("MX IPs: off".to_string());
    }
    eprintln!("{}", style(meta_parts.join(" | ")).dim());
    eprintln!();
}

/// Report candidate lines that were skipped while reading a file.
pub fn print_skipped(path: &str, skipped: &[SkippedLine]) {
    if skipped.is_empty() {
        return;
    }

    eprintln!(
        "{} {} invalid entr{} in {}:",
        style("Warning:").yellow().bold(),
        skipped.len(),
        if skipped.len() == 1 { "y" } else { "ies" },
        path
    );
    for entry in skipped.iter().take(5) {
        eprintln!("  Line {}: {}", entry.line, entry.reason);
    }
    if skipped.len() > 5 {
        eprintln!("  ... and {} more invalid entries", skipped.len() - 5);
    }
    eprintln!();
}

// ── Dry run ──────────────────────────────────────────────────────────────────

/// List the candidates that would be checked.
pub fn print_dry_run(candidates: &[Candidate]) {
    for (i, candidate) in candidates.iter().enumerate() {
        println!("{:>4}  {:<40} {:.3}", i + 1, candidate.name, candidate.rank);
    }
    eprintln!(
        "\n{}",
        style(format!(
            "{} candidate{} selected (dry run, nothing checked)",
            candidates.len(),
            if candidates.len() == 1 { "" } else { "s" }
        ))
        .dim()
    );
}

// ── Table ────────────────────────────────────────────────────────────────────

const DOMAIN_WIDTH: usize = 32;
const OWNER_WIDTH: usize = 28;

/// Print one row per outcome, in input order.
pub fn print_table(outcomes: &[CheckOutcome], debug: bool) {
    println!(
        "{:>4}  {}  {:<10}  {}  {:<3}  {:<3}  {}",
        "#",
        pad_str("DOMAIN", DOMAIN_WIDTH, Alignment::Left, None),
        "REGISTERED",
        pad_str("OWNER", OWNER_WIDTH, Alignment::Left, None),
        "A",
        "MX",
        "PARKED"
    );

    for (i, outcome) in outcomes.iter().enumerate() {
        let domain = pad_str(&outcome.candidate.name, DOMAIN_WIDTH, Alignment::Left, Some(".."));
        let registered = pad_str(registered_cell(outcome), 10, Alignment::Left, None);
        let owner = pad_str(owner_cell(outcome), OWNER_WIDTH, Alignment::Left, Some(".."));

        let registered = match registered_cell(outcome) {
            "yes" => style(registered).red().bold(),
            "no" => style(registered).green(),
            _ => style(registered).yellow(),
        };

        let (a, mx, parked) = match outcome.record() {
            Some(r) => (
                yes_no(r.has_a_records()),
                yes_no(r.has_mx_records()),
                yes_no(r.is_parked()),
            ),
            None => ("-", "-", "-"),
        };

        println!(
            "{:>4}  {}  {}  {}  {:<3}  {:<3}  {}",
            i + 1,
            domain,
            registered,
            style(owner).dim(),
            a,
            mx,
            if parked == "yes" {
                style(parked).magenta()
            } else {
                style(parked)
            }
        );

        if debug {
            if let Some(err) = outcome.error() {
                println!("      {}", style(err.to_string()).dim());
            }
        }
    }
}

/// Print the final summary bar with colored counts.
pub fn print_summary(outcomes: &[CheckOutcome], total: usize, duration: Duration) {
    let registered = outcomes
        .iter()
        .filter(|o| o.record().is_some_and(|r| r.is_registered()))
        .count();
    let parked = outcomes
        .iter()
        .filter(|o| o.record().is_some_and(|r| r.is_parked()))
        .count();
    let errors = outcomes.iter().filter(|o| o.error().is_some()).count();

    println!();
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {}/{} checked in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(outcomes.len()).bold(),
        total,
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} registered", registered)).red(),
        style("|").dim(),
        style(format!("{} parked", parked)).magenta(),
        style("|").dim(),
        style(format!("{} errors", errors)).yellow(),
    );
}

/// `yes`, `no`, or the error's status label.
fn registered_cell(outcome: &CheckOutcome) -> &'static str {
    match &outcome.result {
        Ok(record) => yes_no(record.is_registered()),
        Err(e) => e.status_label(),
    }
}

fn owner_cell(outcome: &CheckOutcome) -> &str {
    outcome.record().and_then(|r| r.owner()).unwrap_or("-")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
