//! Domain Verify CLI Application
//!
//! A command-line interface for verifying ranked candidate domains: whether
//! each one is registered, who owns it, whether it serves A/MX records and
//! whether it looks parked. This is a thin front end over domain-verify-lib.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::Term;
use domain_verify_lib::{
    check_top_with_progress, load_env_config, parse_candidates, parse_timeout_string,
    validate_domain, Candidate, CheckContext, CheckOutcome, ConfigManager, DomainVerifier,
    EnvConfig, FileConfig, VerifyConfig,
};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Number of top candidates checked when nothing else says otherwise.
const DEFAULT_LIMIT: usize = 100;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-verify
#[derive(Parser, Debug)]
#[command(name = "domain-verify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify ranked candidate domains: registration, owner, A/MX records, parking")]
#[command(
    long_about = "Verify ranked candidate domains using DNS and WHOIS.\n\nCandidates come from the command line or a file of `domain[,score]` lines. The highest-ranked candidates are checked concurrently and reported in rank order."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Candidate domains to check (fully qualified)
    #[arg(value_name = "DOMAINS", help_heading = "Candidate Selection")]
    pub domains: Vec<String>,

    /// Input file with ranked candidates (`domain[,score]` per line)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Candidate Selection"
    )]
    pub file: Option<String>,

    /// Number of top-ranked candidates to check (default: 100)
    #[arg(
        short = 'n',
        long = "limit",
        value_name = "N",
        help_heading = "Candidate Selection"
    )]
    pub limit: Option<usize>,

    /// List the candidates that would be checked, without checking them
    #[arg(long = "dry-run", help_heading = "Candidate Selection")]
    pub dry_run: bool,

    /// Overall deadline for the whole run (e.g. 30s, 2m)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Checks")]
    pub timeout: Option<String>,

    /// Skip the WHOIS owner lookup
    #[arg(long = "no-whois", help_heading = "Checks")]
    pub no_whois: bool,

    /// Do not resolve mail exchanger hosts to IP addresses
    #[arg(long = "no-mx-ips", help_heading = "Checks")]
    pub no_mx_ips: bool,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show error details under each failed row
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Everything a run needs once files, environment and flags are folded together.
#[derive(Debug, Clone)]
struct Settings {
    limit: usize,
    json: bool,
    verify: VerifyConfig,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_logging(args.verbose, args.debug);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: bool, debug: bool) {
    let default_filter = if debug {
        "domain_verify=trace"
    } else if verbose {
        "domain_verify=debug"
    } else {
        "domain_verify=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.domains.is_empty() && args.file.is_none() {
        return Err("You must specify candidate domains or a file with --file".to_string());
    }

    if args.limit == Some(0) {
        return Err("Limit must be at least 1".to_string());
    }

    if let Some(timeout) = &args.timeout {
        if !parse_timeout_string(timeout).is_some_and(|d| !d.is_zero()) {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let settings = build_settings(&args, &env_config)?;

    let mut candidates = collect_candidates(&args)?;
    if candidates.is_empty() {
        return Err("No valid candidates to check".into());
    }
    rank_candidates(&mut candidates);

    let selected = settings.limit.min(candidates.len());
    debug!(
        "Selected {} of {} candidates (limit {})",
        selected,
        candidates.len(),
        settings.limit
    );

    if args.dry_run {
        ui::print_dry_run(&candidates[..selected]);
        return Ok(());
    }

    let verifier = DomainVerifier::with_config(settings.verify.clone());
    let ctx = CheckContext::with_timeout(settings.verify.timeout);

    // Ctrl-C cancels the run; finished rows are still reported
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining checks");
            interrupt.cancel();
        }
    });

    let interactive = !settings.json && Term::stderr().is_term();
    if !settings.json {
        ui::print_header(selected, candidates.len(), &settings.verify);
    }

    let done = Arc::new(AtomicUsize::new(0));
    let spinner = interactive.then(|| {
        ui::Spinner::start(
            format!("Checking {} candidates...", selected),
            Arc::clone(&done),
            selected,
        )
    });

    let started = Instant::now();
    let outcomes = check_top_with_progress(&verifier, &ctx, &candidates, settings.limit, |_| {
        done.fetch_add(1, Ordering::Relaxed);
    })
    .await;
    let elapsed = started.elapsed();

    if let Some(spinner) = spinner {
        spinner.stop().await;
    }

    display_results(&outcomes, &settings, args.debug, elapsed)?;
    Ok(())
}

/// Fold configuration sources together.
///
/// Precedence, lowest first: built-in defaults, config file (explicit
/// `--config`, then `DV_CONFIG`, then discovery), `DV_*` environment, flags.
fn build_settings(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let file_config = load_file_config(args, env_config)?;

    let mut settings = Settings {
        limit: DEFAULT_LIMIT,
        json: false,
        verify: file_config.apply_to(VerifyConfig::default()),
    };

    if let Some(defaults) = &file_config.defaults {
        if let Some(limit) = defaults.limit {
            settings.limit = limit;
        }
        if let Some(json) = defaults.json {
            settings.json = json;
        }
    }

    apply_environment_config(&mut settings, env_config);
    apply_cli_args(&mut settings, args);

    Ok(settings)
}

fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();

    let explicit = args
        .config
        .as_deref()
        .map(|p| (p, "--config"))
        .or_else(|| env_config.config.as_deref().map(|p| (p, "DV_CONFIG")));

    let file_config = if let Some((path, source)) = explicit {
        debug!("Using explicit config file ({}): {}", source, path);
        config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
    } else {
        debug!("Discovering config files...");
        config_manager.discover_and_load()?
    };

    config_manager.validate_config(&file_config)?;
    Ok(file_config)
}

/// Apply `DV_*` environment values. Invalid ones were already dropped with a warning.
fn apply_environment_config(settings: &mut Settings, env_config: &EnvConfig) {
    if let Some(limit) = env_config.limit {
        settings.limit = limit;
    }
    if let Some(timeout) = env_config.timeout.as_deref().and_then(parse_timeout_string) {
        settings.verify.timeout = timeout;
    }
    if let Some(whois) = env_config.whois {
        settings.verify.lookup_owner = whois;
    }
    if let Some(mx_ips) = env_config.mx_ips {
        settings.verify.resolve_mx_ips = mx_ips;
    }
    if let Some(json) = env_config.json {
        settings.json = json;
    }
}

/// Apply CLI arguments (highest precedence).
///
/// Boolean flags only ever switch things on or off explicitly; leaving a flag
/// out keeps whatever the file or environment chose.
fn apply_cli_args(settings: &mut Settings, args: &Args) {
    if let Some(limit) = args.limit {
        settings.limit = limit;
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_timeout_string) {
        settings.verify.timeout = timeout;
    }
    if args.no_whois {
        settings.verify.lookup_owner = false;
    }
    if args.no_mx_ips {
        settings.verify.resolve_mx_ips = false;
    }
    if args.json {
        settings.json = true;
    }
}

/// Gather candidates from positional arguments and the input file.
///
/// Positional domains have rank 0. File lines that fail to parse are
/// reported and skipped; an invalid positional domain is an error.
fn collect_candidates(args: &Args) -> Result<Vec<Candidate>, Box<dyn std::error::Error>> {
    let mut candidates = Vec::new();

    for raw in &args.domains {
        let name = validate_domain(raw)?;
        candidates.push(Candidate::new(name, 0.0));
    }

    if let Some(path) = &args.file {
        candidates.extend(read_candidates_from_file(path)?);
    }

    Ok(candidates)
}

fn read_candidates_from_file(file_path: &str) -> Result<Vec<Candidate>, Box<dyn std::error::Error>> {
    let path = std::path::Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {}", file_path).into());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", file_path, e))?;
    let (candidates, skipped) = parse_candidates(&content);

    ui::print_skipped(file_path, &skipped);

    if candidates.is_empty() {
        return Err(format!("No valid candidates found in {}", file_path).into());
    }

    debug!("Read {} candidates from {}", candidates.len(), file_path);
    Ok(candidates)
}

/// Highest rank first. Ties keep their input order.
fn rank_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.rank.total_cmp(&a.rank));
}

fn display_results(
    outcomes: &[CheckOutcome],
    settings: &Settings,
    debug: bool,
    elapsed: std::time::Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    if settings.json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
    } else {
        ui::print_table(outcomes, debug);
        ui::print_summary(outcomes, outcomes.len(), elapsed);
    }
    Ok(())
}
