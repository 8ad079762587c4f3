//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and the `DV_*`
//! environment variables, and merging them with proper precedence rules.
//!
//! ```toml
//! [defaults]
//! limit = 50
//! timeout = "2m"
//! whois = true
//! mx_ips = false
//! json = false
//!
//! [whois]
//! fallback_timeout = "10s"
//! referral_fields = ["Registrar Whois"]
//!
//! [whois.servers]
//! io = "whois.nic.io"
//! ```

use crate::error::VerifyError;
use crate::types::VerifyConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// WHOIS server and parsing settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisFileConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Number of top candidates to check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Overall deadline (as string, e.g., "30s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Look up owners over WHOIS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<bool>,

    /// Resolve MX hosts to addresses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mx_ips: Option<bool>,

    /// Emit JSON instead of a table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

/// `[whois]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WhoisFileConfig {
    /// TLD -> server overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<HashMap<String, String>>,

    /// Extra referral labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_fields: Option<Vec<String>>,

    /// Deadline for WHOIS when no overall deadline applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_timeout: Option<String>,
}

impl FileConfig {
    /// Fold this file configuration into a runtime configuration.
    ///
    /// Only settings present in the file are applied. Server overrides and
    /// referral labels are added to whatever `config` already has.
    pub fn apply_to(&self, mut config: VerifyConfig) -> VerifyConfig {
        if let Some(defaults) = &self.defaults {
            if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
                config.timeout = timeout;
            }
            if let Some(whois) = defaults.whois {
                config.lookup_owner = whois;
            }
            if let Some(mx_ips) = defaults.mx_ips {
                config.resolve_mx_ips = mx_ips;
            }
        }

        if let Some(whois) = &self.whois {
            if let Some(servers) = &whois.servers {
                for (tld, server) in servers {
                    config
                        .whois_servers
                        .insert(tld.to_ascii_lowercase(), server.clone());
                }
            }
            if let Some(fields) = &whois.referral_fields {
                config.referral_fields.extend(fields.iter().cloned());
            }
            if let Some(timeout) = whois
                .fallback_timeout
                .as_deref()
                .and_then(parse_timeout_string)
            {
                config.whois_fallback_timeout = timeout;
            }
        }

        config
    }
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    home: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    working_dir: PathBuf,
}

impl ConfigManager {
    /// Create a manager that searches the usual locations for this process.
    pub fn new() -> Self {
        Self {
            home: env::var_os("HOME").map(PathBuf::from),
            xdg_config_home: env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            working_dir: PathBuf::from("."),
        }
    }

    /// Create a manager rooted at explicit directories.
    pub fn with_dirs<P: Into<PathBuf>>(home: Option<P>, working_dir: P) -> Self {
        Self {
            home: home.map(Into::into),
            xdg_config_home: None,
            working_dir: working_dir.into(),
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if reading, parsing or
    /// validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, VerifyError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(VerifyError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            VerifyError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config < home config < working directory config. A file that
    /// exists but fails to load is skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, VerifyError> {
        let mut merged = FileConfig::default();

        let discovered = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in discovered.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => merged = self.merge_configs(merged, config),
                Err(e) => warn!("Ignoring configuration {}: {}", path.display(), e),
            }
        }

        Ok(merged)
    }

    /// Looks for configuration files in the working directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["domain-verify.toml", ".domain-verify.toml"]
            .iter()
            .map(|name| self.working_dir.join(name))
            .find(|path| path.exists())
    }

    /// Looks for configuration files in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = self.home.as_ref()?;
        [".domain-verify.toml", "domain-verify.toml"]
            .iter()
            .map(|name| home.join(name))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = self
            .xdg_config_home
            .clone()
            .or_else(|| self.home.as_ref().map(|home| home.join(".config")))?;

        let path = config_dir.join("domain-verify").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`, field
    /// by field. Server tables are merged, with `higher` winning per TLD.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.limit.is_some() {
                        lower_defaults.limit = higher_defaults.limit;
                    }
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.whois.is_some() {
                        lower_defaults.whois = higher_defaults.whois;
                    }
                    if higher_defaults.mx_ips.is_some() {
                        lower_defaults.mx_ips = higher_defaults.mx_ips;
                    }
                    if higher_defaults.json.is_some() {
                        lower_defaults.json = higher_defaults.json;
                    }
                    Some(lower_defaults)
                }
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            whois: match (lower.whois, higher.whois) {
                (Some(mut lower_whois), Some(higher_whois)) => {
                    lower_whois.servers = match (lower_whois.servers, higher_whois.servers) {
                        (Some(mut lower_servers), Some(higher_servers)) => {
                            lower_servers.extend(higher_servers);
                            Some(lower_servers)
                        }
                        (lower_servers, higher_servers) => higher_servers.or(lower_servers),
                    };
                    if higher_whois.referral_fields.is_some() {
                        lower_whois.referral_fields = higher_whois.referral_fields;
                    }
                    if higher_whois.fallback_timeout.is_some() {
                        lower_whois.fallback_timeout = higher_whois.fallback_timeout;
                    }
                    Some(lower_whois)
                }
                (lower_whois, higher_whois) => higher_whois.or(lower_whois),
            },
        }
    }

    /// Validate a configuration for common issues.
    pub fn validate_config(&self, config: &FileConfig) -> Result<(), VerifyError> {
        if let Some(defaults) = &config.defaults {
            if defaults.limit == Some(0) {
                return Err(VerifyError::config("limit must be at least 1"));
            }

            if let Some(timeout_str) = &defaults.timeout {
                validate_timeout("timeout", timeout_str)?;
            }
        }

        if let Some(whois) = &config.whois {
            if let Some(timeout_str) = &whois.fallback_timeout {
                validate_timeout("whois.fallback_timeout", timeout_str)?;
            }

            if let Some(servers) = &whois.servers {
                for (tld, server) in servers {
                    if tld.is_empty() || tld.contains('.') || tld.contains(' ') {
                        return Err(VerifyError::config(format!(
                            "Invalid TLD '{}' in [whois.servers]",
                            tld
                        )));
                    }
                    if server.trim().is_empty() || server.contains(char::is_whitespace) {
                        return Err(VerifyError::config(format!(
                            "Invalid WHOIS server '{}' for TLD '{}'",
                            server, tld
                        )));
                    }
                }
            }

            if let Some(fields) = &whois.referral_fields {
                if fields.iter().any(|f| f.trim().trim_end_matches(':').is_empty()) {
                    return Err(VerifyError::config("Referral field labels cannot be empty"));
                }
            }
        }

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_timeout(key: &str, value: &str) -> Result<(), VerifyError> {
    match parse_timeout_string(value) {
        Some(d) if !d.is_zero() => Ok(()),
        _ => Err(VerifyError::config(format!(
            "Invalid {} '{}'. Use format like '5s', '30s', '2m'",
            key, value
        ))),
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via `DV_*`
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub limit: Option<usize>,
    pub timeout: Option<String>,
    pub whois: Option<bool>,
    pub mx_ips: Option<bool>,
    pub json: Option<bool>,
    pub config: Option<String>,
}

/// Load configuration from environment variables.
///
/// Parses the `DV_*` variables. Invalid values are logged as warnings and
/// ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_from(|key| env::var(key).ok())
}

fn load_env_from<F>(get: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    // DV_LIMIT - number of top candidates
    if let Some(val) = get("DV_LIMIT") {
        match val.trim().parse::<usize>() {
            Ok(limit) if limit > 0 => {
                debug!("Using DV_LIMIT={}", limit);
                env_config.limit = Some(limit);
            }
            _ => warn!("Invalid DV_LIMIT='{}', must be a positive integer", val),
        }
    }

    // DV_TIMEOUT - overall deadline
    if let Some(val) = get("DV_TIMEOUT") {
        if parse_timeout_string(&val).is_some_and(|d| !d.is_zero()) {
            debug!("Using DV_TIMEOUT={}", val);
            env_config.timeout = Some(val);
        } else {
            warn!(
                "Invalid DV_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                val
            );
        }
    }

    env_config.whois = env_flag(&get, "DV_WHOIS");
    env_config.mx_ips = env_flag(&get, "DV_MX_IPS");
    env_config.json = env_flag(&get, "DV_JSON");

    // DV_CONFIG - explicit config file
    if let Some(path) = get("DV_CONFIG") {
        if !path.trim().is_empty() {
            debug!("Using DV_CONFIG={}", path);
            env_config.config = Some(path);
        }
    }

    env_config
}

fn env_flag<F>(get: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let val = get(key)?;
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            warn!("Invalid {}='{}', use true/false", key, val);
            None
        }
    }
}

/// Parse a timeout like `"5s"`, `"2m"` or a bare number of seconds.
///
/// # Returns
///
/// The duration, or None if parsing fails.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let seconds = if let Some(ms) = timeout_str.strip_suffix("ms") {
        return ms.parse::<u64>().ok().map(Duration::from_millis);
    } else if let Some(s) = timeout_str.strip_suffix('s') {
        s.parse::<u64>().ok()
    } else if let Some(m) = timeout_str.strip_suffix('m') {
        m.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        // Assume seconds if no unit
        timeout_str.parse::<u64>().ok()
    };

    seconds.map(Duration::from_secs)
}
