//! Error handling for domain verification operations.
//!
//! Most network failures are recovered inside the engine and turned into
//! "absent data". The variants below are what is left for callers: upstream
//! validation failures, cancellation, and the occasional raw protocol error
//! surfaced by the low-level WHOIS API.

use std::time::Duration;
use thiserror::Error;

/// Main error type for domain verification operations.
#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    /// Invalid domain name format (rejected before any network call)
    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    /// The shared cancellation token fired
    #[error("Operation cancelled")]
    Cancelled,

    /// The shared deadline elapsed
    #[error("Deadline exceeded during: {operation}")]
    DeadlineExceeded { operation: String },

    /// Network-related errors (DNS failure, connection refused, etc.)
    #[error("Network error: {message}{}", cause_suffix(.cause))]
    Network {
        message: String,
        cause: Option<String>,
    },

    /// WHOIS dial or write failure
    #[error("WHOIS error for '{server}': {message}")]
    Whois { server: String, message: String },

    /// WHOIS read failure; whatever was received before the failure is kept
    #[error("WHOIS read from '{server}' failed after {} bytes: {message}", .partial.len())]
    WhoisRead {
        server: String,
        message: String,
        partial: String,
    },

    /// Configuration errors (invalid settings, unparsable TOML, etc.)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File I/O errors when reading candidate lists or config files
    #[error("File error at '{path}': {message}")]
    File { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn cause_suffix(cause: &Option<String>) -> String {
    match cause {
        Some(cause) => format!(" (source: {})", cause),
        None => String::new(),
    }
}

impl VerifyError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new deadline error for the named operation.
    pub fn deadline<O: Into<String>>(operation: O) -> Self {
        Self::DeadlineExceeded {
            operation: operation.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::Network {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::Network {
            message: message.into(),
            cause: Some(source.into()),
        }
    }

    /// Create a new WHOIS dial/write error.
    pub fn whois<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::Whois {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new WHOIS read error carrying the partial response.
    pub fn whois_read<S: Into<String>, M: Into<String>>(
        server: S,
        message: M,
        partial: String,
    ) -> Self {
        Self::WhoisRead {
            server: server.into(),
            message: message.into(),
            partial,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors caused by the shared context (cancel or deadline).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded { .. })
    }

    /// Text received before a WHOIS read failure, if any.
    pub fn partial_response(&self) -> Option<&str> {
        match self {
            Self::WhoisRead { partial, .. } if !partial.is_empty() => Some(partial),
            _ => None,
        }
    }

    /// Short per-row status used in bulk reports.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded { .. } => "timeout",
            _ => "error",
        }
    }
}

impl From<toml::de::Error> for VerifyError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Failed to parse TOML configuration: {}", err))
    }
}

/// Human-readable rendering of a duration for timeout messages.
pub(crate) fn describe_duration(duration: Duration) -> String {
    if duration.as_secs() >= 60 && duration.as_secs() % 60 == 0 {
        format!("{}m", duration.as_secs() / 60)
    } else if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
