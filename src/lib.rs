//! Sumi-Navigator: navigation and response classification for web scraping
//!
//! This crate drives a single logical browsing session: it navigates to URLs,
//! keeps the last retrieved document, and classifies the outcome of the last
//! response (success, temporary failure, permanent failure, gone, redirect)
//! so a crawl loop can decide whether to re-enqueue, follow, or abandon a target.

pub mod classify;
pub mod config;
pub mod document;
pub mod session;
pub mod transport;

use thiserror::Error;

/// Main error type for Sumi-Navigator operations
#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("No response available: navigate before querying the session")]
    PrematureAccess,

    #[error("Link not found in current document: {needle}")]
    LinkNotFound { needle: String },

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    #[error("Asset request to {url} returned HTTP {status}")]
    AssetStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl NavigatorError {
    /// Returns true if the request never produced a usable response
    ///
    /// These errors carry no status code and must not be read as a
    /// server-side verdict.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Timeout { .. }
                | Self::RedirectLimit { .. }
                | Self::RedirectLoop { .. }
                | Self::MalformedResponse { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sumi-Navigator operations
pub type Result<T> = std::result::Result<T, NavigatorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::{RedirectKind, StatusRange, Verdict, TRANSIENT_STATUS_CODES};
pub use config::Config;
pub use document::{Document, Link};
pub use session::{NavigationRecord, NavigationSession, SessionOptions};
pub use transport::{AssetFetcher, Exchange, HttpFetcher, HttpTransport, RedirectHop, Transport};
