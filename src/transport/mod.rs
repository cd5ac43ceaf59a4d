//! Transport layer
//!
//! The session never talks HTTP itself. It drives two capabilities:
//! - [`Transport`]: the document-navigating adapter, which follows redirects
//!   and reports the redirect chain and retry hints of each exchange
//! - [`AssetFetcher`]: a lower-level fetch for images, scripts and other
//!   resources that must not replace the current document
//!
//! [`HttpTransport`] and [`HttpFetcher`] implement both over reqwest.

mod asset;
mod http;

pub use asset::{build_asset_client, HttpFetcher};
pub use http::{build_http_client, HttpTransport};

use crate::classify::RedirectKind;
use crate::document::Link;
use crate::NavigatorError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use url::Url;

/// One hop of a redirect chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    /// The 3xx status that caused the hop
    pub status: u16,
    /// URL that answered with the redirect
    pub from: Url,
    /// Resolved `Location` target
    pub to: Url,
}

impl RedirectHop {
    pub fn kind(&self) -> Option<RedirectKind> {
        RedirectKind::from_status(self.status)
    }
}

/// Outcome of one request/response exchange, redirects included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Status code of the final response
    pub status: u16,

    /// URL of the final response
    pub url: Url,

    /// Body of the final response
    pub body: String,

    /// Redirect hops followed, in order
    pub redirects: Vec<RedirectHop>,

    /// Raw `Retry-After` value of the final response, resolved by the session clock
    pub retry_after: Option<String>,
}

impl Exchange {
    /// Creates an exchange that involved no redirects
    pub fn new(status: u16, url: Url, body: impl Into<String>) -> Self {
        Self {
            status,
            url,
            body: body.into(),
            redirects: Vec::new(),
            retry_after: None,
        }
    }

    /// True if any hop of the chain was a temporary redirect
    pub fn uses_temporary_redirect(&self) -> bool {
        self.redirects
            .iter()
            .any(|hop| hop.kind().is_some_and(|kind| kind.is_temporary()))
    }

    /// Target of the last permanent redirect hop
    ///
    /// This is the URL callers should store in place of the one requested.
    pub fn permanent_redirect_url(&self) -> Option<&Url> {
        self.redirects
            .iter()
            .rev()
            .find(|hop| hop.kind().is_some_and(|kind| kind.is_permanent()))
            .map(|hop| &hop.to)
    }
}

/// Document-navigating transport adapter
#[async_trait]
pub trait Transport: Send + Sync {
    /// Discards state accumulated by previous exchanges (redirect chains, last status)
    fn start_exchange(&mut self);

    /// Performs a request, following redirects
    async fn request(&mut self, method: Method, url: &Url) -> crate::Result<Exchange>;

    /// Follows a link found in the current document
    async fn click(&mut self, link: &Link) -> crate::Result<Exchange>;

    /// Status of the most recent completed exchange
    fn last_status_code(&self) -> Option<u16>;
}

/// Fetch capability for non-document resources
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, method: Method, url: &Url) -> crate::Result<Bytes>;
}

/// Maps a reqwest failure onto the transport error variants
pub(crate) fn request_error(url: &Url, error: reqwest::Error) -> NavigatorError {
    if error.is_timeout() {
        NavigatorError::Timeout {
            url: url.to_string(),
        }
    } else {
        NavigatorError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
