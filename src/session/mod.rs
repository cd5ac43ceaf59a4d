//! Navigation session
//!
//! A [`NavigationSession`] owns one logical browsing session: the current
//! document, the record of the last response, and the two transport
//! capabilities it navigates and fetches through.
//!
//! # Lifecycle
//!
//! | Operation | Document | Status | Redirect/retry metadata |
//! |-----------|----------|--------|-------------------------|
//! | `navigate` | replaced | replaced | replaced |
//! | `click_link` | replaced | replaced | kept (replaced if `click_refreshes_metadata`) |
//! | `set_content` | replaced | kept | kept |
//! | `fetch_asset` | kept | kept | kept |
//!
//! Every mutating operation takes `&mut self`: one session per crawl task,
//! navigations on it are serialized by the borrow checker. A failed
//! operation leaves all state as it was.
//!
//! # Example
//!
//! ```no_run
//! use sumi_navigator::config::load_config;
//! use sumi_navigator::NavigationSession;
//! use std::path::Path;
//!
//! # async fn example() -> sumi_navigator::Result<()> {
//! let config = load_config(Path::new("navigator.toml"))?;
//! let mut session = NavigationSession::from_config(&config)?;
//!
//! session.navigate("https://example.com/").await?.click_link("Archive").await?;
//!
//! if session.is_temporary_result()? {
//!     println!("retry at {:?}", session.retry_at());
//! }
//! # Ok(())
//! # }
//! ```

mod record;

pub use record::NavigationRecord;

use crate::classify::Verdict;
use crate::config::{Config, NavigatorConfig};
use crate::document::Document;
use crate::transport::{AssetFetcher, Exchange, HttpFetcher, HttpTransport, Transport};
use crate::NavigatorError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Method;
use std::sync::Arc;
use url::Url;

/// Source of the current time, used to resolve and synthesize retry deadlines
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Behavior switches for a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Whether `click_link` also replaces redirect/retry metadata
    pub click_refreshes_metadata: bool,
}

impl From<&NavigatorConfig> for SessionOptions {
    fn from(config: &NavigatorConfig) -> Self {
        Self {
            click_refreshes_metadata: config.click_refreshes_metadata,
        }
    }
}

/// One logical browsing session
pub struct NavigationSession<T = HttpTransport, F = HttpFetcher> {
    transport: T,
    fetcher: F,
    options: SessionOptions,
    clock: Clock,
    document: Option<Document>,
    last: Option<NavigationRecord>,
}

impl NavigationSession<HttpTransport, HttpFetcher> {
    /// Creates a session with reqwest transports built from the configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let session = Self::new(
            HttpTransport::from_config(config)?,
            HttpFetcher::from_config(config)?,
        )
        .with_options(SessionOptions::from(&config.navigator));
        Ok(session)
    }
}

impl<T: Transport, F: AssetFetcher> NavigationSession<T, F> {
    pub fn new(transport: T, fetcher: F) -> Self {
        Self {
            transport,
            fetcher,
            options: SessionOptions::default(),
            clock: Arc::new(Utc::now),
            document: None,
            last: None,
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the clock used to resolve and synthesize retry deadlines
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Navigates to `url` with a fresh exchange
    ///
    /// Relative URLs are resolved against the current document. On success
    /// the document, the status and the redirect/retry metadata are all
    /// replaced. On failure nothing changes.
    pub async fn navigate(&mut self, url: &str) -> crate::Result<&mut Self> {
        let target = self.resolve(url)?;

        self.transport.start_exchange();
        let exchange = self
            .transport
            .request(Method::GET, &target)
            .await
            .inspect_err(|e| tracing::warn!("Navigation to {} failed: {}", target, e))?;

        let record = NavigationRecord::from_exchange(&exchange, (self.clock)());
        self.commit(exchange, record);
        Ok(self)
    }

    /// Replaces the current document with `content`, based at `url`
    ///
    /// The status and redirect/retry metadata keep the values of the last
    /// real navigation, so they are stale with respect to the new document.
    pub fn set_content(&mut self, url: &str, content: &str) -> crate::Result<&mut Self> {
        let base = Url::parse(url)?;
        tracing::debug!("Injecting {} bytes of content at {}", content.len(), base);
        self.document = Some(Document::new(base, content));
        Ok(self)
    }

    /// Fetches a non-document resource without touching session state
    ///
    /// `url` is resolved against the current document when there is one.
    pub async fn fetch_asset(&self, url: &str) -> crate::Result<Bytes> {
        let target = self.resolve(url)?;
        self.fetcher.fetch(Method::GET, &target).await
    }

    /// Follows a link by its text or title, or navigates if given an absolute URL
    ///
    /// # Errors
    ///
    /// * `LinkNotFound` - No document yet, or no link in it matches
    pub async fn click_link(&mut self, title_or_url: &str) -> crate::Result<&mut Self> {
        if looks_like_url(title_or_url) {
            return self.navigate(title_or_url).await;
        }

        let link = self
            .document
            .as_ref()
            .and_then(|document| document.find_link(title_or_url))
            .ok_or_else(|| NavigatorError::LinkNotFound {
                needle: title_or_url.to_string(),
            })?;

        tracing::debug!("Clicking '{}' -> {}", title_or_url, link.url);
        let exchange = self
            .transport
            .click(&link)
            .await
            .inspect_err(|e| tracing::warn!("Click on {} failed: {}", link.url, e))?;

        let record = if self.options.click_refreshes_metadata {
            NavigationRecord::from_exchange(&exchange, (self.clock)())
        } else {
            match &self.last {
                Some(previous) => previous.with_status(exchange.status),
                None => NavigationRecord::status_only(exchange.status),
            }
        };
        self.commit(exchange, record);
        Ok(self)
    }

    /// Status code of the most recent response
    ///
    /// # Errors
    ///
    /// * `PrematureAccess` - No response has been received yet
    pub fn status_code(&self) -> crate::Result<u16> {
        Ok(self.record()?.status())
    }

    /// The record of the most recent response
    pub fn last_navigation(&self) -> Option<&NavigationRecord> {
        self.last.as_ref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn verdict(&self) -> crate::Result<Verdict> {
        Ok(self.record()?.verdict())
    }

    pub fn is_temporary_result(&self) -> crate::Result<bool> {
        Ok(self.record()?.is_temporary_result())
    }

    pub fn is_gone(&self) -> crate::Result<bool> {
        Ok(self.record()?.is_gone())
    }

    pub fn is_permanent_error(&self) -> crate::Result<bool> {
        Ok(self.record()?.is_permanent_error())
    }

    pub fn is_success(&self) -> crate::Result<bool> {
        Ok(self.record()?.is_success())
    }

    pub fn is_client_error(&self) -> crate::Result<bool> {
        Ok(self.record()?.is_client_error())
    }

    pub fn is_server_error(&self) -> crate::Result<bool> {
        Ok(self.record()?.is_server_error())
    }

    pub fn is_forbidden(&self) -> crate::Result<bool> {
        Ok(self.record()?.is_forbidden())
    }

    pub fn is_not_found(&self) -> crate::Result<bool> {
        Ok(self.record()?.is_not_found())
    }

    /// False until a navigation passed through a temporary redirect
    pub fn uses_temporary_redirect(&self) -> bool {
        self.last
            .as_ref()
            .is_some_and(NavigationRecord::uses_temporary_redirect)
    }

    pub fn permanent_redirect_url(&self) -> Option<&Url> {
        self.last
            .as_ref()
            .and_then(NavigationRecord::permanent_redirect_url)
    }

    pub fn retry_at(&self) -> Option<DateTime<Utc>> {
        self.last.as_ref().and_then(NavigationRecord::retry_at)
    }

    /// Retry deadline as a unix timestamp, 0 when unset
    pub fn retry_at_timestamp(&self) -> i64 {
        self.retry_at().map_or(0, |at| at.timestamp())
    }

    fn record(&self) -> crate::Result<&NavigationRecord> {
        self.last.as_ref().ok_or(NavigatorError::PrematureAccess)
    }

    fn resolve(&self, url: &str) -> crate::Result<Url> {
        let resolved = match &self.document {
            Some(document) => document.resolve(url)?,
            None => Url::parse(url)?,
        };
        Ok(resolved)
    }

    fn commit(&mut self, exchange: Exchange, record: NavigationRecord) {
        tracing::info!(
            "{} {} ({})",
            record.status(),
            exchange.url,
            record.verdict()
        );
        self.document = Some(Document::new(exchange.url, exchange.body));
        self.last = Some(record);
    }
}

/// Case-insensitive `http` prefix check
fn looks_like_url(value: &str) -> bool {
    value
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"))
}
