//! HTTP document transport
//!
//! This module handles document requests for the session, including:
//! - Building HTTP clients with proper user agent strings
//! - Following redirects manually so every hop is recorded
//! - Redirect loop and chain length detection
//! - Capturing the raw `Retry-After` hint of the final response

use crate::classify::RedirectKind;
use crate::config::Config;
use crate::document::Link;
use crate::transport::{request_error, Exchange, RedirectHop, Transport};
use crate::NavigatorError;
use async_trait::async_trait;
use reqwest::header::{LOCATION, RETRY_AFTER};
use reqwest::{redirect::Policy, Client, Method, Response};
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used for document navigation
///
/// Redirects are disabled on the client; [`HttpTransport`] follows them
/// itself to record each hop.
///
/// # Example
///
/// ```no_run
/// use sumi_navigator::config::parse_config;
/// use sumi_navigator::transport::build_http_client;
///
/// let config = parse_config(r#"
/// [user-agent]
/// crawler-name = "SumiNavigator"
/// crawler-version = "1.0"
/// contact-url = "https://example.com/about"
/// contact-email = "admin@example.com"
/// "#).unwrap();
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.navigator.request_timeout))
        .connect_timeout(Duration::from_secs(config.navigator.connect_timeout))
        .redirect(Policy::none()) // Handle redirects manually
        .https_only(config.navigator.https_only)
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Transport`]
///
/// # Redirect handling
///
/// | Condition | Action |
/// |-----------|--------|
/// | 301, 302, 303, 307, 308 with `Location` | Follow, record hop |
/// | 3xx without `Location` | Stop, return the 3xx response |
/// | `Location` not resolvable (non-ASCII bytes are read as UTF-8) | MalformedResponse |
/// | Target already visited in this exchange | RedirectLoop |
/// | More than `max_redirects` hops | RedirectLimit |
/// | 303, or 301/302 on a non-GET/HEAD request | Continue as GET |
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    max_redirects: usize,
    redirect_chain: Vec<RedirectHop>,
    last_status: Option<u16>,
}

impl HttpTransport {
    pub fn new(client: Client, max_redirects: usize) -> Self {
        Self {
            client,
            max_redirects,
            redirect_chain: Vec::new(),
            last_status: None,
        }
    }

    /// Builds a transport from the navigator configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(config).map_err(NavigatorError::ClientBuild)?;
        Ok(Self::new(client, config.navigator.max_redirects))
    }

    /// Every hop followed since the last [`Transport::start_exchange`]
    pub fn redirect_chain(&self) -> &[RedirectHop] {
        &self.redirect_chain
    }

    async fn exchange(&mut self, method: Method, url: &Url) -> crate::Result<Exchange> {
        let mut method = method;
        let mut current = url.clone();
        let mut hops: Vec<RedirectHop> = Vec::new();

        loop {
            let response = self
                .client
                .request(method.clone(), current.clone())
                .send()
                .await
                .map_err(|e| request_error(&current, e))?;

            let status = response.status().as_u16();

            if RedirectKind::from_status(status).is_some() {
                if let Some(target) = redirect_target(&response, &current)? {
                    if hops.len() >= self.max_redirects {
                        tracing::warn!(
                            "Redirect chain from {} exceeded {} hops",
                            url,
                            self.max_redirects
                        );
                        return Err(NavigatorError::RedirectLimit {
                            url: url.to_string(),
                        });
                    }

                    if target == current || hops.iter().any(|hop| hop.from == target) {
                        tracing::warn!("Redirect loop at {}", target);
                        return Err(NavigatorError::RedirectLoop {
                            url: target.to_string(),
                        });
                    }

                    tracing::debug!("Redirect {}: {} -> {}", status, current, target);

                    if status == 303
                        || (matches!(status, 301 | 302)
                            && method != Method::GET
                            && method != Method::HEAD)
                    {
                        method = Method::GET;
                    }

                    let hop = RedirectHop {
                        status,
                        from: current,
                        to: target.clone(),
                    };
                    self.redirect_chain.push(hop.clone());
                    hops.push(hop);
                    current = target;
                    continue;
                }

                tracing::debug!(
                    "Redirect {} from {} has no Location, stopping",
                    status,
                    current
                );
            }

            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).trim().to_string());

            let final_url = response.url().clone();
            let body = response
                .text()
                .await
                .map_err(|e| request_error(&final_url, e))?;

            self.last_status = Some(status);

            return Ok(Exchange {
                status,
                url: final_url,
                body,
                redirects: hops,
                retry_after,
            });
        }
    }
}

/// Resolves the `Location` header of a redirect response
///
/// Returns `Ok(None)` when the header is absent.
fn redirect_target(response: &Response, current: &Url) -> crate::Result<Option<Url>> {
    let Some(location) = response.headers().get(LOCATION) else {
        return Ok(None);
    };

    // Non-ASCII bytes are read as UTF-8
    let location = String::from_utf8_lossy(location.as_bytes());

    current
        .join(location.trim())
        .map(Some)
        .map_err(|e| NavigatorError::MalformedResponse {
            url: current.to_string(),
            message: format!("invalid Location '{}': {}", location, e),
        })
}

#[async_trait]
impl Transport for HttpTransport {
    fn start_exchange(&mut self) {
        self.redirect_chain.clear();
        self.last_status = None;
    }

    async fn request(&mut self, method: Method, url: &Url) -> crate::Result<Exchange> {
        self.exchange(method, url).await
    }

    async fn click(&mut self, link: &Link) -> crate::Result<Exchange> {
        self.exchange(Method::GET, &link.url).await
    }

    fn last_status_code(&self) -> Option<u16> {
        self.last_status
    }
}
