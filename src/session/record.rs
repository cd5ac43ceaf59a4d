//! Snapshot of the last response seen by a session
//!
//! The status code and the redirect/retry metadata are replaced together as
//! one value, so a failed navigation can never leave them half-updated.

use crate::classify::{
    self, next_month_noon_utc, parse_retry_after, Verdict, BANDWIDTH_LIMIT_EXCEEDED,
};
use crate::transport::Exchange;
use chrono::{DateTime, Utc};
use url::Url;

/// Status and redirect/retry metadata of the last response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRecord {
    status: u16,
    uses_temporary_redirect: bool,
    permanent_redirect_url: Option<Url>,
    retry_at: Option<DateTime<Utc>>,
}

impl NavigationRecord {
    /// Builds a record from a completed exchange
    ///
    /// `Retry-After` delta-seconds count from `now`. A 509 without a usable
    /// server deadline gets one synthesized: the first day of the next month
    /// at noon UTC, when monthly quotas reset.
    pub fn from_exchange(exchange: &Exchange, now: DateTime<Utc>) -> Self {
        let announced = exchange.retry_after.as_deref().and_then(|value| {
            let parsed = parse_retry_after(value, now);
            if parsed.is_none() {
                tracing::debug!("Ignoring unparseable Retry-After '{}'", value);
            }
            parsed
        });

        let retry_at = match announced {
            Some(at) => Some(at),
            None if exchange.status == BANDWIDTH_LIMIT_EXCEEDED => {
                let at = next_month_noon_utc(now);
                tracing::warn!("Bandwidth limit exceeded at {}, retry after {}", exchange.url, at);
                Some(at)
            }
            None => None,
        };

        Self {
            status: exchange.status,
            uses_temporary_redirect: exchange.uses_temporary_redirect(),
            permanent_redirect_url: exchange.permanent_redirect_url().cloned(),
            retry_at,
        }
    }

    /// A record carrying a new status but no redirect/retry metadata
    pub fn status_only(status: u16) -> Self {
        Self {
            status,
            uses_temporary_redirect: false,
            permanent_redirect_url: None,
            retry_at: None,
        }
    }

    /// Same metadata, new status
    pub fn with_status(&self, status: u16) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn uses_temporary_redirect(&self) -> bool {
        self.uses_temporary_redirect
    }

    pub fn permanent_redirect_url(&self) -> Option<&Url> {
        self.permanent_redirect_url.as_ref()
    }

    pub fn retry_at(&self) -> Option<DateTime<Utc>> {
        self.retry_at
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_parts(
            self.status,
            self.uses_temporary_redirect,
            self.permanent_redirect_url.is_some(),
        )
    }

    pub fn is_temporary_result(&self) -> bool {
        classify::is_temporary_result(self.status, self.uses_temporary_redirect)
    }

    pub fn is_gone(&self) -> bool {
        classify::is_gone(self.status, self.uses_temporary_redirect)
    }

    pub fn is_permanent_error(&self) -> bool {
        classify::is_permanent_error(self.status, self.uses_temporary_redirect)
    }

    pub fn is_success(&self) -> bool {
        classify::is_success(self.status)
    }

    pub fn is_client_error(&self) -> bool {
        classify::is_client_error(self.status)
    }

    pub fn is_server_error(&self) -> bool {
        classify::is_server_error(self.status)
    }

    pub fn is_forbidden(&self) -> bool {
        classify::is_forbidden(self.status)
    }

    pub fn is_not_found(&self) -> bool {
        classify::is_not_found(self.status)
    }
}
