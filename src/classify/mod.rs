//! Response classification
//!
//! Pure decision logic over the last status code and the redirect flags of a
//! navigation. Nothing here performs I/O or keeps state: every predicate is
//! recomputed from its inputs so it always reflects the latest response.
//!
//! # Priority rules
//!
//! - A temporary redirect makes any result temporary, whatever the final status.
//! - `410 Gone` is only "gone" when the result is not temporary.
//! - Every status >= 400 that is not temporary is a permanent error,
//!   `410` included; check [`is_gone`] first to treat it specially.

mod retry;
mod status;

pub use retry::{next_month_noon_utc, parse_retry_after};
pub use status::{
    is_transient_status, RedirectKind, StatusRange, BANDWIDTH_LIMIT_EXCEEDED,
    TRANSIENT_STATUS_CODES,
};

use std::fmt;

/// Prioritised outcome of a navigation
///
/// Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Retry later: transient status or a temporary redirect was involved
    TemporaryResult,

    /// HTTP 410 without any temporary signal; drop the target for good
    Gone,

    /// Any other status >= 400 that is not temporary
    PermanentError,

    /// Final status is a redirect (301, 302, 303, 307, 308), or a permanent
    /// redirect was followed; update the stored link
    Redirect,

    /// 2xx with no redirect involved
    Success,

    /// Informational, 300, 304, other non-redirect 3xx, or out-of-range statuses
    Other,
}

impl Verdict {
    /// Derives the verdict from a status code and the redirect flags
    ///
    /// # Arguments
    ///
    /// * `status` - Final status code of the response
    /// * `uses_temporary_redirect` - Whether a temporary redirect was passed through
    /// * `has_permanent_redirect` - Whether a permanent redirect was passed through
    pub fn from_parts(
        status: u16,
        uses_temporary_redirect: bool,
        has_permanent_redirect: bool,
    ) -> Self {
        if is_temporary_result(status, uses_temporary_redirect) {
            Self::TemporaryResult
        } else if is_gone(status, uses_temporary_redirect) {
            Self::Gone
        } else if is_permanent_error(status, uses_temporary_redirect) {
            Self::PermanentError
        } else if has_permanent_redirect || RedirectKind::from_status(status).is_some() {
            Self::Redirect
        } else if is_success(status) {
            Self::Success
        } else {
            Self::Other
        }
    }

    /// Returns true if the caller should re-enqueue the target later
    pub fn should_retry(&self) -> bool {
        matches!(self, Self::TemporaryResult)
    }

    /// Returns true if the caller should stop visiting the target
    pub fn should_abandon(&self) -> bool {
        matches!(self, Self::Gone | Self::PermanentError)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TemporaryResult => "temporary_result",
            Self::Gone => "gone",
            Self::PermanentError => "permanent_error",
            Self::Redirect => "redirect",
            Self::Success => "success",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// True if a temporary redirect was involved or the status is transient
pub fn is_temporary_result(status: u16, uses_temporary_redirect: bool) -> bool {
    uses_temporary_redirect || is_transient_status(status)
}

/// True for a non-temporary 410
pub fn is_gone(status: u16, uses_temporary_redirect: bool) -> bool {
    status == 410 && !is_temporary_result(status, uses_temporary_redirect)
}

/// True for any non-temporary status >= 400
pub fn is_permanent_error(status: u16, uses_temporary_redirect: bool) -> bool {
    status >= 400 && !is_temporary_result(status, uses_temporary_redirect)
}

pub fn is_success(status: u16) -> bool {
    StatusRange::from_status(status) == StatusRange::Success
}

pub fn is_client_error(status: u16) -> bool {
    StatusRange::from_status(status) == StatusRange::ClientError
}

pub fn is_server_error(status: u16) -> bool {
    StatusRange::from_status(status) == StatusRange::ServerError
}

pub fn is_forbidden(status: u16) -> bool {
    status == 403
}

pub fn is_not_found(status: u16) -> bool {
    status == 404
}
