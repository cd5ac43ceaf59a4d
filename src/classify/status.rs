//! Status code policy tables
//!
//! Which codes count as transient, which redirects are temporary, and the
//! plain range view of a status code.

use std::fmt;

/// Statuses after which a retry may succeed without any change on our side
///
/// Mixes standard transient codes with vendor-specific ones (Cloudflare's
/// 52x range, 598/599 proxy timeouts). Membership is policy: do not edit
/// without updating the callers that re-enqueue on these.
pub const TRANSIENT_STATUS_CODES: [u16; 23] = [
    408, 409, 419, 420, 421, 423, 425, 429, 500, 502, 503, 504, 507, 520, 521, 522, 523, 524, 525,
    527, 529, 598, 599,
];

/// Non-standard "Bandwidth Limit Exceeded" status
pub const BANDWIDTH_LIMIT_EXCEEDED: u16 = 509;

/// Returns true if the status code is in the transient set
pub fn is_transient_status(status: u16) -> bool {
    TRANSIENT_STATUS_CODES.contains(&status)
}

/// Kind of an HTTP redirect response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectKind {
    /// The resource may come back to the original URL (302, 303, 307)
    Temporary,

    /// The resource has moved for good (301, 308)
    Permanent,
}

impl RedirectKind {
    /// Classifies a redirect status, returning None for non-redirects
    ///
    /// 300 (Multiple Choices) and 304 (Not Modified) are not redirects
    /// to follow.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            301 | 308 => Some(Self::Permanent),
            302 | 303 | 307 => Some(Self::Temporary),
            _ => None,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary)
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent)
    }
}

/// Range-based view of a status code
///
/// Unlike the verdict, this ignores redirect flags entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusRange {
    /// 100-199
    Informational,
    /// 200-299
    Success,
    /// 300-399
    Redirection,
    /// 400-499
    ClientError,
    /// 500-599
    ServerError,
    /// Anything outside 100-599
    Unknown,
}

impl StatusRange {
    pub fn from_status(status: u16) -> Self {
        match status {
            100..=199 => Self::Informational,
            200..=299 => Self::Success,
            300..=399 => Self::Redirection,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Informational => "informational",
            Self::Success => "success",
            Self::Redirection => "redirection",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}
