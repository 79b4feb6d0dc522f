use std::fmt;
use std::num::NonZeroU64;

use static_assertions::assert_eq_size;

/// Identity of one validation request.
///
/// Tokens of a control are strictly increasing. They are only ever compared for equality
/// with the control's active token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(NonZeroU64);

assert_eq_size!(Option<RequestToken>, u64);

impl RequestToken {
    const FIRST: RequestToken = RequestToken(NonZeroU64::MIN);

    #[inline]
    fn next(self) -> RequestToken {
        RequestToken(self.0.saturating_add(1))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tracks which validation request of a control is the latest one.
///
/// A response may only be applied while its token is still the active one. Issuing a new
/// request supersedes all earlier ones, whether or not their responses have arrived.
#[derive(Debug, Default)]
pub struct RequestTracker {
    active: Option<RequestToken>,
    settled: bool,
}

impl RequestTracker {
    /// Mints a new token and makes it the active one.
    pub fn issue(&mut self) -> RequestToken {
        let token = self.active.map_or(RequestToken::FIRST, RequestToken::next);
        self.active = Some(token);
        self.settled = false;
        token
    }

    #[inline]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.active == Some(token)
    }

    /// Marks the response for `token` as applied, if `token` is current.
    ///
    /// Returns whether the response may be applied. A token can be settled only once.
    pub fn settle(&mut self, token: RequestToken) -> bool {
        if !self.is_current(token) || self.settled {
            return false;
        }
        self.settled = true;
        true
    }

    /// Whether the active request still awaits its response.
    #[inline]
    pub fn in_flight(&self) -> bool {
        self.active.is_some() && !self.settled
    }

    #[inline]
    pub fn active(&self) -> Option<RequestToken> {
        self.active
    }
}
