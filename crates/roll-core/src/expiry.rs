//! Redemption deadline calculation.
//!
//! The deadline is always re-derived from stored instants and the configured
//! TTL at the moment it is needed; nothing caches it.
//!
//! ```text
//! deadline = min(scheduled_end, opened_at + ttl)   when opened
//!          = scheduled_end                          otherwise
//! ```

use chrono::{DateTime, TimeDelta, Utc};

use crate::entities::ClassSession;
use crate::enums::SessionStatus;

/// Authoritative instant after which the session's code is no longer redeemable.
#[must_use]
pub fn deadline(session: &ClassSession, ttl: TimeDelta) -> DateTime<Utc> {
    session.opened_at.map_or(session.scheduled_end, |opened| {
        session.scheduled_end.min(opened + ttl)
    })
}

/// Whether `now` is past the deadline. The deadline instant itself still counts.
#[must_use]
pub fn is_expired(session: &ClassSession, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
    now > deadline(session, ttl)
}

/// A session is redeemable iff it is open and `now <= deadline`.
#[must_use]
pub fn is_redeemable(session: &ClassSession, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
    session.status == SessionStatus::Open && !is_expired(session, ttl, now)
}
