use crate::coupon::identity::IdentityKey;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Minimum interval between two successful claims of the same identity
pub const COOLDOWN_PERIOD: Duration = Duration::hours(1);

const MS_PER_MINUTE: i64 = 60_000;

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    Eligible,
    Blocked { remaining_minutes: i64 },
}

#[derive(Debug, Clone, Default)]
struct CooldownRecord {
    last_claim_at: Option<DateTime<Utc>>,
}

/// Per-identity record of the last successful claim.
///
/// Records are never removed while the process runs.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    records: HashMap<IdentityKey, CooldownRecord>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `identity` may claim at `now`.
    ///
    /// First contact creates an empty record. A blocked check never touches
    /// `last_claim_at`; only [`CooldownTracker::record_claim`] does.
    pub fn check(&mut self, identity: &IdentityKey, now: DateTime<Utc>) -> Cooldown {
        let record = self.records.entry(identity.clone()).or_default();
        let Some(last_claim_at) = record.last_claim_at else {
            return Cooldown::Eligible;
        };

        let elapsed = now - last_claim_at;
        if elapsed >= COOLDOWN_PERIOD {
            return Cooldown::Eligible;
        }

        let remaining_ms = (COOLDOWN_PERIOD - elapsed).num_milliseconds();
        Cooldown::Blocked {
            remaining_minutes: (remaining_ms + MS_PER_MINUTE - 1).div_euclid(MS_PER_MINUTE),
        }
    }

    /// Start a new cooldown for `identity` after a successful claim
    pub fn record_claim(&mut self, identity: &IdentityKey, now: DateTime<Utc>) {
        self.records.entry(identity.clone()).or_default().last_claim_at = Some(now);
    }

    pub fn last_claim_at(&self, identity: &IdentityKey) -> Option<DateTime<Utc>> {
        self.records.get(identity).and_then(|r| r.last_claim_at)
    }

    /// Number of identities seen so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
