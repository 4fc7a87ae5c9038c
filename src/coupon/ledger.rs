use crate::coupon::model::{ClaimRecord, Coupon};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Key the repeat-avoidance lookup is indexed by: (network address, user agent).
type RequesterKey = (String, String);

/// Append-only history of every successful claim
#[derive(Debug, Default)]
pub struct ClaimLedger {
    records: Vec<ClaimRecord>,
    // requester -> coupon ids already handed out
    claimed: HashMap<RequesterKey, HashSet<Uuid>>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a claim of `coupon` and return the written record
    pub fn record_claim(
        &mut self,
        coupon: &Coupon,
        network_address: &str,
        user_agent: &str,
        now: DateTime<Utc>,
    ) -> ClaimRecord {
        let record = ClaimRecord {
            id: Uuid::new_v4(),
            coupon_id: coupon.id,
            coupon_code: coupon.code.clone(),
            ip_address: network_address.to_string(),
            user_agent: user_agent.to_string(),
            claimed_at: now,
        };

        self.claimed
            .entry((network_address.to_string(), user_agent.to_string()))
            .or_default()
            .insert(coupon.id);
        self.records.push(record.clone());

        record
    }

    /// Coupon ids previously claimed by any request with this (address, user agent) pair
    pub fn claimed_coupon_ids(&self, network_address: &str, user_agent: &str) -> HashSet<Uuid> {
        self.claimed
            .get(&(network_address.to_string(), user_agent.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Every claim made from `network_address`, regardless of user agent
    pub fn claims_for_address(&self, network_address: &str) -> Vec<ClaimRecord> {
        self.records
            .iter()
            .filter(|r| r.ip_address == network_address)
            .cloned()
            .collect()
    }

    /// Full history in insertion order
    pub fn records(&self) -> &[ClaimRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
