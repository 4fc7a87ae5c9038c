use crate::coupon::catalog::Catalog;
use crate::coupon::cooldown::{Cooldown, CooldownTracker};
use crate::coupon::error::{CatalogError, ClaimError};
use crate::coupon::identity;
use crate::coupon::ledger::ClaimLedger;
use crate::coupon::model::{ClaimRecord, Coupon, CouponPatch, NewCoupon};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Everything a claim decision mutates, guarded by one lock
#[derive(Debug, Default)]
struct ClaimState {
    cooldowns: CooldownTracker,
    ledger: ClaimLedger,
}

/// Allocation engine: decides who gets which coupon and keeps the audit ledger
#[derive(Clone, Debug)]
pub struct CouponEngine {
    catalog: Catalog,
    state: Arc<Mutex<ClaimState>>,
}

impl CouponEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            state: Arc::new(Mutex::new(ClaimState::default())),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Hand the next coupon to a requester, or say why not.
    ///
    /// The cooldown check, the candidate selection and both writes happen
    /// under a single lock, so two concurrent claims from the same identity
    /// cannot both succeed. A rejected claim writes nothing.
    pub fn claim(
        &self,
        network_address: &str,
        user_agent: &str,
        session_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Coupon, ClaimError> {
        let identity = identity::resolve(network_address, session_token);

        let mut state = self.state.lock();

        if let Cooldown::Blocked { remaining_minutes } = state.cooldowns.check(&identity, now) {
            debug!(
                address = identity.address(),
                remaining_minutes,
                "Claim rejected, cooldown active"
            );
            return Err(ClaimError::CooldownActive { remaining_minutes });
        }

        let eligible = self.catalog.list_eligible(now);
        if eligible.is_empty() {
            debug!(address = identity.address(), "Claim rejected, no eligible coupons");
            return Err(ClaimError::NoEligibleCoupons);
        }

        let already = state.ledger.claimed_coupon_ids(network_address, user_agent);
        let Some(chosen) = eligible.into_iter().find(|c| !already.contains(&c.id)) else {
            debug!(
                address = identity.address(),
                claimed = already.len(),
                "Claim rejected, all coupons claimed"
            );
            return Err(ClaimError::AllCouponsClaimed);
        };

        let record = state
            .ledger
            .record_claim(&chosen, network_address, user_agent, now);
        state.cooldowns.record_claim(&identity, now);
        drop(state);

        info!(
            claim_id = %record.id,
            coupon_id = %chosen.id,
            code = %chosen.code,
            address = identity.address(),
            "Coupon claimed"
        );
        Ok(chosen)
    }

    pub fn list_coupons(&self) -> Vec<Coupon> {
        self.catalog.list()
    }

    pub fn get_coupon(&self, id: Uuid) -> Option<Coupon> {
        self.catalog.get(id)
    }

    pub fn add_coupon(&self, new: NewCoupon, now: DateTime<Utc>) -> Result<Coupon, CatalogError> {
        let coupon = self.catalog.add(new, now)?;
        info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon added");
        Ok(coupon)
    }

    pub fn update_coupon(&self, id: Uuid, patch: CouponPatch) -> Result<Coupon, CatalogError> {
        let coupon = self.catalog.update(id, patch)?;
        info!(coupon_id = %id, code = %coupon.code, "Coupon updated");
        Ok(coupon)
    }

    pub fn delete_coupon(&self, id: Uuid) -> bool {
        let removed = self.catalog.delete(id);
        if removed {
            info!(coupon_id = %id, "Coupon deleted");
        }
        removed
    }

    /// Full claim history in insertion order
    pub fn list_claims(&self) -> Vec<ClaimRecord> {
        self.state.lock().ledger.records().to_vec()
    }

    /// Number of claims recorded so far
    pub fn claim_count(&self) -> usize {
        self.state.lock().ledger.len()
    }

    pub fn claims_for_address(&self, network_address: &str) -> Vec<ClaimRecord> {
        self.state.lock().ledger.claims_for_address(network_address)
    }
}
