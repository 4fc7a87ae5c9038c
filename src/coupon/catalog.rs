use crate::coupon::error::CatalogError;
use crate::coupon::model::{Coupon, CouponPatch, NewCoupon};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Coupon catalog shared between the admin surface and the allocation engine.
///
/// Coupons are keyed by id and kept in insertion order; that order decides
/// which coupon a requester gets next.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    coupons: Arc<RwLock<IndexMap<Uuid, Coupon>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All coupons, unfiltered, in creation order
    pub fn list(&self) -> Vec<Coupon> {
        self.coupons.read().values().cloned().collect()
    }

    /// Coupons that are active and not expired at `now`, in creation order
    pub fn list_eligible(&self, now: DateTime<Utc>) -> Vec<Coupon> {
        self.coupons
            .read()
            .values()
            .filter(|c| c.is_eligible(now))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: Uuid) -> Option<Coupon> {
        self.coupons.read().get(&id).cloned()
    }

    /// Add a coupon, assigning it a fresh id and `now` as creation time
    pub fn add(&self, new: NewCoupon, now: DateTime<Utc>) -> Result<Coupon, CatalogError> {
        validate_text("code", &new.code)?;
        validate_text("description", &new.description)?;

        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: new.code,
            description: new.description,
            is_active: new.is_active,
            created_at: now,
            expires_at: new.expires_at,
        };

        debug!(coupon_id = %coupon.id, code = %coupon.code, "Adding coupon");
        self.coupons.write().insert(coupon.id, coupon.clone());
        Ok(coupon)
    }

    /// Apply a partial update; position in the catalog order is kept
    pub fn update(&self, id: Uuid, patch: CouponPatch) -> Result<Coupon, CatalogError> {
        if let Some(code) = &patch.code {
            validate_text("code", code)?;
        }
        if let Some(description) = &patch.description {
            validate_text("description", description)?;
        }

        let mut coupons = self.coupons.write();
        let coupon = coupons.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        patch.apply(coupon);

        debug!(coupon_id = %id, code = %coupon.code, is_active = coupon.is_active, "Updated coupon");
        Ok(coupon.clone())
    }

    /// Remove a coupon. Returns `false` if no coupon had this id.
    pub fn delete(&self, id: Uuid) -> bool {
        let removed = self.coupons.write().shift_remove(&id).is_some();
        debug!(coupon_id = %id, removed, "Deleting coupon");
        removed
    }

    pub fn len(&self) -> usize {
        self.coupons.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.coupons.read().is_empty()
    }
}

fn validate_text(field: &str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::InvalidCoupon(format!("{field} is required")));
    }
    Ok(())
}
