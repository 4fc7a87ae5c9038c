use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A promotional coupon as held by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// `None` = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// A coupon can be handed out at `now` if it is active and not yet expired.
    /// A coupon expiring exactly at `now` is no longer eligible.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Fields supplied when adding a coupon; id and creation time are assigned by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoupon {
    pub code: String,
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// Partial update of a coupon. Absent fields are left untouched.
///
/// `expires_at` is a double option so that `{"expires_at": null}` clears the
/// expiry while omitting the field keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_double_option"
    )]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl CouponPatch {
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, coupon: &mut Coupon) {
        if let Some(code) = self.code {
            coupon.code = code;
        }
        if let Some(description) = self.description {
            coupon.description = description;
        }
        if let Some(is_active) = self.is_active {
            coupon.is_active = is_active;
        }
        if let Some(expires_at) = self.expires_at {
            coupon.expires_at = expires_at;
        }
    }
}

fn de_double_option<'de, D>(de: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(de).map(Some)
}

/// Immutable audit entry written for every successful claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: Uuid,
    pub coupon_id: Uuid,
    /// Snapshot of the coupon code at claim time
    pub coupon_code: String,
    pub ip_address: String,
    pub user_agent: String,
    pub claimed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn coupon(is_active: bool, expires_at: Option<DateTime<Utc>>) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "FIRST10".to_string(),
            description: "10% off your first purchase".to_string(),
            is_active,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            expires_at,
        }
    }

    #[test]
    fn test_eligibility_rules() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        assert!(coupon(true, None).is_eligible(now));
        assert!(coupon(true, Some(now + Duration::seconds(1))).is_eligible(now));
        assert!(!coupon(true, Some(now)).is_eligible(now));
        assert!(!coupon(true, Some(now - Duration::days(1))).is_eligible(now));
        assert!(!coupon(false, None).is_eligible(now));
    }

    #[test]
    fn test_patch_json_parsing() {
        let patch: CouponPatch = serde_json::from_str(r#"{"is_active": false}"#).unwrap();
        assert_eq!(patch, CouponPatch::deactivate());
        assert_eq!(patch.expires_at, None);

        let patch: CouponPatch = serde_json::from_str(r#"{"expires_at": null}"#).unwrap();
        assert_eq!(patch.expires_at, Some(None));

        let patch: CouponPatch =
            serde_json::from_str(r#"{"expires_at": "2030-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(
            patch.expires_at,
            Some(Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn test_patch_apply_clears_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut target = coupon(true, Some(now));

        CouponPatch {
            expires_at: Some(None),
            description: Some("updated".to_string()),
            ..Default::default()
        }
        .apply(&mut target);

        assert_eq!(target.expires_at, None);
        assert_eq!(target.description, "updated");
        assert_eq!(target.code, "FIRST10");
        assert!(target.is_active);
    }

    #[test]
    fn test_new_coupon_defaults_to_active() {
        let new: NewCoupon =
            serde_json::from_str(r#"{"code": "FREESHIP", "description": "Free shipping"}"#)
                .unwrap();
        assert!(new.is_active);
        assert_eq!(new.expires_at, None);
    }
}
