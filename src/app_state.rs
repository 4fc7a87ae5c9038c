use crate::config::Config;
use crate::coupon::{Catalog, CouponEngine, NewCoupon};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub engine: CouponEngine,
    pub session_cookie: String,
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let engine = CouponEngine::new(Catalog::new());
        let now = Utc::now();

        if config.seed_defaults {
            for coupon in demo_coupons(now) {
                engine.add_coupon(coupon, now)?;
            }
        }
        for seed in &config.coupons {
            engine.add_coupon(seed.clone().into(), now)?;
        }

        info!(
            coupons = engine.catalog().len(),
            seed_defaults = config.seed_defaults,
            "Coupon catalog initialized"
        );

        Ok(Self {
            engine,
            session_cookie: config.session_cookie.clone(),
            trust_forwarded_for: config.trust_forwarded_for,
        })
    }
}

/// Demo coupons offered when `seed_defaults` is set
fn demo_coupons(now: DateTime<Utc>) -> [NewCoupon; 3] {
    [
        NewCoupon {
            code: "FIRST10".to_string(),
            description: "10% off your first purchase".to_string(),
            is_active: true,
            expires_at: Some(now + Duration::days(30)),
        },
        NewCoupon {
            code: "SUMMER25".to_string(),
            description: "25% off summer items".to_string(),
            is_active: true,
            expires_at: Some(now + Duration::days(60)),
        },
        NewCoupon {
            code: "FREESHIP".to_string(),
            description: "Free shipping on orders over $50".to_string(),
            is_active: true,
            expires_at: None,
        },
    ]
}
