pub mod catalog;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod model;

// Re-export public types and functions
pub use catalog::Catalog;
pub use cooldown::{COOLDOWN_PERIOD, Cooldown, CooldownTracker};
pub use engine::CouponEngine;
pub use error::{CatalogError, ClaimError};
pub use identity::{IdentityKey, resolve};
pub use ledger::ClaimLedger;
pub use model::{ClaimRecord, Coupon, CouponPatch, NewCoupon};
