use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Reasons a claim request is turned down
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum ClaimError {
    #[error("You need to wait {remaining_minutes} more minutes before claiming another coupon.")]
    CooldownActive { remaining_minutes: i64 },

    #[error("Sorry, there are no active coupons available at this time.")]
    NoEligibleCoupons,

    #[error("You have already claimed all available coupons.")]
    AllCouponsClaimed,
}

impl ClaimError {
    /// Convert error to HTTP status code
    pub fn to_err_code(&self) -> StatusCode {
        match self {
            ClaimError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            ClaimError::NoEligibleCoupons => StatusCode::NOT_FOUND,
            ClaimError::AllCouponsClaimed => StatusCode::CONFLICT,
        }
    }
}

/// Admin catalog errors
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum CatalogError {
    #[error("Coupon not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),
}

impl CatalogError {
    pub fn to_err_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::InvalidCoupon(_) => StatusCode::BAD_REQUEST,
        }
    }
}
