pub mod middleware;
pub mod routes;

// Re-export public types and functions
pub use middleware::{ClientIdentity, client_identity_middleware, log_request_errors};
pub use routes::{
    ClaimResponse, HealthResponse, claim_coupon, create_coupon, delete_coupon, get_coupon,
    health, list_claims, list_coupons, my_claims, update_coupon,
};
