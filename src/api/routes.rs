use crate::AppState;
use crate::api::middleware::ClientIdentity;
use crate::coupon::{ClaimRecord, Coupon, CouponPatch, NewCoupon};
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

const CLAIM_SUCCESS_MESSAGE: &str = "Coupon claimed successfully!";

/// Response body of `POST /claim`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Coupon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub coupons: usize,
    pub claims: usize,
}

/// Claim the next coupon for the calling client
pub async fn claim_coupon(
    Extension(state): Extension<AppState>,
    Extension(identity): Extension<ClientIdentity>,
) -> Response {
    let result = state.engine.claim(
        &identity.network_address,
        &identity.user_agent,
        &identity.session_token,
        Utc::now(),
    );

    match result {
        Ok(coupon) => (
            StatusCode::OK,
            Json(ClaimResponse {
                success: true,
                message: CLAIM_SUCCESS_MESSAGE.to_string(),
                coupon: Some(coupon),
            }),
        )
            .into_response(),
        Err(err) => {
            debug!(address = %identity.network_address, %err, "Claim refused");
            (
                err.to_err_code(),
                Json(ClaimResponse {
                    success: false,
                    message: err.to_string(),
                    coupon: None,
                }),
            )
                .into_response()
        }
    }
}

/// Claims made from the caller's network address
pub async fn my_claims(
    Extension(state): Extension<AppState>,
    Extension(identity): Extension<ClientIdentity>,
) -> Json<Vec<ClaimRecord>> {
    Json(state.engine.claims_for_address(&identity.network_address))
}

pub async fn list_coupons(Extension(state): Extension<AppState>) -> Json<Vec<Coupon>> {
    Json(state.engine.list_coupons())
}

pub async fn get_coupon(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.engine.get_coupon(id) {
        Some(coupon) => (StatusCode::OK, Json(coupon)).into_response(),
        None => err_response(StatusCode::NOT_FOUND, &format!("Coupon not found: {id}")),
    }
}

pub async fn create_coupon(
    Extension(state): Extension<AppState>,
    Json(mut request): Json<NewCoupon>,
) -> Response {
    request.code = normalize_code(&request.code);
    request.description = request.description.trim().to_string();

    match state.engine.add_coupon(request, Utc::now()) {
        Ok(coupon) => (StatusCode::CREATED, Json(coupon)).into_response(),
        Err(err) => err_response(err.to_err_code(), &err.to_string()),
    }
}

pub async fn update_coupon(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(mut patch): Json<CouponPatch>,
) -> Response {
    patch.code = patch.code.as_deref().map(normalize_code);
    patch.description = patch.description.map(|d| d.trim().to_string());

    match state.engine.update_coupon(id, patch) {
        Ok(coupon) => (StatusCode::OK, Json(coupon)).into_response(),
        Err(err) => err_response(err.to_err_code(), &err.to_string()),
    }
}

pub async fn delete_coupon(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    if state.engine.delete_coupon(id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        err_response(StatusCode::NOT_FOUND, &format!("Coupon not found: {id}"))
    }
}

/// Full claim history, oldest first
pub async fn list_claims(Extension(state): Extension<AppState>) -> Json<Vec<ClaimRecord>> {
    let claims = state.engine.list_claims();
    info!(count = claims.len(), "Listing claim history");
    Json(claims)
}

pub async fn health(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        coupons: state.engine.catalog().len(),
        claims: state.engine.claim_count(),
    })
}

/// Coupon codes are stored trimmed and upper-case
fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Create an error response
pub(crate) fn err_response(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": message,
        "status": status.as_u16()
    });

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" summer25 "), "SUMMER25");
        assert_eq!(normalize_code("FreeShip"), "FREESHIP");
        assert_eq!(normalize_code("   "), "");
    }

    #[test]
    fn test_claim_response_json() {
        let failure = ClaimResponse {
            success: false,
            message: "You have already claimed all available coupons.".to_string(),
            coupon: None,
        };
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("coupon").is_none());
    }
}
