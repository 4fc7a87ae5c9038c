pub mod api;
pub mod app_state;
pub mod config;
pub mod coupon;

use axum::Router;
use axum::extract::Extension;
use axum::routing::{get, post};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

//
// Re-export
//
pub use api::{ClaimResponse, ClientIdentity, HealthResponse};
pub use app_state::AppState;
pub use config::{Config, SeedCoupon};
pub use coupon::{
    COOLDOWN_PERIOD, CatalogError, ClaimError, ClaimRecord, Coupon, CouponEngine, CouponPatch,
    NewCoupon,
};

/// Public routes: claiming and the caller's own history
pub fn public_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/claim", post(api::claim_coupon))
        .route("/claims/mine", get(api::my_claims))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            api::client_identity_middleware,
        ))
        .route("/health", get(api::health))
        .layer(axum::middleware::from_fn(api::log_request_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state))
}

/// Internal routes: catalog management and the claim ledger (no auth, keep off the public network)
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/coupons", get(api::list_coupons).post(api::create_coupon))
        .route(
            "/coupons/{id}",
            get(api::get_coupon)
                .patch(api::update_coupon)
                .delete(api::delete_coupon),
        )
        .route("/claims", get(api::list_claims))
        .route("/health", get(api::health))
        .layer(axum::middleware::from_fn(api::log_request_errors))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(&config)?;

    let public_app = public_router(state.clone());
    let admin_app = admin_router(state);

    let public_addr = format!("0.0.0.0:{}", config.listen_on_port);
    let public_listener = TcpListener::bind(&public_addr).await?;
    info!("Public API listening on {public_addr}");

    let internal_addr = format!("0.0.0.0:{}", config.internal_port);
    let internal_listener = TcpListener::bind(&internal_addr).await?;
    info!("Internal API listening on {internal_addr}");

    // Run both servers concurrently
    tokio::select! {
        result = axum::serve(
            public_listener,
            public_app.into_make_service_with_connect_info::<SocketAddr>(),
        ) => result?,
        result = axum::serve(internal_listener, admin_app) => result?,
    }

    Ok(())
}
