use crate::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Session cookie lifetime: one year
pub const SESSION_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_ADDRESS: &str = "unknown";

pub async fn log_request_errors(req: Request, next: Next) -> Response {
    let uri = req.uri().clone();
    let method = req.method().clone();

    let response = next.run(req).await;
    let status = response.status();
    if status.is_client_error() {
        // 4xx error
        warn!(
            method = %method,
            uri = %uri,
            status = %status,
            "Client error"
        );
    } else if status.is_server_error() {
        // 5xx error
        error!(
            method = %method,
            uri = %uri,
            status = %status,
            "Server error"
        );
    }

    response
}

/// Who is asking, as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub network_address: String,
    pub user_agent: String,
    pub session_token: String,
}

/// Middleware resolving the caller's address, user agent and session token.
///
/// A client without a session cookie gets a fresh token, returned as a
/// long-lived cookie on the response.
pub async fn client_identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let network_address = state
        .trust_forwarded_for
        .then(|| forwarded_for(req.headers()))
        .flatten()
        .or(peer)
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let existing = session_from_cookies(req.headers(), &state.session_cookie);
    let issued = existing.is_none();
    let session_token = existing.unwrap_or_else(|| Uuid::new_v4().to_string());

    debug!(%network_address, issued, "Resolved client identity");

    req.extensions_mut().insert(ClientIdentity {
        network_address,
        user_agent,
        session_token: session_token.clone(),
    });

    let mut response = next.run(req).await;

    if issued {
        let cookie = session_cookie(&state.session_cookie, &session_token);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(error) => error!(?error, "Failed to build session cookie"),
        }
    }

    response
}

/// First hop of `X-Forwarded-For`, if any
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_FOR)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Find a non-empty cookie named `name` across all `Cookie` headers
fn session_from_cookies(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn session_cookie(name: &str, token: &str) -> String {
    format!("{name}={token}; Max-Age={SESSION_MAX_AGE_SECS}; Path=/; HttpOnly; SameSite=Lax")
}
