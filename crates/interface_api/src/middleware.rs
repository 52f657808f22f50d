//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use domain_access::Actor;

use crate::auth::validate_token;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token, re-reads the user row and injects the
/// resolved [`Actor`] into request extensions. Reloading the user on every
/// request means deactivation and role changes bite immediately instead of
/// at token expiry.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            warn!("Missing or invalid Authorization header");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let claims = match validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Token validation failed: {:?}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let user_id = claims
        .sub
        .parse()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let user = state
        .users
        .get(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if !user.active {
        warn!(username = %user.username, "inactive user presented a valid token");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let actor: Actor = user.actor();
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Request logging middleware
///
/// Emits one structured line per request with actor, status and latency.
pub async fn request_log_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let actor = request
        .extensions()
        .get::<Actor>()
        .map(|a| a.name.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();
    let response = next.run(request).await;
    let duration = Utc::now() - start;

    info!(
        method = %method,
        uri = %uri,
        actor = %actor,
        status = %response.status().as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
