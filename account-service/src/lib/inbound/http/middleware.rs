use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::handlers::ApiError;
use super::session::SESSION_COOKIE;
use crate::domain::account::models::UserId;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated user in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Middleware that requires a valid session token, taken from the session
/// cookie or from an `Authorization: Bearer` header. The cookie is tried
/// first; a cookie that fails validation falls back to the header.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let cookie = cookie_token(&req);
    let bearer = match bearer_token(&req) {
        Ok(bearer) => bearer,
        Err(response) if cookie.is_none() => return Err(response),
        Err(_) => None,
    };

    if cookie.is_none() && bearer.is_none() {
        return Err(unauthorized("No active session"));
    }

    let user_id = cookie
        .iter()
        .chain(bearer.iter())
        .find_map(|token| validate(&state, token))
        .ok_or_else(|| unauthorized("Invalid session"))?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

fn validate(state: &AppState, token: &str) -> Option<UserId> {
    let claims = state
        .authenticator
        .validate_session(token)
        .map_err(|e| tracing::warn!(error = %e, "Session validation failed"))
        .ok()?;

    UserId::from_string(&claims.sub)
        .map_err(|e| tracing::error!(error = %e, "Failed to parse user ID from session"))
        .ok()
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}

fn cookie_token(req: &Request) -> Option<String> {
    CookieJar::from_headers(req.headers())
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn bearer_token(req: &Request) -> Result<Option<String>, Response> {
    let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(|token| Some(token.to_string()))
        .ok_or_else(|| {
            unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
        })
}
