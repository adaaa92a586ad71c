use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::router::AppState;
use crate::inbound::http::session::SessionCookies;

pub async fn current_user(
    State(state): State<AppState>,
    session: SessionCookies,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .account_service
        .fetch_current_user_from_cookie(&session)
        .await
        .map_err(ApiError::from)
        .map(|ref profile| ApiSuccess::new(StatusCode::OK, profile.into()))
}
