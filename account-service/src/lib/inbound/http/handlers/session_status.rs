use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::inbound::http::session::SessionCookies;

pub async fn session_status(
    State(state): State<AppState>,
    session: SessionCookies,
) -> ApiSuccess<SessionStatusData> {
    let authenticated = state.account_service.has_active_session(&session).await;

    ApiSuccess::new(StatusCode::OK, SessionStatusData { authenticated })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatusData {
    pub authenticated: bool,
}
