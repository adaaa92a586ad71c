use axum::extract::State;
use axum::http::StatusCode;

use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::router::AppState;
use crate::inbound::http::session::SessionCookies;

pub async fn logout(
    State(state): State<AppState>,
    mut session: SessionCookies,
) -> (SessionCookies, ApiSuccess<MessageData>) {
    state.account_service.logout(&mut session).await;

    (
        session,
        ApiSuccess::new(StatusCode::OK, MessageData::new("Logged out")),
    )
}
