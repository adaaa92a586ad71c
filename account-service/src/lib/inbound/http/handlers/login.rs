use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::CommandError;
use crate::domain::account::models::LoginCommand;
use crate::inbound::http::router::AppState;
use crate::inbound::http::session::SessionCookies;

pub async fn login(
    State(state): State<AppState>,
    mut session: SessionCookies,
    Json(body): Json<LoginRequest>,
) -> Result<(SessionCookies, ApiSuccess<LoginResponseData>), ApiError> {
    let token = state
        .account_service
        .login(body.try_into_command()?, &mut session)
        .await?;

    Ok((
        session,
        ApiSuccess::new(StatusCode::OK, LoginResponseData { token }),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, CommandError> {
        LoginCommand::new(self.email, self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
}
