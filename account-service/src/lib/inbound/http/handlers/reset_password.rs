use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::account::errors::CommandError;
use crate::domain::account::models::CompleteResetCommand;
use crate::inbound::http::router::AppState;

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .account_service
        .complete_password_reset(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageData::new("Password updated, please login"),
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    user_id: String,
}

impl ResetPasswordRequest {
    fn try_into_command(self) -> Result<CompleteResetCommand, CommandError> {
        CompleteResetCommand::new(self.password, self.confirm_password, self.token, self.user_id)
    }
}
