use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::account::errors::CommandError;
use crate::domain::account::models::RequestResetCommand;
use crate::inbound::http::router::AppState;

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .account_service
        .request_password_reset(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageData::new("Check your inbox for the reset link"),
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    email: String,
}

impl ForgotPasswordRequest {
    fn try_into_command(self) -> Result<RequestResetCommand, CommandError> {
        RequestResetCommand::new(self.email)
    }
}
