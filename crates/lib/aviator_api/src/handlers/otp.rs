//! One-time code request handler.

use aviator_core::auth::registration;
use axum::Json;
use axum::extract::State;

use super::required;
use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::models::{GenerateOtpRequest, MessageResponse};

/// `POST /api/otp/generate`: issue and mail a code, registered or not.
pub async fn generate_otp_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GenerateOtpRequest>,
) -> AppResult<Json<MessageResponse>> {
    let email = required(body.email, "Email is required")?;
    registration::issue_otp(state.store.as_ref(), state.mailer.as_ref(), &email).await?;
    Ok(Json(MessageResponse::new("OTP generated successfully")))
}
