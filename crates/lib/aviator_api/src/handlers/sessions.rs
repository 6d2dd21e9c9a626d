//! Session request handlers.

use aviator_core::auth::authentication;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;

use super::required;
use crate::AppState;
use crate::error::{AppError, AppResult, INVALID_CREDENTIALS};
use crate::extract::{ApiJson, bearer_token, optional_json};
use crate::models::{GetRefreshTokenRequest, LoginRequest, TokenResponse};

/// `POST /api/sessions/getRefreshToken`: email + password → refresh token.
pub async fn get_refresh_token_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GetRefreshTokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let email = required(body.email, "Email and password are required")?;
    let password = required(body.password, "Email and password are required")?;
    let token = authentication::get_refresh_token(
        state.store.as_ref(),
        &state.tokens,
        &email,
        &password,
    )
    .await?;
    Ok(Json(TokenResponse { token }))
}

/// `POST /api/sessions/login`: refresh token → access token.
///
/// The refresh token is read from `refreshToken` in the body, falling back to
/// an `Authorization: Bearer` header.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<TokenResponse>> {
    let body: LoginRequest = optional_json(&body)?;
    let refresh_token = body
        .refresh_token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| bearer_token(&headers).map(str::to_string))
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;
    let token = authentication::login(&state.tokens, &refresh_token)?;
    Ok(Json(TokenResponse { token }))
}
