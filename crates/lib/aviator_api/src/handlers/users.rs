//! User request handlers.

use aviator_core::auth::rate_limit::RateLimitDecision;
use aviator_core::auth::{authentication, registration};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Query, State};
use axum::http::HeaderMap;
use tracing::debug;

use super::required;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ClientIp, bearer_token, optional_json};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    CheckEmailQuery, CheckEmailResponse, CreateUserRequest, MessageResponse, UserInfoRequest,
    UserInfoResponse,
};

/// `POST /api/users/createUser`: finish registration with a one-time code.
pub async fn create_user_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> AppResult<Json<MessageResponse>> {
    let email = required(body.email, "Email, password and OTP are required")?;
    let password = required(body.password, "Email, password and OTP are required")?;
    let otp = required(
        body.otp.map(|o| o.into_string()),
        "Email, password and OTP are required",
    )?;

    registration::create_user(
        state.store.as_ref(),
        registration::NewUser {
            email: &email,
            password: &password,
            full_name: body.full_name.as_deref(),
            otp: &otp,
        },
        state.config.otp_ttl(),
    )
    .await?;

    Ok(Json(MessageResponse::new("User created successfully")))
}

/// `GET /api/users/checkEmail?email=…`: availability check, rate-limited per
/// client address.
pub async fn check_email_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Query(query): Query<CheckEmailQuery>,
) -> AppResult<Json<CheckEmailResponse>> {
    let email = required(query.email, "Email is required")?;

    let decision = state.rate_limiter.check(
        &ip,
        state.config.check_email_limit,
        state.config.check_email_window(),
    );
    if let RateLimitDecision::Limited { retry_after } = decision {
        debug!(ip = %ip, "email check rate limited");
        let retry_after_secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
        return Err(AppError::TooManyRequests { retry_after_secs });
    }

    let taken = state
        .store
        .email_exists(&email)
        .await
        .map_err(|e| AppError::Internal(format!("store: {e}")))?;
    Ok(Json(CheckEmailResponse { available: !taken }))
}

/// `POST /api/users/getUserInfo`: profile for the access token in the body
/// (`token`) or the bearer header.
pub async fn get_user_info_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<UserInfoResponse>> {
    let body: UserInfoRequest = optional_json(&body)?;
    let token = body
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| bearer_token(&headers).map(str::to_string));
    let identity =
        authentication::get_user_info(state.store.as_ref(), &state.tokens, token.as_deref())
            .await?;
    Ok(Json(identity.into()))
}

/// `GET /api/users/me`: profile for the authenticated caller.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserInfoResponse>> {
    let identity = authentication::resolve_identity(state.store.as_ref(), &claims).await?;
    Ok(Json(identity.into()))
}
