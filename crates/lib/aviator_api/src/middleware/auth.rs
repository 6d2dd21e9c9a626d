//! Authentication middleware: Bearer token extraction and session check.

use aviator_core::auth::session::require_session;
use aviator_core::models::auth::TokenClaims;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::AppState;
use crate::error::AppError;
use crate::extract::bearer_token;

/// Key used to store `TokenClaims` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

/// Axum middleware: extracts `Authorization: Bearer <token>`, runs the session
/// guard, and injects `AuthenticatedUser` into request extensions. A missing
/// header is rejected the same way as a bad token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers());
    let claims = require_session(&state.tokens, token).map_err(|e| {
        debug!(path = %request.uri().path(), "session rejected");
        AppError::from(e)
    })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}
