//! # aviator_api
//!
//! HTTP API library for Aviator.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use aviator_core::auth::AuthError;
use aviator_core::auth::jwt::TokenService;
use aviator_core::auth::rate_limit::RateLimiter;
use aviator_core::mail::Mailer;
use aviator_core::store::CredentialStore;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{health, otp, sessions, users};

pub use aviator_core::migrate::migrate;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity and one-time-code persistence.
    pub store: Arc<dyn CredentialStore>,
    /// Outbound email.
    pub mailer: Arc<dyn Mailer>,
    /// Token signing and verification.
    pub tokens: TokenService,
    /// Throttle for the email-availability check.
    pub rate_limiter: Arc<RateLimiter>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Build state from config. Fails if the signing secret is unusable.
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, AuthError> {
        let tokens = TokenService::new(config.jwt_secret.as_bytes())?;
        Ok(Self {
            store,
            mailer,
            tokens,
            rate_limiter: Arc::new(RateLimiter::new()),
            config,
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::POST_API_OTP_GENERATE, post(otp::generate_otp_handler))
        .route(
            routes::POST_API_USERS_CREATE_USER,
            post(users::create_user_handler),
        )
        .route(
            routes::GET_API_USERS_CHECK_EMAIL,
            get(users::check_email_handler),
        )
        .route(
            routes::POST_API_USERS_GET_USER_INFO,
            post(users::get_user_info_handler),
        )
        .route(
            routes::POST_API_SESSIONS_GET_REFRESH_TOKEN,
            post(sessions::get_refresh_token_handler),
        )
        .route(routes::POST_API_SESSIONS_LOGIN, post(sessions::login_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_API_USERS_ME, get(users::me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
