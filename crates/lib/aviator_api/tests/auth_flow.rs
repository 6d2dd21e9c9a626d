//! Integration tests: build the router over an in-memory store and a
//! recording mailer, then drive the registration and session endpoints.

use std::sync::Arc;

use aviator_api::{AppState, config::ApiConfig};
use aviator_core::mail::OutboxMailer;
use aviator_core::store::{CredentialStore, MemoryCredentialStore};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

const PASSWORD: &str = "Str0ng!Pass";

struct Harness {
    app: Router,
    outbox: Arc<OutboxMailer>,
    store: Arc<MemoryCredentialStore>,
}

fn harness() -> Harness {
    let config = ApiConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-secret".into()),
        _ => None,
    })
    .expect("config");
    let store = Arc::new(MemoryCredentialStore::new());
    let outbox = Arc::new(OutboxMailer::new());
    let state = AppState::new(config, store.clone(), outbox.clone()).expect("state");
    Harness {
        app: aviator_api::router(state),
        outbox,
        store,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("parse JSON")
    };
    (status, headers, json)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn request_code(h: &Harness, email: &str) -> String {
    let (status, _, body) = send(&h.app, post("/api/otp/generate", json!({ "email": email }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "OTP generated successfully");
    let mail = h.outbox.last_to(email).await.expect("code mailed");
    mail.text
        .strip_prefix("Your OTP is ")
        .expect("code in text body")
        .to_string()
}

async fn register(h: &Harness, email: &str) {
    let otp = request_code(h, email).await;
    let (status, _, body) = send(
        &h.app,
        post(
            "/api/users/createUser",
            json!({ "email": email, "password": PASSWORD, "otp": otp }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "User created successfully");
}

async fn refresh_token(h: &Harness, email: &str) -> String {
    let (status, _, body) = send(
        &h.app,
        post(
            "/api/sessions/getRefreshToken",
            json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().expect("token").to_string()
}

async fn access_token(h: &Harness, refresh: &str) -> String {
    let (status, _, body) = send(
        &h.app,
        post("/api/sessions/login", json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn full_registration_and_session_flow() {
    let h = harness();
    register(&h, "alice.smith@example.com").await;

    let refresh = refresh_token(&h, "alice.smith@example.com").await;
    let access = access_token(&h, &refresh).await;

    let (status, _, body) = send(
        &h.app,
        post("/api/users/getUserInfo", json!({ "token": access })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["email"], "alice.smith@example.com");
    assert_eq!(body["fullName"], "alice smith");
    assert!(body["id"].is_i64());
}

#[tokio::test]
async fn refresh_token_can_be_exchanged_more_than_once() {
    let h = harness();
    register(&h, "bob@example.com").await;
    let refresh = refresh_token(&h, "bob@example.com").await;

    access_token(&h, &refresh).await;
    access_token(&h, &refresh).await;
}

#[tokio::test]
async fn login_accepts_bearer_refresh_token() {
    let h = harness();
    register(&h, "carol@example.com").await;
    let refresh = refresh_token(&h, "carol@example.com").await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/sessions/login")
        .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn token_kinds_are_not_interchangeable() {
    let h = harness();
    register(&h, "dave@example.com").await;
    let refresh = refresh_token(&h, "dave@example.com").await;
    let access = access_token(&h, &refresh).await;

    let (status, _, body) = send(
        &h.app,
        post("/api/users/getUserInfo", json!({ "token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _, body) = send(
        &h.app,
        post("/api/sessions/login", json!({ "refreshToken": access })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_share_a_response() {
    let h = harness();
    register(&h, "erin@example.com").await;

    let (wrong_status, _, wrong) = send(
        &h.app,
        post(
            "/api/sessions/getRefreshToken",
            json!({ "email": "erin@example.com", "password": "Wr0ng!Pass" }),
        ),
    )
    .await;
    let (unknown_status, _, unknown) = send(
        &h.app,
        post(
            "/api/sessions/getRefreshToken",
            json!({ "email": "nobody@example.com", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn wrong_code_is_rejected_and_nothing_is_created() {
    let h = harness();
    let otp = request_code(&h, "frank@example.com").await;
    let wrong = if otp == "0000" { "1111" } else { "0000" };

    let (status, _, body) = send(
        &h.app,
        post(
            "/api/users/createUser",
            json!({ "email": "frank@example.com", "password": PASSWORD, "otp": wrong }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid OTP or email");
    assert_eq!(h.store.identity_count().await, 0);
}

#[tokio::test]
async fn numeric_code_is_accepted() {
    let h = harness();
    h.store.insert_otp("gina@example.com", "4821").await.unwrap();

    let (status, _, body) = send(
        &h.app,
        post(
            "/api/users/createUser",
            json!({ "email": "gina@example.com", "password": PASSWORD, "otp": 4821, "fullName": "Gina G" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(h.store.identity_count().await, 1);
}

#[tokio::test]
async fn weak_password_is_rejected() {
    let h = harness();
    let otp = request_code(&h, "hank@example.com").await;

    let (status, _, body) = send(
        &h.app,
        post(
            "/api/users/createUser",
            json!({ "email": "hank@example.com", "password": "password", "otp": otp }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(h.store.identity_count().await, 0);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let h = harness();
    register(&h, "ivy@example.com").await;
    let otp = request_code(&h, "ivy@example.com").await;

    let (status, _, body) = send(
        &h.app,
        post(
            "/api/users/createUser",
            json!({ "email": "ivy@example.com", "password": PASSWORD, "otp": otp }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");
    assert_eq!(h.store.identity_count().await, 1);
}

#[tokio::test]
async fn missing_fields_are_bad_requests() {
    let h = harness();
    let cases = [
        ("/api/otp/generate", json!({})),
        ("/api/users/createUser", json!({ "email": "a@x.com", "password": PASSWORD })),
        ("/api/sessions/getRefreshToken", json!({ "email": "a@x.com" })),
    ];
    for (uri, body) in cases {
        let (status, _, resp) = send(&h.app, post(uri, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {resp}");
        assert_eq!(resp["error"], "validation_error");
    }

    let (status, _, _) = send(&h.app, get("/api/users/checkEmail")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let h = harness();
    let req = Request::builder()
        .method("POST")
        .uri("/api/otp/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn check_email_reports_availability() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/users/checkEmail?email=jo%40example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);

    register(&h, "jo@example.com").await;
    let (_, _, body) = send(&h.app, get("/api/users/checkEmail?email=jo%40example.com")).await;
    assert_eq!(body["available"], false);
}

#[tokio::test]
async fn check_email_is_rate_limited_per_client() {
    let h = harness();
    let lookup = |ip: &str| {
        Request::builder()
            .uri("/api/users/checkEmail?email=someone%40example.com")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..5 {
        let (status, _, _) = send(&h.app, lookup("203.0.113.9")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = send(&h.app, lookup("203.0.113.9")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
    let retry: u64 = headers[header::RETRY_AFTER].to_str().unwrap().parse().unwrap();
    assert!((1..=2).contains(&retry));

    // Other clients keep their own budget.
    let (status, _, _) = send(&h.app, lookup("198.51.100.1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn me_requires_bearer_access_token() {
    let h = harness();
    register(&h, "kim@example.com").await;
    let refresh = refresh_token(&h, "kim@example.com").await;
    let access = access_token(&h, &refresh).await;

    let (status, _, body) = send(&h.app, get("/api/users/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let with = |token: &str| {
        Request::builder()
            .uri("/api/users/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _, _) = send(&h.app, with(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = send(&h.app, with(&access)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["email"], "kim@example.com");
}

#[tokio::test]
async fn get_user_info_without_token_is_unauthorized() {
    let h = harness();
    let req = Request::builder()
        .method("POST")
        .uri("/api/users/getUserInfo")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn health_reports_store_status() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storeConnected"], true);
    assert!(body["timestamp"].is_string());
}
