//! HTTP request layer.
//!
//! Thin translation between HTTP and controller commands. No decision logic
//! lives here: status codes are a direct function of the controller's answer.
//!
//! | Route            | Success                     | Failure                              |
//! |------------------|-----------------------------|--------------------------------------|
//! | `GET /challenge` | `200` token as text         | `503` entropy or controller down     |
//! | `POST /response` | `200 Unlocked`              | `401` rejected, `400` malformed      |
//! | `GET /status`    | `200` JSON status snapshot  | `503` controller down                |
//!
//! Rejections all look the same from outside. Whether the challenge was
//! stale, missing, or simply wrong stays in the controller's logs.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use lockgate_core::{LockError, VerifyOutcome};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::controller::{ControllerError, ControllerHandle};

/// Build the lock's HTTP routes around a controller handle.
pub fn router(handle: ControllerHandle) -> Router {
    Router::new()
        .route("/challenge", get(get_challenge))
        .route("/response", post(post_response))
        .route("/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(handle)
}

async fn get_challenge(State(handle): State<ControllerHandle>) -> Response {
    match handle.issue_challenge().await {
        Ok(challenge) => challenge.into_string().into_response(),
        Err(error) => error_response(&error),
    }
}

async fn post_response(State(handle): State<ControllerHandle>, body: Bytes) -> Response {
    match handle.verify(Vec::from(body)).await {
        Ok(VerifyOutcome::Accepted) => (StatusCode::OK, "Unlocked").into_response(),
        Ok(VerifyOutcome::Rejected(reason)) => {
            debug!(?reason, "responding 401");
            (StatusCode::UNAUTHORIZED, "Invalid token").into_response()
        },
        Err(error) => error_response(&error),
    }
}

async fn get_status(State(handle): State<ControllerHandle>) -> Response {
    match handle.status().await {
        Ok(status) => Json(status).into_response(),
        Err(error) => error_response(&error),
    }
}

fn error_response(error: &ControllerError) -> Response {
    let (status, message) = match error {
        ControllerError::Lock(LockError::EmptyResponse) => {
            (StatusCode::BAD_REQUEST, "No response data received")
        },
        ControllerError::Lock(LockError::ResponseTooLong { .. }) => {
            (StatusCode::BAD_REQUEST, "Response too long")
        },
        ControllerError::Lock(LockError::Env(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "Entropy source unavailable")
        },
        ControllerError::Closed => (StatusCode::SERVICE_UNAVAILABLE, "Lock controller unavailable"),
    };
    (status, message).into_response()
}
