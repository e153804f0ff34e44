pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod extract;
pub mod feedback;
pub mod registrations;
pub mod requests;
pub mod requirements;

use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "campus-events-api",
    };

    success(payload, "Health check successful").into_response()
}
