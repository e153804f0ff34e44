use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    attendance, auth, dashboard, events, feedback, health_check, registrations, requests,
    requirements,
};

pub fn create_routes(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/me", get(auth::me));

    let event_routes = Router::new()
        .route("/", get(events::browse_events).post(events::create_event))
        .route("/history", get(events::event_history))
        .route("/:id", get(events::get_event))
        .route("/:id/cancel", post(events::cancel_event))
        .route("/:id/postpone", post(events::postpone_event))
        .route("/:id/register", post(registrations::register_for_event))
        .route("/:id/registrations", get(registrations::event_registrations))
        .route("/:id/attendance", get(attendance::attendance_report))
        .route("/:id/feedback", get(feedback::event_feedback))
        .route(
            "/:id/requirements",
            get(requirements::list_requirements).post(requirements::add_requirement),
        );

    let request_routes = Router::new()
        .route("/", post(requests::submit_request).get(requests::my_requests))
        .route("/all", get(requests::all_requests))
        .route(
            "/:id",
            get(requests::get_request)
                .put(requests::edit_request)
                .delete(requests::delete_request),
        )
        .route("/:id/cancel", post(requests::cancel_request))
        .route("/:id/approve", post(requests::approve_request))
        .route("/:id/reject", post(requests::reject_request));

    let registration_routes = Router::new()
        .route("/", get(registrations::my_registrations))
        .route(
            "/:id",
            get(registrations::my_registration).delete(registrations::cancel_registration),
        )
        .route("/:id/approve", post(registrations::approve_registration))
        .route("/:id/reject", post(registrations::reject_registration))
        .route("/:id/requirements", get(requirements::my_checklist))
        .route(
            "/:id/requirements/review",
            get(requirements::review_checklist),
        )
        .route(
            "/:id/requirements/:req_id/submit",
            post(requirements::mark_submitted),
        )
        .route(
            "/:id/requirements/:req_id/verify",
            post(requirements::set_verified),
        )
        .route(
            "/:id/feedback",
            post(feedback::submit_feedback).get(feedback::my_feedback),
        );

    let attendance_routes = Router::new()
        .route("/scannable", get(attendance::scannable_events))
        .route("/check-in", post(attendance::check_in));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/events", event_routes)
        .nest("/requests", request_routes)
        .nest("/registrations", registration_routes)
        .nest("/attendance", attendance_routes)
        .route("/manage/events", get(events::manage_events))
        .route("/feedback/history", get(feedback::feedback_history))
        .route("/dashboard", get(dashboard::dashboard));

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state);

    create_security_headers_layer(router)
}
