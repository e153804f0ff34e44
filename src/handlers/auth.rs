use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::handlers::extract::AuthUser;
use crate::models::user::User;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Deserialize)]
pub struct SignupPayload {
    pub full_name: String,
    pub student_number: String,
    pub email: String,
    pub password: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<Response, AppError> {
    if payload.full_name.trim().is_empty() || payload.student_number.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Please fill in all required fields".to_string(),
        ));
    }

    let dispatch = state
        .auth()
        .signup(
            payload.full_name.trim(),
            payload.student_number.trim(),
            payload.email.trim(),
            &payload.password,
        )
        .await?;

    Ok(created(
        dispatch,
        "Verification code sent to your email. Please check your inbox",
    )
    .into_response())
}

#[derive(Deserialize)]
pub struct VerifyEmailPayload {
    pub email: String,
    pub otp: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailPayload>,
) -> Result<Response, AppError> {
    state
        .auth()
        .verify_email(payload.email.trim(), payload.otp.trim())
        .await?;
    Ok(empty_success("Email verified. You can now log in").into_response())
}

#[derive(Deserialize)]
pub struct EmailPayload {
    pub email: String,
}

pub async fn resend_verification(
    State(state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<Response, AppError> {
    let dispatch = state.auth().resend_verification(payload.email.trim()).await?;
    Ok(success(dispatch, "New verification code sent to your email").into_response())
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, AppError> {
    let (token, user) = state
        .auth()
        .login(payload.email.trim(), &payload.password)
        .await?;
    Ok(success(LoginResponse { token, user }, "Login successful").into_response())
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<Response, AppError> {
    // Never reveal whether the address has an account
    let dispatch = state.auth().forgot_password(payload.email.trim()).await?;
    Ok(success(
        dispatch,
        "If this email is registered, you will receive a password reset code",
    )
    .into_response())
}

#[derive(Deserialize)]
pub struct ResetPasswordPayload {
    pub email: String,
    pub otp: String,
    pub password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Response, AppError> {
    state
        .auth()
        .reset_password(payload.email.trim(), payload.otp.trim(), &payload.password)
        .await?;
    Ok(empty_success("Password reset successful. Please log in with your new password")
        .into_response())
}

pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Response, AppError> {
    let account = state.auth().current_user(user.id).await?;
    Ok(success(account, "Current account").into_response())
}
