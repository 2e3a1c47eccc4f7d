use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountError;
use crate::auth::extractor::AuthAccount;
use crate::error::AppError;
use crate::models::Account;
use crate::state::SharedState;

const RESET_SENT: &str = "If that email is registered, a password reset link has been sent.";

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

pub async fn welcome() -> Json<MessageResponse> {
    MessageResponse::new("Welcome to our API!")
}

pub async fn signup(
    State(state): State<SharedState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .accounts
        .signup(&req.name, &req.email, &req.password)
        .await?;

    Ok(MessageResponse::new("User registered successfully"))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = state.accounts.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token,
        message: "User login successfully".to_string(),
    }))
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // Unknown emails get the same answer as known ones
    match state.accounts.forgot_password(&req.email).await {
        Ok(()) => {}
        Err(AccountError::AccountNotFound) => {
            tracing::debug!("Password reset requested for unknown email");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(MessageResponse::new(RESET_SENT))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .accounts
        .reset_password(&req.token, &req.password)
        .await?;

    Ok(MessageResponse::new("Password has been reset successfully."))
}

pub async fn me(
    State(state): State<SharedState>,
    auth: AuthAccount,
) -> Result<Json<Account>, AppError> {
    let account = state.accounts.find(auth.account_id).await?;
    Ok(Json(account))
}
