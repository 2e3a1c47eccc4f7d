use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::auth::MessageResponse;
use crate::accounts::ContactMessage;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

pub async fn contact_us(
    State(state): State<SharedState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .accounts
        .contact(ContactMessage {
            name: req.name,
            email: req.email,
            message: req.message,
        })
        .await?;

    Ok(MessageResponse::new("Message sent successfully!"))
}
