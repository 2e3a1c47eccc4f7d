pub mod auth;
pub mod contact;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/welcome", get(auth::welcome))
        // Accounts
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        .route("/api/forgot-password", post(auth::forgot_password))
        .route("/api/reset-password", post(auth::reset_password))
        .route("/api/me", get(auth::me))
        // Contact
        .route("/api/contact-us", post(contact::contact_us))
}
