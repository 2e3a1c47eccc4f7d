pub mod error;
pub mod reset;

use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use lettre::Address;
use uuid::Uuid;

pub use error::AccountError;
pub use reset::ResetLifecycle;

use crate::auth::jwt::{TokenIssuer, TokenKind};
use crate::auth::password::Hasher;
use crate::config::Config;
use crate::db::AccountStore;
use crate::email::{templates, Mailer, OutgoingEmail};
use crate::models::{Account, NewAccount};

pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Signup, login, password reset and contact, over injected store and mailer handles.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenIssuer,
    hasher: Hasher,
    dummy_hash: String,
    reset: ResetLifecycle,
    frontend_url: String,
    site_name: String,
    contact_to: Option<String>,
    session_ttl: Duration,
    min_password_length: usize,
}

impl AccountService {
    pub fn new(
        config: &Config,
        store: Arc<dyn AccountStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, String> {
        let tokens = TokenIssuer::new(&config.jwt_secret);
        let hasher = Hasher::new(&config.hashing)?;
        let dummy_hash = hasher.hash("accountd-unknown-account")?;
        let reset = ResetLifecycle::new(
            store.clone(),
            tokens.clone(),
            hasher.clone(),
            config.reset_token_ttl,
        );

        Ok(Self {
            store,
            mailer,
            tokens,
            hasher,
            dummy_hash,
            reset,
            frontend_url: config.frontend_url.clone(),
            site_name: config.site_name.clone(),
            contact_to: config
                .contact_to
                .clone()
                .or_else(|| config.smtp.as_ref().map(|smtp| smtp.from.clone())),
            session_ttl: config.session_ttl,
            min_password_length: config.min_password_length,
        })
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AccountError::Validation("All fields are required.".to_string()));
        }
        check_address(&email)?;
        self.check_password_length(password)?;

        let password_hash = self.hasher.hash(password).map_err(AccountError::Internal)?;
        let account = self
            .store
            .create(NewAccount {
                name: name.to_string(),
                email,
                password_hash,
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    /// Returns a session token. Unknown email and wrong password are indistinguishable.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let Some(account) = self.store.find_by_email(&normalize_email(email)).await? else {
            // Spend the same Argon2 work as a wrong password would
            let _ = self.hasher.verify(password, &self.dummy_hash);
            return Err(AccountError::InvalidCredentials);
        };

        let valid = self
            .hasher
            .verify(password, &account.password_hash)
            .map_err(AccountError::Internal)?;
        if !valid {
            return Err(AccountError::InvalidCredentials);
        }

        self.tokens
            .issue(account.id, TokenKind::Session, self.session_ttl)
            .map_err(AccountError::Internal)
    }

    /// Resolves a session token to its account id.
    pub fn authenticate(&self, token: &str) -> Result<Uuid, AccountError> {
        self.tokens
            .verify(token, TokenKind::Session)
            .map_err(|_| AccountError::InvalidToken)
    }

    pub async fn find(&self, id: Uuid) -> Result<Account, AccountError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AccountError::AccountNotFound)
    }

    /// Issues a reset token and emails the link. `AccountNotFound` is for the caller
    /// to hide; the token stays stored even if the send fails.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AccountError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AccountError::Validation("Email is required.".to_string()));
        }

        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        let token = self.reset.issue(&account).await?;
        let reset_url = format!("{}/resetpasswordpage.html?token={token}", self.frontend_url);

        let rendered = templates::render_password_reset(
            &account.name,
            &self.site_name,
            &reset_url,
            self.reset.ttl().num_minutes(),
            Utc::now().year(),
        )
        .map_err(AccountError::Internal)?;

        self.mailer
            .send(OutgoingEmail {
                from_name: Some(format!("{} Support", self.site_name)),
                to: account.email.clone(),
                reply_to: None,
                subject: rendered.subject,
                text: rendered.text,
                html: rendered.html,
            })
            .await
            .map_err(AccountError::Mailer)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), AccountError> {
        if token.is_empty() || password.is_empty() {
            return Err(AccountError::Validation(
                "Token and password are required.".to_string(),
            ));
        }
        self.check_password_length(password)?;

        self.reset.validate_and_consume(token, password).await
    }

    pub async fn contact(&self, msg: ContactMessage) -> Result<(), AccountError> {
        let name = msg.name.trim();
        let email = msg.email.trim();
        if name.is_empty() || email.is_empty() || msg.message.trim().is_empty() {
            return Err(AccountError::Validation("All fields are required.".to_string()));
        }
        check_address(email)?;

        let inbox = self
            .contact_to
            .clone()
            .ok_or_else(|| AccountError::Mailer("No contact inbox configured".to_string()))?;

        let rendered = templates::render_contact(
            name,
            email,
            &msg.message,
            &self.site_name,
            Utc::now().year(),
        )
        .map_err(AccountError::Internal)?;

        self.mailer
            .send(OutgoingEmail {
                from_name: Some("Contact Form".to_string()),
                to: inbox,
                reply_to: Some(email.to_string()),
                subject: rendered.subject,
                text: rendered.text,
                html: rendered.html,
            })
            .await
            .map_err(AccountError::Mailer)
    }

    fn check_password_length(&self, password: &str) -> Result<(), AccountError> {
        if password.chars().count() < self.min_password_length {
            return Err(AccountError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        Ok(())
    }
}

/// Accepts exactly the addresses the mailer can later send to or reply to.
fn check_address(email: &str) -> Result<(), AccountError> {
    email
        .parse::<Address>()
        .map(|_| ())
        .map_err(|_| AccountError::Validation("Invalid email address.".to_string()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
