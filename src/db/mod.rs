pub mod accounts;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Account, NewAccount};

pub use accounts::PgAccountStore;
pub use memory::MemoryAccountStore;

#[derive(Debug)]
pub enum StoreError {
    DuplicateEmail,
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DuplicateEmail => write!(f, "Email already registered"),
            StoreError::Backend(msg) => write!(f, "Store error: {msg}"),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Persistent home of account records.
///
/// Emails are compared exactly; callers normalize them before reaching the store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Returns the account only if its pending reset holds `token` and expires after `now`.
    async fn find_by_id_and_reset_token(
        &self,
        id: Uuid,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError>;

    /// Inserts a new account. Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Replaces any pending reset on the account. Returns false if no such account exists.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Atomically swaps in `password_hash` and clears the pending reset, but only while
    /// the stored token equals `token` and has not expired at `now`.
    ///
    /// Returns false when the condition did not hold, so at most one caller wins.
    async fn consume_reset_token(
        &self,
        id: Uuid,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, StoreError>;
}
