use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset: Option<PendingReset>,
    pub created_at: DateTime<Utc>,
}

/// A password reset awaiting consumption. Token and expiry only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReset {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingReset {
    /// True when `token` is the stored value and the stored expiry is still ahead of `now`.
    pub fn accepts(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.token == token && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
