use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::{AccountStore, StoreError};
use crate::models::{Account, NewAccount, PendingReset};

/// In-process account store. Each account's entry lock makes the conditional
/// consume a single atomic step, matching the guarantees of the SQL store.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<Uuid, Account>,
    emails: DashMap<String, Uuid>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id_and_reset_token(
        &self,
        id: Uuid,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(&id).and_then(|entry| {
            let account = entry.value();
            account
                .reset
                .as_ref()
                .filter(|reset| reset.accepts(token, now))
                .map(|_| account.clone())
        }))
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        match self.emails.entry(account.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateEmail),
            Entry::Vacant(slot) => {
                let created = Account {
                    id: Uuid::now_v7(),
                    name: account.name,
                    email: account.email,
                    password_hash: account.password_hash,
                    reset: None,
                    created_at: Utc::now(),
                };
                self.accounts.insert(created.id, created.clone());
                slot.insert(created.id);
                Ok(created)
            }
        }
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(mut entry) = self.accounts.get_mut(&id) else {
            return Ok(false);
        };
        entry.reset = Some(PendingReset {
            token: token.to_string(),
            expires_at,
        });
        Ok(true)
    }

    async fn consume_reset_token(
        &self,
        id: Uuid,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let Some(mut entry) = self.accounts.get_mut(&id) else {
            return Ok(false);
        };
        let account = entry.value_mut();
        if !account.reset.as_ref().is_some_and(|r| r.accepts(token, now)) {
            return Ok(false);
        }
        account.password_hash = password_hash.to_string();
        account.reset = None;
        Ok(true)
    }
}
