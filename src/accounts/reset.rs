use std::sync::Arc;

use chrono::{Duration, Utc};

use super::AccountError;
use crate::auth::jwt::{TokenIssuer, TokenKind};
use crate::auth::password::Hasher;
use crate::db::AccountStore;
use crate::models::Account;

/// Issues and consumes password-reset tokens.
///
/// A token is honoured only while three things hold: its signature and embedded
/// expiry verify, it is the value currently stored on the account, and the stored
/// expiry is still in the future. Issuing a new token overwrites the stored value,
/// which retires any earlier one.
#[derive(Clone)]
pub struct ResetLifecycle {
    store: Arc<dyn AccountStore>,
    tokens: TokenIssuer,
    hasher: Hasher,
    ttl: Duration,
}

impl ResetLifecycle {
    pub fn new(
        store: Arc<dyn AccountStore>,
        tokens: TokenIssuer,
        hasher: Hasher,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a reset token for `account` and stores it, superseding any pending reset.
    pub async fn issue(&self, account: &Account) -> Result<String, AccountError> {
        let token = self
            .tokens
            .issue(account.id, TokenKind::Reset, self.ttl)
            .map_err(AccountError::Internal)?;
        let expires_at = Utc::now() + self.ttl;

        if !self
            .store
            .set_reset_token(account.id, &token, expires_at)
            .await?
        {
            return Err(AccountError::AccountNotFound);
        }

        tracing::info!(account_id = %account.id, %expires_at, "Password reset issued");
        Ok(token)
    }

    /// Sets `new_password` on the token's account and retires the token, at most once.
    pub async fn validate_and_consume(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        if token.is_empty() {
            return Err(AccountError::InvalidToken);
        }

        let account_id = self.tokens.verify(token, TokenKind::Reset).map_err(|e| {
            tracing::debug!("Reset token rejected: {e}");
            AccountError::InvalidToken
        })?;

        self.store
            .find_by_id_and_reset_token(account_id, token, Utc::now())
            .await?
            .ok_or(AccountError::InvalidOrExpiredToken)?;

        let password_hash = self
            .hasher
            .hash(new_password)
            .map_err(AccountError::Internal)?;

        // Re-checked inside the update: a concurrent consumer may have won since the lookup.
        let consumed = self
            .store
            .consume_reset_token(account_id, token, Utc::now(), &password_hash)
            .await?;
        if !consumed {
            return Err(AccountError::InvalidOrExpiredToken);
        }

        tracing::info!(%account_id, "Password reset consumed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashingConfig;
    use crate::db::MemoryAccountStore;
    use crate::models::NewAccount;

    struct Fixture {
        store: Arc<MemoryAccountStore>,
        hasher: Hasher,
        reset: ResetLifecycle,
    }

    fn fixture(ttl: Duration) -> Fixture {
        let store = Arc::new(MemoryAccountStore::new());
        let hasher = Hasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let reset = ResetLifecycle::new(
            store.clone(),
            TokenIssuer::new("reset-test-secret"),
            hasher.clone(),
            ttl,
        );
        Fixture {
            store,
            hasher,
            reset,
        }
    }

    async fn account(fx: &Fixture) -> Account {
        fx.store
            .create(NewAccount {
                name: "Ada".to_string(),
                email: "a@x.com".to_string(),
                password_hash: fx.hasher.hash("p1-password").unwrap(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn issue_then_consume_sets_password_and_clears_reset() {
        let fx = fixture(Duration::minutes(15));
        let account = account(&fx).await;

        let before = Utc::now();
        let token = fx.reset.issue(&account).await.unwrap();
        let pending = fx.store.find_by_id(account.id).await.unwrap().unwrap().reset.unwrap();
        assert_eq!(pending.token, token);
        assert!(pending.expires_at > before + Duration::minutes(14));
        assert!(pending.expires_at <= Utc::now() + Duration::minutes(15));

        fx.reset.validate_and_consume(&token, "p2-password").await.unwrap();

        let stored = fx.store.find_by_id(account.id).await.unwrap().unwrap();
        assert!(stored.reset.is_none());
        assert!(fx.hasher.verify("p2-password", &stored.password_hash).unwrap());
        assert!(!fx.hasher.verify("p1-password", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn second_consume_fails() {
        let fx = fixture(Duration::minutes(15));
        let account = account(&fx).await;
        let token = fx.reset.issue(&account).await.unwrap();

        fx.reset.validate_and_consume(&token, "p2-password").await.unwrap();
        let err = fx
            .reset
            .validate_and_consume(&token, "p3-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn reissue_invalidates_earlier_token() {
        let fx = fixture(Duration::minutes(15));
        let account = account(&fx).await;

        let first = fx.reset.issue(&account).await.unwrap();
        let second = fx.reset.issue(&account).await.unwrap();
        assert_ne!(first, second);

        let err = fx
            .reset
            .validate_and_consume(&first, "p2-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidOrExpiredToken));

        fx.reset.validate_and_consume(&second, "p2-password").await.unwrap();
    }

    #[tokio::test]
    async fn stored_expiry_is_enforced_independently() {
        let fx = fixture(Duration::minutes(15));
        let account = account(&fx).await;
        let token = fx.reset.issue(&account).await.unwrap();

        // Signature is still valid; only the stored expiry has passed.
        fx.store
            .set_reset_token(account.id, &token, Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        let err = fx
            .reset
            .validate_and_consume(&token, "p2-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn token_past_its_window_is_rejected() {
        let fx = fixture(Duration::seconds(1));
        let account = account(&fx).await;
        let token = fx.reset.issue(&account).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

        let err = fx
            .reset
            .validate_and_consume(&token, "p2-password")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::InvalidToken | AccountError::InvalidOrExpiredToken
        ));
    }

    #[tokio::test]
    async fn malformed_and_foreign_tokens_are_invalid() {
        let fx = fixture(Duration::minutes(15));
        let account = account(&fx).await;

        for token in ["", "garbage", "a.b.c"] {
            let err = fx.reset.validate_and_consume(token, "pw").await.unwrap_err();
            assert!(matches!(err, AccountError::InvalidToken), "token {token:?}");
        }

        let session = TokenIssuer::new("reset-test-secret")
            .issue(account.id, TokenKind::Session, Duration::hours(1))
            .unwrap();
        let err = fx.reset.validate_and_consume(&session, "pw").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidToken));
    }

    #[tokio::test]
    async fn valid_signature_without_stored_reset_fails() {
        let fx = fixture(Duration::minutes(15));
        let account = account(&fx).await;

        let unstored = TokenIssuer::new("reset-test-secret")
            .issue(account.id, TokenKind::Reset, Duration::minutes(15))
            .unwrap();
        let err = fx.reset.validate_and_consume(&unstored, "pw").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidOrExpiredToken));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_consumers_have_one_winner() {
        let fx = fixture(Duration::minutes(15));
        let account = account(&fx).await;
        let token = fx.reset.issue(&account).await.unwrap();

        let handles: Vec<_> = ["p2-password", "p3-password"]
            .into_iter()
            .map(|pw| {
                let reset = fx.reset.clone();
                let token = token.clone();
                tokio::spawn(async move { reset.validate_and_consume(&token, pw).await })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(err) => assert!(matches!(err, AccountError::InvalidOrExpiredToken)),
            }
        }
        assert_eq!(wins, 1);
        assert!(fx.store.find_by_id(account.id).await.unwrap().unwrap().reset.is_none());
    }

    #[tokio::test]
    async fn issue_for_missing_account_fails() {
        let fx = fixture(Duration::minutes(15));
        let ghost = Account {
            id: uuid::Uuid::now_v7(),
            name: String::new(),
            email: "ghost@x.com".to_string(),
            password_hash: String::new(),
            reset: None,
            created_at: Utc::now(),
        };

        let err = fx.reset.issue(&ghost).await.unwrap_err();
        assert!(matches!(err, AccountError::AccountNotFound));
    }
}
