use crate::db::StoreError;

/// Every way an account operation can fail.
///
/// Reset failures deliberately collapse to the same user-facing message; the split
/// between `InvalidToken` and `InvalidOrExpiredToken` exists for logs and tests.
#[derive(Debug)]
pub enum AccountError {
    Validation(String),
    DuplicateAccount,
    InvalidCredentials,
    InvalidToken,
    InvalidOrExpiredToken,
    AccountNotFound,
    Store(String),
    Mailer(String),
    Internal(String),
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::Validation(msg) => write!(f, "Validation failed: {msg}"),
            AccountError::DuplicateAccount => write!(f, "Email already registered"),
            AccountError::InvalidCredentials => write!(f, "Invalid credentials"),
            AccountError::InvalidToken => write!(f, "Invalid token"),
            AccountError::InvalidOrExpiredToken => write!(f, "Invalid or expired token"),
            AccountError::AccountNotFound => write!(f, "Account not found"),
            AccountError::Store(msg) => write!(f, "Store error: {msg}"),
            AccountError::Mailer(msg) => write!(f, "Mailer error: {msg}"),
            AccountError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for AccountError {}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AccountError::DuplicateAccount,
            StoreError::Backend(msg) => AccountError::Store(msg),
        }
    }
}
