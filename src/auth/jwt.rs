use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a signed token may be used for. A token is only accepted for its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Session,
    Reset,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub kind: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: Uuid, kind: TokenKind, ttl: Duration) -> Self {
        let now = Utc::now();
        let nonce: [u8; 16] = rand::random();
        Self {
            sub: subject,
            kind,
            jti: hex::encode(nonce),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Issues and verifies HS256 tokens that carry an account id as subject.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, subject: Uuid, kind: TokenKind, ttl: Duration) -> Result<String, String> {
        let claims = Claims::new(subject, kind, ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| format!("JWT encode failed: {e}"))
    }

    /// Checks signature, expiry and kind, returning the subject.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Uuid, String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("JWT decode failed: {e}"))?;

        if claims.kind != kind {
            return Err(format!("JWT kind mismatch: expected {kind:?}"));
        }
        Ok(claims.sub)
    }
}
