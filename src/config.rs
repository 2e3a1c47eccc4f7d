use std::fmt::Display;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub frontend_url: String,
    pub cors_origin: String,
    pub site_name: String,
    pub max_body_size: usize,
    pub log_level: String,
    pub reset_token_ttl: Duration,
    pub session_ttl: Duration,
    pub min_password_length: usize,
    pub hashing: HashingConfig,
    pub smtp: Option<SmtpConfig>,
    pub contact_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

/// Argon2id work factor.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let jwt_secret = required(&lookup, "JWT_SECRET")?;

        let host: IpAddr = parsed(&lookup, "ACCOUNTD_HOST", "0.0.0.0")?;
        let port: u16 = parsed(&lookup, "ACCOUNTD_PORT", "3000")?;

        let frontend_url = or(&lookup, "ACCOUNTD_FRONTEND_URL", "http://localhost:5500")
            .trim_end_matches('/')
            .to_string();
        let cors_origin = or(&lookup, "ACCOUNTD_CORS_ORIGIN", &frontend_url)
            .trim_end_matches('/')
            .to_string();
        let site_name = or(&lookup, "ACCOUNTD_SITE_NAME", "Accountd");

        let max_body_size: usize = parsed(&lookup, "ACCOUNTD_MAX_BODY_SIZE", "65536")?;
        let log_level = or(&lookup, "ACCOUNTD_LOG_LEVEL", "info");

        let reset_secs: i64 = parsed(&lookup, "ACCOUNTD_RESET_TOKEN_TTL_SECS", "900")?;
        let session_secs: i64 = parsed(&lookup, "ACCOUNTD_SESSION_TTL_SECS", "3600")?;
        if reset_secs <= 0 || session_secs <= 0 {
            return Err("Token lifetimes must be positive".to_string());
        }

        let min_password_length: usize = parsed(&lookup, "ACCOUNTD_MIN_PASSWORD_LENGTH", "8")?;

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parsed(
                &lookup,
                "ACCOUNTD_ARGON2_MEMORY_KIB",
                &defaults.memory_kib.to_string(),
            )?,
            iterations: parsed(
                &lookup,
                "ACCOUNTD_ARGON2_ITERATIONS",
                &defaults.iterations.to_string(),
            )?,
            parallelism: parsed(
                &lookup,
                "ACCOUNTD_ARGON2_PARALLELISM",
                &defaults.parallelism.to_string(),
            )?,
        };

        let smtp = match (
            lookup("ACCOUNTD_SMTP_HOST"),
            lookup("ACCOUNTD_SMTP_PORT"),
            lookup("ACCOUNTD_SMTP_USER"),
            lookup("ACCOUNTD_SMTP_PASS"),
            lookup("ACCOUNTD_SMTP_FROM"),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid ACCOUNTD_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        let contact_to = lookup("ACCOUNTD_CONTACT_TO").filter(|s| !s.trim().is_empty());

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            frontend_url,
            cors_origin,
            site_name,
            max_body_size,
            log_level,
            reset_token_ttl: Duration::seconds(reset_secs),
            session_ttl: Duration::seconds(session_secs),
            min_password_length,
            hashing,
            smtp,
            contact_to,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, String> {
    lookup(key).ok_or_else(|| format!("Missing required environment variable: {key}"))
}

fn or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    or(lookup, key, default)
        .parse()
        .map_err(|e| format!("Invalid {key}: {e}"))
}
