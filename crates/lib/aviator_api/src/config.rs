//! API server configuration.

use aviator_core::auth::registration::DEFAULT_OTP_TTL_SECS;
use thiserror::Error;

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not defined")]
    MissingJwtSecret,

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Outbound mail settings.
#[derive(Clone)]
pub struct MailConfig {
    /// Brevo API key. Without one, mail is logged instead of delivered.
    pub brevo_api_key: Option<String>,
    pub sender_email: String,
    pub sender_name: String,
}

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    pub mail: MailConfig,
    /// Lifetime of an unconsumed one-time code, in seconds.
    pub otp_ttl_secs: i64,
    /// Email-availability checks allowed per client within the window.
    pub check_email_limit: usize,
    pub check_email_window_ms: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"***")
            .field("mail_configured", &self.mail.brevo_api_key.is_some())
            .field("sender_email", &self.mail.sender_email)
            .field("otp_ttl_secs", &self.otp_ttl_secs)
            .field("check_email_limit", &self.check_email_limit)
            .field("check_email_window_ms", &self.check_email_window_ms)
            .finish()
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                | Default                                  |
    /// |-------------------------|------------------------------------------|
    /// | `BIND_ADDR`             | `127.0.0.1:3000`                         |
    /// | `DATABASE_URL`          | `postgres://localhost:5432/aviator`      |
    /// | `JWT_SECRET`            | required                                 |
    /// | `BREVO_API_KEY`         | unset (mail is logged, not sent)         |
    /// | `MAIL_SENDER_EMAIL`     | `aviator@spectralo.me`                   |
    /// | `MAIL_SENDER_NAME`      | `Aviator`                                |
    /// | `OTP_TTL_SECS`          | `600`                                    |
    /// | `CHECK_EMAIL_LIMIT`     | `5`                                      |
    /// | `CHECK_EMAIL_WINDOW_MS` | `2000`                                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::MissingJwtSecret)?;

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".into()),
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/aviator".into()),
            jwt_secret,
            mail: MailConfig {
                brevo_api_key: get("BREVO_API_KEY"),
                sender_email: get("MAIL_SENDER_EMAIL")
                    .unwrap_or_else(|| "aviator@spectralo.me".into()),
                sender_name: get("MAIL_SENDER_NAME").unwrap_or_else(|| "Aviator".into()),
            },
            otp_ttl_secs: parse_otp_ttl(get("OTP_TTL_SECS"))?,
            check_email_limit: parse_or(get("CHECK_EMAIL_LIMIT"), "CHECK_EMAIL_LIMIT", 5)?,
            check_email_window_ms: parse_or(
                get("CHECK_EMAIL_WINDOW_MS"),
                "CHECK_EMAIL_WINDOW_MS",
                2000,
            )?,
        })
    }

    /// Falls back to the default when `otp_ttl_secs` was set out of range
    /// after loading.
    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.otp_ttl_secs)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_OTP_TTL_SECS))
    }

    pub fn check_email_window(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.check_email_window_ms)
    }
}

/// Must be positive and representable as a `chrono::Duration`.
fn parse_otp_ttl(raw: Option<String>) -> Result<i64, ConfigError> {
    let secs = parse_or(raw, "OTP_TTL_SECS", DEFAULT_OTP_TTL_SECS)?;
    match chrono::Duration::try_seconds(secs) {
        Some(_) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::Invalid {
            var: "OTP_TTL_SECS",
            value: secs.to_string(),
        }),
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
