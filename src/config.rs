use crate::errors::StartupError;

/// One signing secret per principal kind. A token minted under one secret
/// must never verify under another, so the three are kept separate end to
/// end instead of sharing a key with a role claim.
#[derive(Debug, Clone)]
pub struct JwtSecrets {
    pub admin: String,
    pub teacher: String,
    pub student: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub base_url: String,
    pub api_key: String,
    pub upload_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Immutable process configuration, loaded once in `main` and handed to each
/// component. Handlers never read the environment directly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub jwt: JwtSecrets,
    pub smtp: SmtpConfig,
    pub media: MediaConfig,
    pub vault: VaultConfig,
}

fn require(name: &str) -> Result<String, StartupError> {
    std::env::var(name).map_err(|_| StartupError::Config(name.to_string()))
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, StartupError> {
        let smtp_port = var_or("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|_| StartupError::Config("SMTP_PORT".to_string()))?;

        Ok(AppConfig {
            bind_addr: var_or("BIND_ADDR", "127.0.0.1:3000"),
            database_url: require("DATABASE_URL")?,
            jwt: JwtSecrets {
                admin: require("JWT_SECRET_ADMIN")?,
                teacher: require("JWT_SECRET_TEACHER")?,
                student: require("JWT_SECRET_STUDENT")?,
            },
            smtp: SmtpConfig {
                host: var_or("SMTP_HOST", "localhost"),
                port: smtp_port,
                username: var_or("SMTP_USERNAME", ""),
                password: var_or("SMTP_PASSWORD", ""),
                from: var_or("EMAIL_FROM", "Teachables <no-reply@teachables.io>"),
            },
            media: MediaConfig {
                base_url: require("MEDIA_HOST_URL")?,
                api_key: require("MEDIA_HOST_API_KEY")?,
                upload_timeout_secs: var_or("MEDIA_UPLOAD_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .map_err(|_| StartupError::Config("MEDIA_UPLOAD_TIMEOUT_SECS".to_string()))?,
            },
            vault: VaultConfig {
                base_url: require("CARD_VAULT_URL")?,
                api_key: require("CARD_VAULT_API_KEY")?,
            },
        })
    }
}
