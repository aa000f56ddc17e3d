use crate::auth::jwt::JwtConfig;

/// Default upper bound on pooled database connections.
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum pooled database connections (default: `10`).
    pub db_max_connections: u32,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Admin account ensured on startup, if configured.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials for the first admin account.
///
/// Without one, an empty database has no admin who could provision anyone.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub secret: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `DB_MAX_CONNECTIONS`     | `10`                       |
    /// | `BOOTSTRAP_ADMIN_EMAIL`  | unset                      |
    /// | `BOOTSTRAP_ADMIN_SECRET` | unset                      |
    ///
    /// The bootstrap admin is only configured when both of its variables are
    /// set and non-empty.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| DEFAULT_DB_MAX_CONNECTIONS.to_string())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
            std::env::var("BOOTSTRAP_ADMIN_SECRET"),
        ) {
            (Ok(email), Ok(secret)) if !email.trim().is_empty() && !secret.is_empty() => {
                Some(BootstrapAdmin { email, secret })
            }
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            db_max_connections,
            jwt,
            bootstrap_admin,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
