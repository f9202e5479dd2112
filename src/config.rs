use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Google OAuth client settings. Absent when the deployment doesn't offer
/// OAuth login; the related endpoints then answer 404.
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// Server configuration, read from the environment (a `.env` file is picked
/// up when present).
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub jwt_secret: String,
    pub session_ttl_secs: u64,
    pub budget_warn_percent: u8,
    pub oauth: Option<OAuthConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("SOLDO_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .context("Invalid SOLDO_LISTEN_ADDR")?;

        let db_path = std::env::var("SOLDO_DB_PATH").unwrap_or_else(|_| "soldo.db".to_string());

        let jwt_secret = match std::env::var("SOLDO_JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("SOLDO_JWT_SECRET not set, using development secret");
                "dev-secret-key".to_string()
            }
        };

        let session_ttl_secs: u64 = std::env::var("SOLDO_SESSION_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .context("Invalid SOLDO_SESSION_TTL_SECS")?;

        let budget_warn_percent: u8 = std::env::var("SOLDO_BUDGET_WARN_PERCENT")
            .unwrap_or_else(|_| "80".to_string())
            .parse()
            .context("Invalid SOLDO_BUDGET_WARN_PERCENT")?;

        let oauth = match (
            std::env::var("GOOGLE_OAUTH_CLIENT_ID"),
            std::env::var("GOOGLE_OAUTH_CLIENT_SECRET"),
        ) {
            (Ok(client_id), Ok(client_secret)) if !client_id.is_empty() => Some(OAuthConfig {
                client_id,
                client_secret,
                redirect_url: std::env::var("SOLDO_OAUTH_REDIRECT_URL").unwrap_or_else(|_| {
                    "http://localhost:8080/api/oauth/google/callback".to_string()
                }),
            }),
            _ => None,
        };

        Ok(Self {
            listen_addr,
            db_path,
            jwt_secret,
            session_ttl_secs,
            budget_warn_percent,
            oauth,
        })
    }
}
