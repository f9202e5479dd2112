use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{FinanceService, LogNotifier};
use crate::config::Config;
use crate::web::{run_server, AppState, AuthManager, GoogleOAuth};

/// Soldo - Personal Finance Tracker
#[derive(Parser)]
#[command(name = "soldo")]
#[command(about = "A self-hosted personal finance tracker with a JSON web API")]
#[command(version)]
pub struct Cli {
    /// Database file path (overrides SOLDO_DB_PATH)
    #[arg(short, long)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Run the web server
    Serve {
        /// Listen address (overrides SOLDO_LISTEN_ADDR)
        #[arg(short, long)]
        listen: Option<SocketAddr>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing();
        let config = Config::from_env()?;
        let db_path = self.database.unwrap_or_else(|| config.db_path.clone());

        match self.command {
            Commands::Init => {
                FinanceService::init(&db_path).await?;
                println!("Initialized database at {}", db_path);
                Ok(())
            }
            Commands::Serve { listen } => {
                let service = FinanceService::init(&db_path)
                    .await?
                    .with_warn_percent(config.budget_warn_percent);

                let auth = AuthManager::new(
                    config.jwt_secret.as_bytes(),
                    Duration::from_secs(config.session_ttl_secs),
                );

                let oauth = config.oauth.as_ref().map(|c| {
                    Arc::new(GoogleOAuth::new(
                        c.client_id.clone(),
                        c.client_secret.clone(),
                        c.redirect_url.clone(),
                    ))
                });
                if oauth.is_none() {
                    tracing::info!("Google OAuth not configured, provider login disabled");
                }

                let state = AppState {
                    service: Arc::new(service),
                    auth: Arc::new(auth),
                    oauth,
                    notifier: Arc::new(LogNotifier),
                };

                let listen_addr = listen.unwrap_or(config.listen_addr);
                run_server(state, listen_addr).await
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
