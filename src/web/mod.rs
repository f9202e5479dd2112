mod auth;
mod error;
mod handlers;
mod oauth;

pub use auth::{AuthManager, CurrentUser, PendingSignup};
pub use error::{ApiError, ApiResult};
pub use oauth::{GoogleOAuth, OAuthIdentity};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::{FinanceService, Notifier};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FinanceService>,
    pub auth: Arc<AuthManager>,
    pub oauth: Option<Arc<GoogleOAuth>>,
    pub notifier: Arc<dyn Notifier>,
}

/// Build the full application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/balances", get(handlers::balances))
        .route(
            "/api/profile",
            get(handlers::get_profile).post(handlers::update_profile),
        )
        .route("/api/transactions", get(handlers::list_transactions))
        .route("/api/transactions/income", post(handlers::add_income))
        .route("/api/transactions/expense", post(handlers::add_expense))
        .route(
            "/api/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route("/api/oauth/google", get(handlers::oauth_start))
        .route("/api/oauth/google/callback", get(handlers::oauth_callback))
        .route(
            "/api/signup/finalize",
            get(handlers::finalize_info).post(handlers::finalize_signup),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run_server(state: AppState, listen_addr: SocketAddr) -> anyhow::Result<()> {
    let router = app_router(state);
    tracing::info!("Listening on {}", listen_addr);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
