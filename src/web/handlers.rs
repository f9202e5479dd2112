use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{AlertLevel, BudgetStatus};
use crate::domain::{format_cents, parse_amount_cents, parse_cents, CategoryKind, Transaction};

use super::auth::CurrentUser;
use super::error::{ApiError, ApiResult};
use super::AppState;

pub async fn healthz() -> &'static str {
    "ok"
}

// ========================
// Accounts
// ========================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub username: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<SessionResponse>> {
    if payload.password.is_empty() {
        return Err(ApiError::Form("Password must not be empty".into()));
    }
    let hash = state
        .auth
        .hash_password(&payload.password)
        .map_err(|_| ApiError::Internal("internal error".into()))?;
    let user = state
        .service
        .register_user(&payload.username, &payload.email, hash)
        .await?;
    let token = state
        .auth
        .issue_session(user.id)
        .map_err(|_| ApiError::Internal("internal error".into()))?;
    Ok(Json(SessionResponse {
        token,
        username: user.username,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let user = state
        .service
        .user_by_username(&payload.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".into()))?;

    // OAuth-only accounts have no password to check
    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".into()))?;

    state
        .auth
        .verify_password(hash, &payload.password)
        .map_err(|_| ApiError::Unauthorized("Invalid username or password".into()))?;

    let token = state
        .auth
        .issue_session(user.id)
        .map_err(|_| ApiError::Internal("internal error".into()))?;
    Ok(Json(SessionResponse {
        token,
        username: user.username,
    }))
}

// ========================
// Balances & profile
// ========================

#[derive(Serialize)]
pub struct BalanceEntry {
    pub currency: String,
    pub total_cents: i64,
    pub total: String,
}

pub async fn balances(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<BalanceEntry>>> {
    let balances = state.service.balances(user.id).await?;
    Ok(Json(
        balances
            .into_iter()
            .map(|b| BalanceEntry {
                total: format_cents(b.total_cents),
                currency: b.currency,
                total_cents: b.total_cents,
            })
            .collect(),
    ))
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
    pub bio: String,
    pub target_savings_cents: i64,
    pub target_savings: String,
    pub balances: Vec<BalanceEntry>,
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    pub bio: String,
    /// Decimal string, e.g. "5000" or "5000.00"
    pub target_savings: String,
}

pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ProfileResponse>> {
    let overview = state.service.profile_overview(user.id).await?;
    Ok(Json(ProfileResponse {
        username: overview.user.username,
        email: overview.user.email,
        bio: overview.profile.bio,
        target_savings: format_cents(overview.profile.target_savings_cents),
        target_savings_cents: overview.profile.target_savings_cents,
        balances: overview
            .balances
            .into_iter()
            .map(|b| BalanceEntry {
                total: format_cents(b.total_cents),
                currency: b.currency,
                total_cents: b.total_cents,
            })
            .collect(),
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let target_cents =
        parse_cents(&payload.target_savings).map_err(|e| ApiError::Form(e.to_string()))?;
    state
        .service
        .update_profile(user.id, payload.bio, target_cents)
        .await?;
    get_profile(State(state), CurrentUser(user)).await
}

// ========================
// Transactions
// ========================

#[derive(Deserialize)]
pub struct TransactionRequest {
    /// ISO 8601 date: YYYY-MM-DD
    pub date: String,
    /// Decimal string, e.g. "1000" or "12.50"
    pub amount: String,
    pub category: String,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub kind: CategoryKind,
    pub date: NaiveDate,
    pub amount_cents: i64,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub description: Option<String>,
}

fn transaction_response(txn: Transaction, category: String) -> TransactionResponse {
    TransactionResponse {
        id: txn.id,
        kind: txn.kind,
        date: txn.date,
        amount: format_cents(txn.amount_cents),
        amount_cents: txn.amount_cents,
        currency: txn.currency,
        category,
        description: txn.description,
    }
}

async fn add_transaction(
    state: AppState,
    user_id: Uuid,
    kind: CategoryKind,
    payload: TransactionRequest,
) -> ApiResult<Json<TransactionResponse>> {
    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| ApiError::Form(format!("Invalid date: {}", payload.date)))?;
    let amount_cents =
        parse_amount_cents(&payload.amount).map_err(|e| ApiError::Form(e.to_string()))?;

    let txn = state
        .service
        .record_transaction(
            user_id,
            kind,
            date,
            amount_cents,
            &payload.currency,
            &payload.category,
            payload.description,
        )
        .await?;

    Ok(Json(transaction_response(txn, payload.category)))
}

pub async fn add_income(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<TransactionRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    add_transaction(state, user.id, CategoryKind::Income, payload).await
}

pub async fn add_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<TransactionRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    add_transaction(state, user.id, CategoryKind::Expense, payload).await
}

pub async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let transactions = state.service.list_transactions(user.id).await?;
    let categories = state.service.list_categories(user.id).await?;

    let name_of = |id: Uuid| {
        categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };

    Ok(Json(
        transactions
            .into_iter()
            .map(|txn| {
                let category = name_of(txn.category_id);
                transaction_response(txn, category)
            })
            .collect(),
    ))
}

// ========================
// Budgets
// ========================

#[derive(Deserialize)]
pub struct BudgetRequest {
    pub category_name: String,
    /// Decimal string, e.g. "500" or "500.00"
    pub amount: String,
    pub currency: String,
}

#[derive(Serialize)]
pub struct BudgetStatusResponse {
    pub category: String,
    pub currency: String,
    pub limit_cents: i64,
    pub limit: String,
    pub spent_cents: i64,
    pub spent: String,
    pub remaining_cents: i64,
    pub remaining: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<&'static str>,
}

fn budget_status_response(status: &BudgetStatus, alert: Option<AlertLevel>) -> BudgetStatusResponse {
    BudgetStatusResponse {
        category: status.category_name.clone(),
        currency: status.budget.currency.clone(),
        limit_cents: status.budget.amount_cents,
        limit: format_cents(status.budget.amount_cents),
        spent_cents: status.spent_cents,
        spent: format_cents(status.spent_cents),
        remaining_cents: status.remaining_cents,
        remaining: format_cents(status.remaining_cents),
        alert: alert.map(|level| match level {
            AlertLevel::Warning => "warning",
            AlertLevel::Exceeded => "exceeded",
        }),
    }
}

pub async fn list_budgets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<BudgetStatusResponse>>> {
    let today = Utc::now().date_naive();
    let (statuses, alerts) = state
        .service
        .check_budgets(user.id, today, state.notifier.as_ref())
        .await?;

    Ok(Json(
        statuses
            .iter()
            .map(|status| {
                let alert = alerts
                    .iter()
                    .find(|a| a.category_name == status.category_name)
                    .map(|a| a.level);
                budget_status_response(status, alert)
            })
            .collect(),
    ))
}

pub async fn create_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<BudgetRequest>,
) -> ApiResult<Json<BudgetStatusResponse>> {
    let amount_cents =
        parse_amount_cents(&payload.amount).map_err(|e| ApiError::Form(e.to_string()))?;

    state
        .service
        .create_budget(user.id, &payload.category_name, amount_cents, &payload.currency)
        .await?;

    // Return the fresh status so the client sees spent-so-far immediately
    let today = Utc::now().date_naive();
    let statuses = state.service.budget_statuses(user.id, today).await?;
    let status = statuses
        .iter()
        .find(|s| s.category_name == payload.category_name.trim())
        .ok_or(ApiError::NotFound)?;
    Ok(Json(budget_status_response(status, None)))
}

// ========================
// OAuth & signup finalization
// ========================

#[derive(Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
    pub state: String,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OAuthCallbackResponse {
    /// The email already maps to a local account: the user is logged in.
    LoggedIn { token: String, username: String },
    /// No local account yet: a username must be chosen to finalize.
    FinalizeRequired {
        pending_token: String,
        email: String,
        name: String,
    },
}

pub async fn oauth_start(State(state): State<AppState>) -> ApiResult<Redirect> {
    let oauth = state.oauth.as_ref().ok_or(ApiError::NotFound)?;
    let nonce = state
        .auth
        .issue_oauth_state()
        .map_err(|_| ApiError::Internal("internal error".into()))?;
    Ok(Redirect::temporary(&oauth.authorize_url(&nonce)))
}

pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> ApiResult<Json<OAuthCallbackResponse>> {
    let oauth = state.oauth.as_ref().ok_or(ApiError::NotFound)?;

    // The provider must echo the state we handed out in oauth_start
    state
        .auth
        .verify_oauth_state(&query.state)
        .map_err(|_| ApiError::Unauthorized("Invalid OAuth state".into()))?;

    let access_token = oauth
        .exchange_code(&query.code)
        .await
        .map_err(|e| ApiError::BadRequest(format!("OAuth exchange failed: {e}")))?;
    let identity = oauth
        .fetch_identity(&access_token)
        .await
        .map_err(|e| ApiError::BadRequest(format!("OAuth identity fetch failed: {e}")))?;

    // Existing account: the provider vouched for the email, log straight in
    if let Some(user) = state.service.user_by_email(&identity.email).await? {
        let token = state
            .auth
            .issue_session(user.id)
            .map_err(|_| ApiError::Internal("internal error".into()))?;
        return Ok(Json(OAuthCallbackResponse::LoggedIn {
            token,
            username: user.username,
        }));
    }

    let pending_token = state
        .auth
        .issue_pending(&identity.email, &identity.name)
        .map_err(|_| ApiError::Internal("internal error".into()))?;
    Ok(Json(OAuthCallbackResponse::FinalizeRequired {
        pending_token,
        email: identity.email,
        name: identity.name,
    }))
}

#[derive(Deserialize)]
pub struct FinalizeQuery {
    pub token: String,
}

#[derive(Serialize)]
pub struct FinalizeInfoResponse {
    pub email: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct FinalizeRequest {
    pub token: String,
    pub username: String,
}

/// Echo the identity held by a pending-signup token, for the username form.
pub async fn finalize_info(
    State(state): State<AppState>,
    Query(query): Query<FinalizeQuery>,
) -> ApiResult<Json<FinalizeInfoResponse>> {
    let pending = state
        .auth
        .pending_identity(&query.token)
        .map_err(|_| ApiError::Unauthorized("Signup session expired".into()))?;
    Ok(Json(FinalizeInfoResponse {
        email: pending.email,
        name: pending.name,
    }))
}

pub async fn finalize_signup(
    State(state): State<AppState>,
    Json(payload): Json<FinalizeRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let pending = state
        .auth
        .pending_identity(&payload.token)
        .map_err(|_| ApiError::Unauthorized("Signup session expired".into()))?;

    let user = state
        .service
        .finalize_signup(&payload.username, &pending.email)
        .await?;

    let token = state
        .auth
        .issue_session(user.id)
        .map_err(|_| ApiError::Internal("internal error".into()))?;
    Ok(Json(SessionResponse {
        token,
        username: user.username,
    }))
}
