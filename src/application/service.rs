use chrono::NaiveDate;

use crate::domain::{
    month_bounds, Budget, Category, CategoryKind, Cents, ParseCentsError, Profile, Transaction,
    User, UserId,
};
use crate::storage::{CurrencyBalance, Repository};

use super::notify::{evaluate_alerts, BudgetAlert, Notifier};
use super::AppError;

/// Default warning threshold: alert when month-to-date spending reaches this
/// percentage of the budgeted amount.
pub const DEFAULT_WARN_PERCENT: u8 = 80;

/// Application service providing high-level operations for the tracker.
/// This is the primary interface for any client (web handlers, CLI, tests).
pub struct FinanceService {
    repo: Repository,
    warn_percent: u8,
}

/// Month-to-date spending against one budget.
pub struct BudgetStatus {
    pub budget: Budget,
    pub category_name: String,
    pub spent_cents: Cents,
    pub remaining_cents: Cents,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
}

/// Profile page data: the profile row plus per-currency net balances.
pub struct ProfileOverview {
    pub user: User,
    pub profile: Profile,
    pub balances: Vec<CurrencyBalance>,
}

impl FinanceService {
    /// Create a new service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            warn_percent: DEFAULT_WARN_PERCENT,
        }
    }

    pub fn with_warn_percent(mut self, percent: u8) -> Self {
        self.warn_percent = percent.min(100);
        self
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Accounts
    // ========================

    /// Register a local account. The password arrives already hashed; this
    /// layer never sees plaintext credentials.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
    ) -> Result<User, AppError> {
        let username = validate_username(username)?;

        if self.repo.get_user_by_username(username).await?.is_some() {
            return Err(AppError::UsernameTaken(username.to_string()));
        }
        if self.repo.get_user_by_email(email).await?.is_some() {
            return Err(AppError::EmailTaken(email.to_string()));
        }

        let user = User::new(username.to_string(), email.to_string(), Some(password_hash));
        self.repo.save_user(&user).await?;
        Ok(user)
    }

    /// Finalize an OAuth signup: bind the provider-vouched email to a local
    /// account under a user-chosen username. Exactly one user row is created;
    /// a taken username leaves the database untouched.
    pub async fn finalize_signup(&self, username: &str, email: &str) -> Result<User, AppError> {
        let username = validate_username(username)?;

        if self.repo.get_user_by_username(username).await?.is_some() {
            return Err(AppError::UsernameTaken(username.to_string()));
        }
        if self.repo.get_user_by_email(email).await?.is_some() {
            return Err(AppError::EmailTaken(email.to_string()));
        }

        let user = User::new(username.to_string(), email.to_string(), None);
        self.repo.save_user(&user).await?;
        Ok(user)
    }

    /// Get a user by username, for credential checks.
    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.repo.get_user_by_username(username).await?)
    }

    /// Get a user by email, for OAuth logins of existing accounts.
    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.repo.get_user_by_email(email).await?)
    }

    /// Get a user by ID.
    pub async fn user(&self, id: UserId) -> Result<User, AppError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    // ========================
    // Profile
    // ========================

    /// Get a user's profile, creating an empty one on first access.
    pub async fn profile(&self, user_id: UserId) -> Result<Profile, AppError> {
        if let Some(profile) = self.repo.get_profile(user_id).await? {
            return Ok(profile);
        }
        let profile = Profile::empty(user_id);
        self.repo.upsert_profile(&profile).await?;
        Ok(profile)
    }

    /// Update bio and savings target.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        bio: String,
        target_savings_cents: Cents,
    ) -> Result<Profile, AppError> {
        if target_savings_cents < 0 {
            return Err(AppError::InvalidAmount(ParseCentsError::Negative));
        }
        let mut profile = self.profile(user_id).await?;
        profile.bio = bio;
        profile.target_savings_cents = target_savings_cents;
        profile.updated_at = chrono::Utc::now();
        self.repo.upsert_profile(&profile).await?;
        Ok(profile)
    }

    /// Profile plus the per-currency balances shown alongside it.
    pub async fn profile_overview(&self, user_id: UserId) -> Result<ProfileOverview, AppError> {
        let user = self.user(user_id).await?;
        let profile = self.profile(user_id).await?;
        let balances = self.balances(user_id).await?;
        Ok(ProfileOverview {
            user,
            profile,
            balances,
        })
    }

    // ========================
    // Transactions & balances
    // ========================

    /// Net balance per currency: sum(income) - sum(expense).
    pub async fn balances(&self, user_id: UserId) -> Result<Vec<CurrencyBalance>, AppError> {
        Ok(self.repo.balances_by_currency(user_id).await?)
    }

    /// Record an income or expense transaction. A category named here that
    /// doesn't exist yet is created with the transaction's kind.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_transaction(
        &self,
        user_id: UserId,
        kind: CategoryKind,
        date: NaiveDate,
        amount_cents: Cents,
        currency: &str,
        category_name: &str,
        description: Option<String>,
    ) -> Result<Transaction, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(ParseCentsError::Zero));
        }

        let category = self.ensure_category(user_id, category_name, kind).await?;

        let mut txn = Transaction::new(
            user_id,
            category.id,
            kind,
            date,
            amount_cents,
            currency.to_string(),
        );
        if let Some(desc) = description {
            txn = txn.with_description(desc);
        }

        self.repo.save_transaction(&txn).await?;
        Ok(txn)
    }

    /// List a user's transactions, most recent first.
    pub async fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions(user_id).await?)
    }

    /// List a user's categories.
    pub async fn list_categories(&self, user_id: UserId) -> Result<Vec<Category>, AppError> {
        Ok(self.repo.list_categories(user_id).await?)
    }

    /// Resolve a category by name, creating it if missing.
    async fn ensure_category(
        &self,
        owner: UserId,
        name: &str,
        kind: CategoryKind,
    ) -> Result<Category, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::CategoryNotFound(String::new()));
        }

        if let Some(category) = self.repo.get_category_by_name(owner, name).await? {
            return Ok(category);
        }

        let category = Category::new(owner, name.to_string(), kind);
        self.repo.save_category(&category).await?;
        Ok(category)
    }

    // ========================
    // Budgets
    // ========================

    /// Create a monthly budget for a category. One budget per category.
    pub async fn create_budget(
        &self,
        user_id: UserId,
        category_name: &str,
        amount_cents: Cents,
        currency: &str,
    ) -> Result<Budget, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(ParseCentsError::Zero));
        }

        // Budgets cap spending, so an unknown category is created as expense
        let category = self
            .ensure_category(user_id, category_name, CategoryKind::Expense)
            .await?;

        if self
            .repo
            .get_budget_by_category(user_id, category.id)
            .await?
            .is_some()
        {
            return Err(AppError::BudgetAlreadyExists(category.name));
        }

        let budget = Budget::new(user_id, category.id, amount_cents, currency.to_string());
        self.repo.save_budget(&budget).await?;
        Ok(budget)
    }

    /// Delete the budget for a category.
    pub async fn delete_budget(&self, user_id: UserId, category_name: &str) -> Result<(), AppError> {
        let category = self
            .repo
            .get_category_by_name(user_id, category_name.trim())
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(category_name.to_string()))?;
        let budget = self
            .repo
            .get_budget_by_category(user_id, category.id)
            .await?
            .ok_or_else(|| AppError::BudgetNotFound(category_name.to_string()))?;
        self.repo.delete_budget(budget.id).await?;
        Ok(())
    }

    /// Month-to-date spending against each of the user's budgets. Only
    /// expense transactions inside the calendar month containing `today`
    /// count, and only in the budget's own currency.
    pub async fn budget_statuses(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<Vec<BudgetStatus>, AppError> {
        let budgets = self.repo.list_budgets(user_id).await?;
        let (month_start, month_end) = month_bounds(today);

        let mut statuses = Vec::with_capacity(budgets.len());
        for budget in budgets {
            let category = self
                .repo
                .get_category(budget.category_id)
                .await?
                .ok_or_else(|| AppError::CategoryNotFound(budget.category_id.to_string()))?;

            let spent = self
                .repo
                .sum_expenses_in_range(
                    user_id,
                    budget.category_id,
                    &budget.currency,
                    month_start,
                    month_end,
                )
                .await?;

            let remaining = budget.amount_cents - spent;
            statuses.push(BudgetStatus {
                budget,
                category_name: category.name,
                spent_cents: spent,
                remaining_cents: remaining,
                month_start,
                month_end,
            });
        }

        Ok(statuses)
    }

    /// Compute budget statuses and fire notifications for any budget whose
    /// spending crossed the warning threshold or the limit.
    pub async fn check_budgets(
        &self,
        user_id: UserId,
        today: NaiveDate,
        notifier: &dyn Notifier,
    ) -> Result<(Vec<BudgetStatus>, Vec<BudgetAlert>), AppError> {
        let statuses = self.budget_statuses(user_id, today).await?;
        let alerts = evaluate_alerts(&statuses, self.warn_percent);
        for alert in &alerts {
            notifier.notify(alert);
        }
        Ok((statuses, alerts))
    }
}

/// Usernames follow the original registration rules: trimmed, non-empty,
/// no whitespace inside, at most 150 characters.
fn validate_username(username: &str) -> Result<&str, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidUsername("must not be empty".into()));
    }
    if username.len() > 150 {
        return Err(AppError::InvalidUsername(
            "must be at most 150 characters".into(),
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidUsername(
            "must not contain whitespace".into(),
        ));
    }
    Ok(username)
}
