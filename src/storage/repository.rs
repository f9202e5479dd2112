use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Budget, BudgetId, Category, CategoryId, CategoryKind, Cents, Profile, Transaction, User, UserId,
};

use super::MIGRATION_001_INITIAL;

/// Net balance for one currency.
#[derive(Debug, Clone)]
pub struct CurrencyBalance {
    pub currency: String,
    pub total_cents: Cents,
}

/// Repository for persisting and querying users, transactions and budgets.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // User operations
    // ========================

    /// Save a new user to the database.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save user")?;
        Ok(())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by username")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(User {
            id: Uuid::parse_str(&id_str).context("Invalid user ID")?,
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Profile operations
    // ========================

    /// Get a user's profile.
    pub async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>> {
        let row = sqlx::query(
            "SELECT user_id, bio, target_savings_cents, updated_at FROM profiles WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch profile")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_profile(&row)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a user's profile (one row per user).
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, bio, target_savings_cents, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                bio = excluded.bio,
                target_savings_cents = excluded.target_savings_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(profile.user_id.to_string())
        .bind(&profile.bio)
        .bind(profile.target_savings_cents)
        .bind(profile.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert profile")?;
        Ok(())
    }

    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile> {
        let user_id_str: String = row.get("user_id");
        let updated_at_str: String = row.get("updated_at");

        Ok(Profile {
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            bio: row.get("bio"),
            target_savings_cents: row.get("target_savings_cents"),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Category operations
    // ========================

    /// Save a new category to the database.
    pub async fn save_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, owner, name, kind, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(category.id.to_string())
        .bind(category.owner.to_string())
        .bind(&category.name)
        .bind(category.kind.as_str())
        .bind(category.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save category")?;
        Ok(())
    }

    /// Get a category by ID.
    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row =
            sqlx::query("SELECT id, owner, name, kind, created_at FROM categories WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch category")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_category(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a category by owner and name.
    pub async fn get_category_by_name(&self, owner: UserId, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, owner, name, kind, created_at FROM categories WHERE owner = ? AND name = ?",
        )
        .bind(owner.to_string())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch category by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_category(&row)?)),
            None => Ok(None),
        }
    }

    /// List a user's categories, ordered by name.
    pub async fn list_categories(&self, owner: UserId) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, owner, name, kind, created_at FROM categories WHERE owner = ? ORDER BY name",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        rows.iter().map(Self::row_to_category).collect()
    }

    fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
        let id_str: String = row.get("id");
        let owner_str: String = row.get("owner");
        let kind_str: String = row.get("kind");
        let created_at_str: String = row.get("created_at");

        Ok(Category {
            id: Uuid::parse_str(&id_str).context("Invalid category ID")?,
            owner: Uuid::parse_str(&owner_str).context("Invalid owner ID")?,
            name: row.get("name"),
            kind: CategoryKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid category kind: {}", kind_str))?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Transaction operations
    // ========================

    /// Save a new transaction to the database.
    pub async fn save_transaction(&self, txn: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, owner, category_id, kind, date, amount_cents, currency, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(txn.id.to_string())
        .bind(txn.owner.to_string())
        .bind(txn.category_id.to_string())
        .bind(txn.kind.as_str())
        .bind(txn.date.format("%Y-%m-%d").to_string())
        .bind(txn.amount_cents)
        .bind(&txn.currency)
        .bind(&txn.description)
        .bind(txn.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// List a user's transactions, most recent date first.
    pub async fn list_transactions(&self, owner: UserId) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner, category_id, kind, date, amount_cents, currency, description, created_at
            FROM transactions
            WHERE owner = ?
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Net balance per currency for a user: income positive, expense negative.
    /// Aggregation happens in SQL; currencies with no transactions are absent.
    pub async fn balances_by_currency(&self, owner: UserId) -> Result<Vec<CurrencyBalance>> {
        let rows = sqlx::query(
            r#"
            SELECT
                currency,
                SUM(CASE WHEN kind = 'income' THEN amount_cents ELSE -amount_cents END) as total
            FROM transactions
            WHERE owner = ?
            GROUP BY currency
            ORDER BY currency
            "#,
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute balances")?;

        Ok(rows
            .iter()
            .map(|row| CurrencyBalance {
                currency: row.get("currency"),
                total_cents: row.get("total"),
            })
            .collect())
    }

    /// Sum expense transactions for a category and currency within a date
    /// range (from inclusive, to exclusive).
    pub async fn sum_expenses_in_range(
        &self,
        owner: UserId,
        category_id: CategoryId,
        currency: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) as total
            FROM transactions
            WHERE owner = ? AND category_id = ? AND currency = ?
              AND kind = 'expense' AND date >= ? AND date < ?
            "#,
        )
        .bind(owner.to_string())
        .bind(category_id.to_string())
        .bind(currency)
        .bind(from.format("%Y-%m-%d").to_string())
        .bind(to.format("%Y-%m-%d").to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum expenses")?;

        Ok(row.get("total"))
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let owner_str: String = row.get("owner");
        let category_str: String = row.get("category_id");
        let kind_str: String = row.get("kind");
        let date_str: String = row.get("date");
        let created_at_str: String = row.get("created_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            owner: Uuid::parse_str(&owner_str).context("Invalid owner ID")?,
            category_id: Uuid::parse_str(&category_str).context("Invalid category ID")?,
            kind: CategoryKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").context("Invalid date")?,
            amount_cents: row.get("amount_cents"),
            currency: row.get("currency"),
            description: row.get("description"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Budget operations
    // ========================

    /// Save a new budget to the database.
    pub async fn save_budget(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO budgets (id, owner, category_id, amount_cents, currency, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(budget.id.to_string())
        .bind(budget.owner.to_string())
        .bind(budget.category_id.to_string())
        .bind(budget.amount_cents)
        .bind(&budget.currency)
        .bind(budget.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save budget")?;
        Ok(())
    }

    /// Get a user's budget for a category.
    pub async fn get_budget_by_category(
        &self,
        owner: UserId,
        category_id: CategoryId,
    ) -> Result<Option<Budget>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner, category_id, amount_cents, currency, created_at
            FROM budgets
            WHERE owner = ? AND category_id = ?
            "#,
        )
        .bind(owner.to_string())
        .bind(category_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch budget")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_budget(&row)?)),
            None => Ok(None),
        }
    }

    /// List a user's budgets.
    pub async fn list_budgets(&self, owner: UserId) -> Result<Vec<Budget>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner, category_id, amount_cents, currency, created_at
            FROM budgets
            WHERE owner = ?
            ORDER BY created_at
            "#,
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list budgets")?;

        rows.iter().map(Self::row_to_budget).collect()
    }

    /// Delete a budget.
    pub async fn delete_budget(&self, id: BudgetId) -> Result<()> {
        sqlx::query("DELETE FROM budgets WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete budget")?;
        Ok(())
    }

    fn row_to_budget(row: &sqlx::sqlite::SqliteRow) -> Result<Budget> {
        let id_str: String = row.get("id");
        let owner_str: String = row.get("owner");
        let category_str: String = row.get("category_id");
        let created_at_str: String = row.get("created_at");

        Ok(Budget {
            id: Uuid::parse_str(&id_str).context("Invalid budget ID")?,
            owner: Uuid::parse_str(&owner_str).context("Invalid owner ID")?,
            category_id: Uuid::parse_str(&category_str).context("Invalid category ID")?,
            amount_cents: row.get("amount_cents"),
            currency: row.get("currency"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
