use thiserror::Error;

use crate::domain::ParseCentsError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Username is already taken")]
    UsernameTaken(String),

    #[error("An account with this email already exists")]
    EmailTaken(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("A budget for category '{0}' already exists")]
    BudgetAlreadyExists(String),

    #[error("Budget not found: {0}")]
    BudgetNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] ParseCentsError),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
