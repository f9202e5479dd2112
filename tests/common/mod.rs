// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use soldo::application::service::FinanceService;
use soldo::domain::User;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(FinanceService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = FinanceService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Register a user with a placeholder password hash. Password verification
/// is exercised in the web tests; here the hash is opaque data.
pub async fn create_user(service: &FinanceService, username: &str) -> Result<User> {
    let email = format!("{username}@example.com");
    let user = service
        .register_user(username, &email, "$argon2id$placeholder".to_string())
        .await?;
    Ok(user)
}
