mod common;

use std::sync::Mutex;

use anyhow::Result;
use common::{create_user, parse_date, test_service};
use soldo::application::{AlertLevel, AppError, BudgetAlert, Notifier};
use soldo::domain::CategoryKind;

/// Notifier that records alerts for assertions.
struct CollectingNotifier(Mutex<Vec<BudgetAlert>>);

impl CollectingNotifier {
    fn new() -> Self {
        Self(Mutex::new(Vec::new()))
    }

    fn alerts(&self) -> Vec<BudgetAlert> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, alert: &BudgetAlert) {
        self.0.lock().unwrap().push(alert.clone());
    }
}

#[tokio::test]
async fn test_budget_status_spent_and_limit() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    service
        .create_budget(user.id, "Food", 50000, "USD")
        .await?;
    service
        .record_transaction(
            user.id,
            CategoryKind::Expense,
            parse_date("2025-02-15"),
            10000,
            "USD",
            "Food",
            None,
        )
        .await?;

    let statuses = service
        .budget_statuses(user.id, parse_date("2025-02-20"))
        .await?;
    assert_eq!(statuses.len(), 1);

    let food = &statuses[0];
    assert_eq!(food.category_name, "Food");
    assert_eq!(food.spent_cents, 10000); // 100.00 spent
    assert_eq!(food.budget.amount_cents, 50000); // 500.00 limit
    assert_eq!(food.remaining_cents, 40000);

    Ok(())
}

#[tokio::test]
async fn test_budget_only_counts_current_month() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    service
        .create_budget(user.id, "Food", 50000, "USD")
        .await?;

    // Last month, this month, next month
    for (date, cents) in [
        ("2025-01-31", 30000),
        ("2025-02-10", 15000),
        ("2025-03-01", 20000),
    ] {
        service
            .record_transaction(
                user.id,
                CategoryKind::Expense,
                parse_date(date),
                cents,
                "USD",
                "Food",
                None,
            )
            .await?;
    }

    let statuses = service
        .budget_statuses(user.id, parse_date("2025-02-20"))
        .await?;
    assert_eq!(
        statuses[0].spent_cents, 15000,
        "Should only count spending in the current calendar month"
    );

    Ok(())
}

#[tokio::test]
async fn test_budget_ignores_income_and_other_currencies() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    service
        .create_budget(user.id, "Food", 50000, "USD")
        .await?;

    // Income in the budget category must not count as spending
    service
        .record_transaction(
            user.id,
            CategoryKind::Income,
            parse_date("2025-02-05"),
            20000,
            "USD",
            "Food",
            Some("Refund".to_string()),
        )
        .await?;
    // Spending in another currency must not consume a USD budget
    service
        .record_transaction(
            user.id,
            CategoryKind::Expense,
            parse_date("2025-02-06"),
            20000,
            "EUR",
            "Food",
            None,
        )
        .await?;

    let statuses = service
        .budget_statuses(user.id, parse_date("2025-02-20"))
        .await?;
    assert_eq!(statuses[0].spent_cents, 0);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_budget_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    service
        .create_budget(user.id, "Food", 50000, "USD")
        .await?;
    let result = service.create_budget(user.id, "Food", 30000, "USD").await;
    assert!(matches!(result, Err(AppError::BudgetAlreadyExists(_))));

    Ok(())
}

#[tokio::test]
async fn test_alert_fires_when_limit_exceeded() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;
    let notifier = CollectingNotifier::new();

    service
        .create_budget(user.id, "Food", 50000, "USD")
        .await?;
    service
        .record_transaction(
            user.id,
            CategoryKind::Expense,
            parse_date("2025-02-10"),
            60000,
            "USD",
            "Food",
            None,
        )
        .await?;

    let (_statuses, alerts) = service
        .check_budgets(user.id, parse_date("2025-02-20"), &notifier)
        .await?;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Exceeded);
    assert_eq!(alerts[0].spent_cents, 60000);
    assert_eq!(alerts[0].limit_cents, 50000);

    // The notifier saw the same alert
    assert_eq!(notifier.alerts().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_alert_fires_at_warning_threshold() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;
    let notifier = CollectingNotifier::new();

    service
        .create_budget(user.id, "Food", 50000, "USD")
        .await?;
    // 80% of 500.00
    service
        .record_transaction(
            user.id,
            CategoryKind::Expense,
            parse_date("2025-02-10"),
            40000,
            "USD",
            "Food",
            None,
        )
        .await?;

    let (_statuses, alerts) = service
        .check_budgets(user.id, parse_date("2025-02-20"), &notifier)
        .await?;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Warning);

    Ok(())
}

#[tokio::test]
async fn test_no_alert_below_threshold() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;
    let notifier = CollectingNotifier::new();

    service
        .create_budget(user.id, "Food", 50000, "USD")
        .await?;
    service
        .record_transaction(
            user.id,
            CategoryKind::Expense,
            parse_date("2025-02-10"),
            10000,
            "USD",
            "Food",
            None,
        )
        .await?;

    let (statuses, alerts) = service
        .check_budgets(user.id, parse_date("2025-02-20"), &notifier)
        .await?;
    assert_eq!(statuses.len(), 1);
    assert!(alerts.is_empty());
    assert!(notifier.alerts().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_delete_budget() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    service
        .create_budget(user.id, "Food", 50000, "USD")
        .await?;
    assert_eq!(
        service
            .budget_statuses(user.id, parse_date("2025-02-20"))
            .await?
            .len(),
        1
    );

    service.delete_budget(user.id, "Food").await?;
    assert!(service
        .budget_statuses(user.id, parse_date("2025-02-20"))
        .await?
        .is_empty());

    Ok(())
}
