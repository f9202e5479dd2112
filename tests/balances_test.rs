mod common;

use anyhow::Result;
use common::{create_user, parse_date, test_service};
use soldo::domain::CategoryKind;

#[tokio::test]
async fn test_balance_is_income_minus_expense() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    service
        .record_transaction(
            user.id,
            CategoryKind::Income,
            parse_date("2025-01-01"),
            100000,
            "USD",
            "Salary",
            Some("Jan Salary".to_string()),
        )
        .await?;
    service
        .record_transaction(
            user.id,
            CategoryKind::Expense,
            parse_date("2025-01-02"),
            20000,
            "USD",
            "Food",
            Some("Groceries".to_string()),
        )
        .await?;

    let balances = service.balances(user.id).await?;
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].currency, "USD");
    // Net savings: 1000.00 - 200.00 = 800.00
    assert_eq!(balances[0].total_cents, 80000);

    Ok(())
}

#[tokio::test]
async fn test_balances_grouped_by_currency() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    service
        .record_transaction(
            user.id,
            CategoryKind::Income,
            parse_date("2025-01-01"),
            50000,
            "EUR",
            "Salary",
            None,
        )
        .await?;
    service
        .record_transaction(
            user.id,
            CategoryKind::Income,
            parse_date("2025-01-01"),
            30000,
            "USD",
            "Salary",
            None,
        )
        .await?;
    service
        .record_transaction(
            user.id,
            CategoryKind::Expense,
            parse_date("2025-01-05"),
            12550,
            "EUR",
            "Food",
            None,
        )
        .await?;

    let balances = service.balances(user.id).await?;
    assert_eq!(balances.len(), 2);

    let eur = balances.iter().find(|b| b.currency == "EUR").unwrap();
    assert_eq!(eur.total_cents, 50000 - 12550);

    let usd = balances.iter().find(|b| b.currency == "USD").unwrap();
    assert_eq!(usd.total_cents, 30000);

    Ok(())
}

#[tokio::test]
async fn test_balance_can_go_negative() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    service
        .record_transaction(
            user.id,
            CategoryKind::Expense,
            parse_date("2025-01-02"),
            7500,
            "USD",
            "Food",
            None,
        )
        .await?;

    let balances = service.balances(user.id).await?;
    assert_eq!(balances[0].total_cents, -7500);

    Ok(())
}

#[tokio::test]
async fn test_empty_balances_for_new_user() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = create_user(&service, "alice").await?;

    let balances = service.balances(user.id).await?;
    assert!(balances.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_balances_are_scoped_to_owner() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = create_user(&service, "alice").await?;
    let bob = create_user(&service, "bob").await?;

    service
        .record_transaction(
            alice.id,
            CategoryKind::Income,
            parse_date("2025-01-01"),
            100000,
            "USD",
            "Salary",
            None,
        )
        .await?;

    let bob_balances = service.balances(bob.id).await?;
    assert!(bob_balances.is_empty());

    Ok(())
}
