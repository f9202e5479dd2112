use crate::domain::{format_cents, Cents};

use super::BudgetStatus;

/// How far along a budget is when an alert fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// Spending crossed the warning threshold but is still within the limit.
    Warning,
    /// Spending exceeds the budgeted amount.
    Exceeded,
}

/// Raised when month-to-date spending for a budget crosses the warning
/// threshold or the limit itself.
#[derive(Debug, Clone)]
pub struct BudgetAlert {
    pub category_name: String,
    pub currency: String,
    pub spent_cents: Cents,
    pub limit_cents: Cents,
    pub level: AlertLevel,
}

/// Delivery seam for budget alerts. Email and other channels live outside
/// this crate; the shipped implementation writes to the log.
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: &BudgetAlert);
}

/// Notifier that records alerts via `tracing`.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &BudgetAlert) {
        match alert.level {
            AlertLevel::Exceeded => tracing::warn!(
                category = %alert.category_name,
                spent = %format_cents(alert.spent_cents),
                limit = %format_cents(alert.limit_cents),
                currency = %alert.currency,
                "budget exceeded"
            ),
            AlertLevel::Warning => tracing::warn!(
                category = %alert.category_name,
                spent = %format_cents(alert.spent_cents),
                limit = %format_cents(alert.limit_cents),
                currency = %alert.currency,
                "budget warning threshold crossed"
            ),
        }
    }
}

/// Evaluate budget statuses against a warning threshold (percent of the
/// limit). Spending above the limit is `Exceeded`; at or above the threshold
/// but within the limit is `Warning`; below the threshold produces nothing.
pub fn evaluate_alerts(statuses: &[BudgetStatus], warn_percent: u8) -> Vec<BudgetAlert> {
    let mut alerts = Vec::new();
    for status in statuses {
        let limit = status.budget.amount_cents;
        let level = if status.spent_cents > limit {
            Some(AlertLevel::Exceeded)
        } else if status.spent_cents * 100 >= limit * warn_percent as i64 {
            Some(AlertLevel::Warning)
        } else {
            None
        };

        if let Some(level) = level {
            alerts.push(BudgetAlert {
                category_name: status.category_name.clone(),
                currency: status.budget.currency.clone(),
                spent_cents: status.spent_cents,
                limit_cents: limit,
                level,
            });
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Budget, month_bounds};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn status(spent: Cents, limit: Cents) -> BudgetStatus {
        let (month_start, month_end) =
            month_bounds(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        BudgetStatus {
            budget: Budget::new(Uuid::new_v4(), Uuid::new_v4(), limit, "USD".into()),
            category_name: "Food".into(),
            spent_cents: spent,
            remaining_cents: limit - spent,
            month_start,
            month_end,
        }
    }

    #[test]
    fn test_no_alert_below_threshold() {
        let alerts = evaluate_alerts(&[status(10000, 50000)], 80);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_warning_at_threshold() {
        let alerts = evaluate_alerts(&[status(40000, 50000)], 80);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
    }

    #[test]
    fn test_spending_the_exact_limit_is_a_warning() {
        let alerts = evaluate_alerts(&[status(50000, 50000)], 80);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
    }

    #[test]
    fn test_exceeded_above_limit() {
        let alerts = evaluate_alerts(&[status(50001, 50000)], 80);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Exceeded);
    }

    #[test]
    fn test_mixed_statuses() {
        let statuses = vec![status(1000, 50000), status(60000, 50000)];
        let alerts = evaluate_alerts(&statuses, 80);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Exceeded);
    }
}
