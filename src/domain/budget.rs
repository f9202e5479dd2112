use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CategoryId, Cents, UserId};

pub type BudgetId = Uuid;

/// A recurring monthly spending cap for one category.
/// There is no stored period: budgets apply to whatever calendar month the
/// query date falls in, so "this month's" window is computed at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub owner: UserId,
    pub category_id: CategoryId,
    pub amount_cents: Cents,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(owner: UserId, category_id: CategoryId, amount_cents: Cents, currency: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            category_id,
            amount_cents,
            currency,
            created_at: Utc::now(),
        }
    }
}

/// Bounds of the calendar month containing `date`: first day inclusive,
/// first day of the next month exclusive.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).expect("day 1 exists in every month");
    let next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .expect("first of month is always a valid date");
    (start, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_bounds_mid_year() {
        let (start, end) = month_bounds(d(2025, 2, 15));
        assert_eq!(start, d(2025, 2, 1));
        assert_eq!(end, d(2025, 3, 1));
    }

    #[test]
    fn test_month_bounds_december_rolls_over() {
        let (start, end) = month_bounds(d(2024, 12, 31));
        assert_eq!(start, d(2024, 12, 1));
        assert_eq!(end, d(2025, 1, 1));
    }

    #[test]
    fn test_month_bounds_first_day() {
        let (start, end) = month_bounds(d(2025, 6, 1));
        assert_eq!(start, d(2025, 6, 1));
        assert_eq!(end, d(2025, 7, 1));
    }
}
