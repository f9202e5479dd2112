pub mod error;
pub mod notify;
pub mod service;

pub use error::*;
pub use notify::{AlertLevel, BudgetAlert, LogNotifier, Notifier};
pub use service::*;
