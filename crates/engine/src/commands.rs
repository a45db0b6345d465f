//! Command structs for engine operations.
//!
//! These types group parameters for transaction writes, keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

/// Create a transaction.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub category_id: Uuid,
    /// Explicit budget attribution; without it an expense falls back to the
    /// (user, category) budget at effect time.
    pub budget_id: Option<Uuid>,
    pub amount_minor: i64,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        category_id: Uuid,
        amount_minor: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            category_id,
            budget_id: None,
            amount_minor,
            date,
            description: None,
        }
    }

    #[must_use]
    pub fn budget_id(mut self, budget_id: Uuid) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Update an existing transaction.
///
/// Unset fields keep their stored value. `budget_id` is doubly optional so a
/// caller can distinguish "leave as is" (`None`) from "clear the explicit
/// reference" (`Some(None)`).
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,

    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub budget_id: Option<Option<Uuid>>,
    pub amount_minor: Option<i64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            account_id: None,
            category_id: None,
            budget_id: None,
            amount_minor: None,
            date: None,
            description: None,
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn budget_id(mut self, budget_id: Uuid) -> Self {
        self.budget_id = Some(Some(budget_id));
        self
    }

    #[must_use]
    pub fn clear_budget(mut self) -> Self {
        self.budget_id = Some(None);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
