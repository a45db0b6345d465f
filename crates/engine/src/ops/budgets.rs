use uuid::Uuid;

use sea_orm::{
    QueryFilter, QueryOrder, TransactionTrait, Value, prelude::*, sea_query::Expr,
};

use crate::{
    Budget, CategoryKind, EngineError, MoneyCents, ResultEngine, budgets, transactions,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a budget covering one expense category.
    ///
    /// A budget starts with `remaining == allocated`; from then on only
    /// transaction mutations move `remaining`. One budget per
    /// (user, category).
    pub async fn new_budget(
        &self,
        user_id: &str,
        category_id: Uuid,
        allocated_minor: i64,
    ) -> ResultEngine<Uuid> {
        if allocated_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "allocated amount must be >= 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            let category = self.require_category(&db_tx, category_id).await?;
            let kind = CategoryKind::try_from(category.kind.as_str())?;
            if kind != CategoryKind::Expense {
                return Err(EngineError::InvalidCategory(
                    "budgets only cover expense categories".to_string(),
                ));
            }

            let exists = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id))
                .filter(budgets::Column::CategoryId.eq(category_id))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(category.name));
            }

            let budget = Budget::new(
                user_id.to_string(),
                category_id,
                MoneyCents::new(allocated_minor),
            );
            budgets::ActiveModel::from(&budget).insert(&db_tx).await?;

            tracing::debug!(budget_id = %budget.id, %user_id, "budget created");
            Ok(budget.id)
        })
    }

    /// Returns a budget snapshot.
    pub async fn budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget_read(&db_tx, user_id, budget_id).await?;
            Ok(Budget::from(model))
        })
    }

    /// Lists the user's budgets.
    pub async fn list_budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        with_tx!(self, |db_tx| {
            let models = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id))
                .order_by_asc(budgets::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Budget::from).collect())
        })
    }

    /// Deletes a budget.
    ///
    /// Explicit references from transactions are cleared, not deleted; the
    /// transactions and account balances stay as they are. Future effect
    /// resolution simply stops finding this budget.
    pub async fn delete_budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, user_id, budget_id).await?;

            transactions::Entity::update_many()
                .col_expr(transactions::Column::BudgetId, Expr::value(Value::Uuid(None)))
                .filter(transactions::Column::BudgetId.eq(budget.id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_by_id(budget.id).exec(&db_tx).await?;

            tracing::debug!(%budget_id, %user_id, "budget deleted");
            Ok(())
        })
    }
}
