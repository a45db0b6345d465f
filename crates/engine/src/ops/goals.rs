use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    EngineError, MoneyCents, ResultEngine, SavingsGoal, savings_goals,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Creates a savings goal with a zero starting total.
    pub async fn new_goal(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        target_minor: i64,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "savings_goal")?;
        if target_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "target must be > 0".to_string(),
            ));
        }
        let description = normalize_optional_text(description).unwrap_or_default();
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let exists = savings_goals::Entity::find()
                .filter(savings_goals::Column::UserId.eq(user_id))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let goal = SavingsGoal::new(
                user_id.to_string(),
                name,
                description,
                MoneyCents::new(target_minor),
            );
            savings_goals::ActiveModel::from(&goal).insert(&db_tx).await?;

            tracing::debug!(goal_id = %goal.id, %user_id, "savings goal created");
            Ok(goal.id)
        })
    }

    /// Returns a savings goal snapshot.
    pub async fn goal(&self, user_id: &str, goal_id: Uuid) -> ResultEngine<SavingsGoal> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal_read(&db_tx, user_id, goal_id).await?;
            Ok(SavingsGoal::from(model))
        })
    }

    /// Lists the user's savings goals, sorted by name.
    pub async fn list_goals(&self, user_id: &str) -> ResultEngine<Vec<SavingsGoal>> {
        with_tx!(self, |db_tx| {
            let models = savings_goals::Entity::find()
                .filter(savings_goals::Column::UserId.eq(user_id))
                .order_by_asc(savings_goals::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(SavingsGoal::from).collect())
        })
    }

    /// Adds a contribution to a goal's running total and returns the updated
    /// goal.
    ///
    /// The amount arrives as user input text ("10.50", comma accepted) and is
    /// rejected unless it parses to a strictly positive amount. The goal row
    /// is locked before the current total is read, so concurrent
    /// contributions accumulate instead of overwriting each other.
    pub async fn fund_goal(
        &self,
        user_id: &str,
        goal_id: Uuid,
        amount: &str,
    ) -> ResultEngine<SavingsGoal> {
        let amount: MoneyCents = amount.parse()?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, user_id, goal_id).await?;
            let current = MoneyCents::new(goal.current_minor)
                .checked_add(amount)
                .ok_or_else(|| {
                    EngineError::InvalidAmount("goal total overflow".to_string())
                })?;

            let active = savings_goals::ActiveModel {
                id: ActiveValue::Set(goal.id),
                current_minor: ActiveValue::Set(current.cents()),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            tracing::debug!(%goal_id, %user_id, "goal funded");
            let mut funded = SavingsGoal::from(goal);
            funded.current = current;
            Ok(funded)
        })
    }

    /// Deletes a savings goal. Funded totals are bookkeeping only and need no
    /// reversal anywhere.
    pub async fn delete_goal(&self, user_id: &str, goal_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, user_id, goal_id).await?;
            savings_goals::Entity::delete_by_id(goal.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
