//! Existence and ownership guards.
//!
//! Every `require_*` helper runs inside the caller's database transaction.
//! The ones returning rows whose numeric fields the caller will rewrite
//! (accounts, budgets, goals, the transaction row itself) fetch with an
//! exclusive row lock, so the value is read only after no concurrent
//! mutation can be holding it.

use sea_orm::{DatabaseTransaction, QueryFilter, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, budgets, categories, savings_goals, transactions, users};

/// Generates a `require_*` guard for a user-owned entity: locks the row,
/// checks existence, then ownership.
macro_rules! impl_require_owned {
    ($fn_name:ident, $entity:path, $model:ty, $err_msg:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            id: Uuid,
        ) -> ResultEngine<$model> {
            let model = <$entity>::find_by_id(id)
                .lock_exclusive()
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(concat!($err_msg, " not exists").to_string()))?;
            if model.user_id != user_id {
                return Err(EngineError::OwnershipViolation($err_msg.to_string()));
            }
            Ok(model)
        }
    };
}

/// Non-locking variant of [`impl_require_owned`], for read paths.
macro_rules! impl_require_owned_read {
    ($fn_name:ident, $entity:path, $model:ty, $err_msg:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            id: Uuid,
        ) -> ResultEngine<$model> {
            let model = <$entity>::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(concat!($err_msg, " not exists").to_string()))?;
            if model.user_id != user_id {
                return Err(EngineError::OwnershipViolation($err_msg.to_string()));
            }
            Ok(model)
        }
    };
}

impl super::Engine {
    impl_require_owned!(
        require_account,
        accounts::Entity,
        accounts::Model,
        "account"
    );

    impl_require_owned!(require_budget, budgets::Entity, budgets::Model, "budget");

    impl_require_owned!(
        require_goal,
        savings_goals::Entity,
        savings_goals::Model,
        "savings_goal"
    );

    impl_require_owned_read!(
        require_account_read,
        accounts::Entity,
        accounts::Model,
        "account"
    );

    impl_require_owned_read!(require_budget_read, budgets::Entity, budgets::Model, "budget");

    impl_require_owned_read!(
        require_goal_read,
        savings_goals::Entity,
        savings_goals::Model,
        "savings_goal"
    );

    /// Locks and returns the transaction row, checking ownership.
    ///
    /// Locking here serializes concurrent edits of the same transaction: the
    /// loser of the lock race sees the winner's committed fields and cannot
    /// double-reverse or skip an effect.
    pub(super) async fn require_transaction(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        let model = transactions::Entity::find_by_id(id)
            .lock_exclusive()
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::OwnershipViolation("transaction".to_string()));
        }
        Ok(model)
    }

    /// Categories are global (not user-owned) and never mutated by effects,
    /// so a plain read suffices.
    pub(super) async fn require_category(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    /// Looks up the unique (user, category) budget, exclusively locked.
    ///
    /// Returns `None` when no such budget exists; callers treat that as "no
    /// budget-side effect", never as an error.
    pub(super) async fn find_budget_for_category(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<Option<budgets::Model>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::CategoryId.eq(category_id))
            .lock_exclusive()
            .one(db)
            .await
            .map_err(Into::into)
    }
}
