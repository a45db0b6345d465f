use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Transaction, transactions};

use super::super::{Engine, with_tx};

impl Engine {
    /// Returns a single transaction owned by the user.
    pub async fn transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            if model.user_id != user_id {
                return Err(EngineError::OwnershipViolation("transaction".to_string()));
            }
            Ok(Transaction::from(model))
        })
    }

    /// Lists the user's transactions, newest first by `(date, created_at)`.
    pub async fn list_transactions(&self, user_id: &str) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            let models = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Transaction::from).collect())
        })
    }

    /// Lists the user's transactions for one account, newest first.
    pub async fn list_account_transactions(
        &self,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_account_read(&db_tx, user_id, account_id).await?;
            let models = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id))
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Transaction::from).collect())
        })
    }
}
