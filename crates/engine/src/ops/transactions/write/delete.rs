use uuid::Uuid;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{CategoryKind, ResultEngine, transactions};

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Deletes a transaction, reversing its effect.
    ///
    /// After the commit the account balance and any attributed budget's
    /// remaining amount read as if the transaction had never existed.
    pub async fn delete_transaction(&self, user_id: &str, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let stored = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let category = self.require_category(&db_tx, stored.category_id).await?;
            let kind = CategoryKind::try_from(category.kind.as_str())?;
            let account = self
                .require_account(&db_tx, user_id, stored.account_id)
                .await?;

            let mut preview = super::common::EffectPreview::new();
            preview.seed_account(account.id, account.balance_minor);
            let budget_id = self
                .resolve_effect_budget(
                    &db_tx,
                    &mut preview,
                    user_id,
                    kind,
                    stored.category_id,
                    stored.budget_id,
                )
                .await?;
            super::common::reverse_effect(
                &mut preview,
                kind,
                stored.amount_minor,
                stored.account_id,
                budget_id,
            )?;

            transactions::Entity::delete_by_id(stored.id)
                .exec(&db_tx)
                .await?;
            self.persist_preview(&db_tx, preview).await?;

            tracing::debug!(%transaction_id, %user_id, "transaction deleted");
            Ok(())
        })
    }
}
