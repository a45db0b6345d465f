use uuid::Uuid;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{
    CategoryKind, CreateTransactionCmd, MoneyCents, ResultEngine, Transaction, transactions,
};

use super::super::super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Records a transaction and applies its effect.
    ///
    /// The account balance moves by the category sign times the amount. An
    /// expense additionally decrements the remaining amount of its attributed
    /// budget: the explicit `budget_id` if given, else the unique
    /// (user, category) budget if one exists, else no budget at all.
    ///
    /// An explicit `budget_id` that does not exist or belongs to another user
    /// is rejected before anything is written.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Uuid> {
        let description = normalize_optional_text(cmd.description.as_deref()).unwrap_or_default();
        let tx = Transaction::new(
            cmd.user_id.clone(),
            cmd.account_id,
            cmd.category_id,
            cmd.budget_id,
            MoneyCents::new(cmd.amount_minor),
            cmd.date,
            description,
        )?;

        with_tx!(self, |db_tx| {
            let account = self
                .require_account(&db_tx, &cmd.user_id, cmd.account_id)
                .await?;
            let category = self.require_category(&db_tx, cmd.category_id).await?;
            let kind = CategoryKind::try_from(category.kind.as_str())?;
            if let Some(budget_id) = cmd.budget_id {
                self.require_budget(&db_tx, &cmd.user_id, budget_id).await?;
            }

            let mut preview = super::common::EffectPreview::new();
            preview.seed_account(account.id, account.balance_minor);
            let budget_id = self
                .resolve_effect_budget(
                    &db_tx,
                    &mut preview,
                    &cmd.user_id,
                    kind,
                    category.id,
                    cmd.budget_id,
                )
                .await?;
            super::common::apply_effect(&mut preview, kind, tx.amount.cents(), account.id, budget_id)?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            self.persist_preview(&db_tx, preview).await?;

            tracing::debug!(transaction_id = %tx.id, user_id = %tx.user_id, "transaction created");
            Ok(tx.id)
        })
    }
}
