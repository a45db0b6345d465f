use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{CategoryKind, EngineError, ResultEngine, UpdateTransactionCmd, transactions};

use super::super::super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Edits a transaction, rebasing its effect.
    ///
    /// The stored effect is reversed against the old account/budget and the
    /// new effect applied against the new ones, all inside one database
    /// transaction, so the aggregates end up exactly as if the transaction
    /// had been created with the new values in the first place.
    ///
    /// Lock order is fixed: the transaction row first (serializing edits of
    /// the same transaction), then the affected accounts in ascending id
    /// order, then the budgets.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<()> {
        if let Some(amount_minor) = cmd.amount_minor
            && amount_minor <= 0
        {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let stored = self
                .require_transaction(&db_tx, &cmd.user_id, cmd.transaction_id)
                .await?;

            let new_account_id = cmd.account_id.unwrap_or(stored.account_id);
            let new_category_id = cmd.category_id.unwrap_or(stored.category_id);
            // `None` keeps the stored explicit reference, `Some(None)` clears it.
            let new_budget_ref = match cmd.budget_id {
                None => stored.budget_id,
                Some(explicit) => explicit,
            };
            let new_amount_minor = cmd.amount_minor.unwrap_or(stored.amount_minor);
            let new_date = cmd.date.unwrap_or(stored.date);
            let new_description = match cmd.description.as_deref() {
                None => stored.description.clone(),
                Some(text) => normalize_optional_text(Some(text)).unwrap_or_default(),
            };

            let old_category = self.require_category(&db_tx, stored.category_id).await?;
            let old_kind = CategoryKind::try_from(old_category.kind.as_str())?;
            let new_kind = if new_category_id == stored.category_id {
                old_kind
            } else {
                let new_category = self.require_category(&db_tx, new_category_id).await?;
                CategoryKind::try_from(new_category.kind.as_str())?
            };

            let mut account_ids = vec![stored.account_id];
            if new_account_id != stored.account_id {
                account_ids.push(new_account_id);
            }
            account_ids.sort_unstable();

            let mut preview = super::common::EffectPreview::new();
            for account_id in account_ids {
                let account = self
                    .require_account(&db_tx, &cmd.user_id, account_id)
                    .await?;
                preview.seed_account(account.id, account.balance_minor);
            }

            // A newly supplied explicit budget must exist and be owned; the
            // stored one may have vanished and is skipped at resolution.
            // Validated without a lock, the ordered loop below takes it.
            if let Some(Some(budget_id)) = cmd.budget_id {
                self.require_budget_read(&db_tx, &cmd.user_id, budget_id)
                    .await?;
            }

            // Name every budget the edit can touch, then lock in ascending-id
            // order. A candidate gone by lock time is an unresolved budget,
            // not an error.
            let old_candidate = self
                .budget_candidate(
                    &db_tx,
                    &cmd.user_id,
                    old_kind,
                    stored.category_id,
                    stored.budget_id,
                )
                .await?;
            let new_candidate = self
                .budget_candidate(
                    &db_tx,
                    &cmd.user_id,
                    new_kind,
                    new_category_id,
                    new_budget_ref,
                )
                .await?;
            let mut budget_ids: Vec<_> = [old_candidate, new_candidate]
                .into_iter()
                .flatten()
                .collect();
            budget_ids.sort_unstable();
            budget_ids.dedup();
            for budget_id in budget_ids {
                self.lock_budget_remaining(&db_tx, &mut preview, &cmd.user_id, budget_id)
                    .await?;
            }
            let old_budget_id = old_candidate.filter(|id| preview.contains_budget(*id));
            let new_budget_id = new_candidate.filter(|id| preview.contains_budget(*id));

            super::common::reverse_effect(
                &mut preview,
                old_kind,
                stored.amount_minor,
                stored.account_id,
                old_budget_id,
            )?;
            super::common::apply_effect(
                &mut preview,
                new_kind,
                new_amount_minor,
                new_account_id,
                new_budget_id,
            )?;

            let tx_active = transactions::ActiveModel {
                id: ActiveValue::Set(stored.id),
                account_id: ActiveValue::Set(new_account_id),
                category_id: ActiveValue::Set(new_category_id),
                budget_id: ActiveValue::Set(new_budget_ref),
                amount_minor: ActiveValue::Set(new_amount_minor),
                date: ActiveValue::Set(new_date),
                description: ActiveValue::Set(new_description),
                ..Default::default()
            };
            tx_active.update(&db_tx).await?;
            self.persist_preview(&db_tx, preview).await?;

            tracing::debug!(transaction_id = %stored.id, user_id = %cmd.user_id, "transaction updated");
            Ok(())
        })
    }
}
