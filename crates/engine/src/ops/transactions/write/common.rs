//! Shared machinery for transaction mutations: the balance preview, the
//! effect application/reversal, and budget attribution.

use std::collections::HashMap;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{CategoryKind, EngineError, ResultEngine, accounts, budgets};

use super::super::super::Engine;

/// In-memory preview of the balances a mutation will persist.
///
/// Each map holds the *new* value for a row, keyed by id. Rows are seeded
/// from their exclusively locked models before any delta is applied; adding
/// a delta to an unseeded row is a bug in the calling op, not a data error,
/// and fails loudly.
#[derive(Debug, Default)]
pub(in crate::ops) struct EffectPreview {
    accounts: HashMap<Uuid, i64>,
    budgets: HashMap<Uuid, i64>,
}

impl EffectPreview {
    pub(in crate::ops) fn new() -> Self {
        Self::default()
    }

    pub(in crate::ops) fn seed_account(&mut self, id: Uuid, balance_minor: i64) {
        self.accounts.entry(id).or_insert(balance_minor);
    }

    pub(in crate::ops) fn seed_budget(&mut self, id: Uuid, remaining_minor: i64) {
        self.budgets.entry(id).or_insert(remaining_minor);
    }

    /// Whether a budget row was seeded, i.e. locked and readable.
    pub(in crate::ops) fn contains_budget(&self, id: Uuid) -> bool {
        self.budgets.contains_key(&id)
    }

    fn add_account(&mut self, id: Uuid, delta_minor: i64) -> ResultEngine<()> {
        let balance = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| EngineError::KeyNotFound("account not locked".to_string()))?;
        *balance = balance
            .checked_add(delta_minor)
            .ok_or_else(|| EngineError::InvalidAmount("account balance overflow".to_string()))?;
        Ok(())
    }

    fn add_budget(&mut self, id: Uuid, delta_minor: i64) -> ResultEngine<()> {
        let remaining = self
            .budgets
            .get_mut(&id)
            .ok_or_else(|| EngineError::KeyNotFound("budget not locked".to_string()))?;
        *remaining = remaining
            .checked_add(delta_minor)
            .ok_or_else(|| EngineError::InvalidAmount("budget remaining overflow".to_string()))?;
        Ok(())
    }
}

/// Applies a transaction's effect to the preview: the account balance moves
/// by the category sign times the amount, and an attributed expense eats into
/// the budget's remaining amount.
pub(in crate::ops) fn apply_effect(
    preview: &mut EffectPreview,
    kind: CategoryKind,
    amount_minor: i64,
    account_id: Uuid,
    budget_id: Option<Uuid>,
) -> ResultEngine<()> {
    preview.add_account(account_id, kind.sign() * amount_minor)?;
    if kind == CategoryKind::Expense
        && let Some(budget_id) = budget_id
    {
        preview.add_budget(budget_id, -amount_minor)?;
    }
    Ok(())
}

/// Exact inverse of [`apply_effect`] for the same arguments.
pub(in crate::ops) fn reverse_effect(
    preview: &mut EffectPreview,
    kind: CategoryKind,
    amount_minor: i64,
    account_id: Uuid,
    budget_id: Option<Uuid>,
) -> ResultEngine<()> {
    preview.add_account(account_id, -(kind.sign() * amount_minor))?;
    if kind == CategoryKind::Expense
        && let Some(budget_id) = budget_id
    {
        preview.add_budget(budget_id, amount_minor)?;
    }
    Ok(())
}

/// Budget-side half of [`reverse_effect`], for callers that are deleting the
/// account row itself and must not touch its balance.
pub(in crate::ops) fn reverse_budget_effect(
    preview: &mut EffectPreview,
    kind: CategoryKind,
    amount_minor: i64,
    budget_id: Option<Uuid>,
) -> ResultEngine<()> {
    if kind == CategoryKind::Expense
        && let Some(budget_id) = budget_id
    {
        preview.add_budget(budget_id, amount_minor)?;
    }
    Ok(())
}

impl Engine {
    /// Names the budget row an effect *would* touch, without locking it.
    ///
    /// Used by the update path, which must learn every candidate id first so
    /// it can take the locks in ascending-id order. A candidate is not
    /// guaranteed to still exist at lock time.
    pub(in crate::ops) async fn budget_candidate(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        kind: CategoryKind,
        category_id: Uuid,
        explicit: Option<Uuid>,
    ) -> ResultEngine<Option<Uuid>> {
        if kind != CategoryKind::Expense {
            return Ok(None);
        }
        if explicit.is_some() {
            return Ok(explicit);
        }
        let model = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::CategoryId.eq(category_id))
            .one(db_tx)
            .await?;
        Ok(model.map(|model| model.id))
    }

    /// Locks the user's budget row and seeds the preview with its remaining
    /// amount. Returns `false` when no such budget exists.
    pub(in crate::ops) async fn lock_budget_remaining(
        &self,
        db_tx: &DatabaseTransaction,
        preview: &mut EffectPreview,
        user_id: &str,
        budget_id: Uuid,
    ) -> ResultEngine<bool> {
        let model = budgets::Entity::find_by_id(budget_id)
            .filter(budgets::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(db_tx)
            .await?;
        match model {
            Some(model) => {
                preview.seed_budget(model.id, model.remaining_minor);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resolves which budget (if any) an effect touches, locking it and
    /// seeding the preview on the way.
    ///
    /// Only expenses ever touch a budget. An explicit reference wins when it
    /// still resolves for this user; otherwise the unique (user, category)
    /// budget is used. No budget found means no budget-side effect, silently,
    /// so reversal of an old effect stays safe after a budget delete.
    pub(in crate::ops) async fn resolve_effect_budget(
        &self,
        db_tx: &DatabaseTransaction,
        preview: &mut EffectPreview,
        user_id: &str,
        kind: CategoryKind,
        category_id: Uuid,
        explicit: Option<Uuid>,
    ) -> ResultEngine<Option<Uuid>> {
        if kind != CategoryKind::Expense {
            return Ok(None);
        }
        if let Some(budget_id) = explicit {
            if self
                .lock_budget_remaining(db_tx, preview, user_id, budget_id)
                .await?
            {
                return Ok(Some(budget_id));
            }
            tracing::debug!(%budget_id, "explicit budget no longer resolves, skipping budget effect");
            return Ok(None);
        }
        match self
            .find_budget_for_category(db_tx, user_id, category_id)
            .await?
        {
            Some(model) => {
                preview.seed_budget(model.id, model.remaining_minor);
                Ok(Some(model.id))
            }
            None => Ok(None),
        }
    }

    /// Writes every previewed balance back to its row. Only the numeric
    /// columns are touched.
    pub(in crate::ops) async fn persist_preview(
        &self,
        db_tx: &DatabaseTransaction,
        preview: EffectPreview,
    ) -> ResultEngine<()> {
        for (account_id, balance_minor) in preview.accounts {
            let account = accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                balance_minor: ActiveValue::Set(balance_minor),
                ..Default::default()
            };
            account.update(db_tx).await?;
        }

        for (budget_id, remaining_minor) in preview.budgets {
            let budget = budgets::ActiveModel {
                id: ActiveValue::Set(budget_id),
                remaining_minor: ActiveValue::Set(remaining_minor),
                ..Default::default()
            };
            budget.update(db_tx).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_preview(account_id: Uuid, budget_id: Uuid) -> EffectPreview {
        let mut preview = EffectPreview::new();
        preview.seed_account(account_id, 10_000);
        preview.seed_budget(budget_id, 5_000);
        preview
    }

    #[test]
    fn expense_moves_account_and_budget() {
        let (account_id, budget_id) = (Uuid::new_v4(), Uuid::new_v4());
        let mut preview = seeded_preview(account_id, budget_id);

        apply_effect(
            &mut preview,
            CategoryKind::Expense,
            1_500,
            account_id,
            Some(budget_id),
        )
        .unwrap();

        assert_eq!(preview.accounts[&account_id], 8_500);
        assert_eq!(preview.budgets[&budget_id], 3_500);
    }

    #[test]
    fn income_never_touches_a_budget() {
        let (account_id, budget_id) = (Uuid::new_v4(), Uuid::new_v4());
        let mut preview = seeded_preview(account_id, budget_id);

        apply_effect(
            &mut preview,
            CategoryKind::Income,
            1_500,
            account_id,
            Some(budget_id),
        )
        .unwrap();

        assert_eq!(preview.accounts[&account_id], 11_500);
        assert_eq!(preview.budgets[&budget_id], 5_000);
    }

    #[test]
    fn reverse_undoes_apply_exactly() {
        let (account_id, budget_id) = (Uuid::new_v4(), Uuid::new_v4());
        let mut preview = seeded_preview(account_id, budget_id);

        apply_effect(
            &mut preview,
            CategoryKind::Expense,
            777,
            account_id,
            Some(budget_id),
        )
        .unwrap();
        reverse_effect(
            &mut preview,
            CategoryKind::Expense,
            777,
            account_id,
            Some(budget_id),
        )
        .unwrap();

        assert_eq!(preview.accounts[&account_id], 10_000);
        assert_eq!(preview.budgets[&budget_id], 5_000);
    }

    #[test]
    fn unseeded_rows_are_rejected() {
        let mut preview = EffectPreview::new();
        let err = apply_effect(
            &mut preview,
            CategoryKind::Income,
            100,
            Uuid::new_v4(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::KeyNotFound("account not locked".to_string())
        );
    }
}
