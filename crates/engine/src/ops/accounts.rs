use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{Account, CategoryKind, EngineError, MoneyCents, ResultEngine, accounts, transactions};

use super::transactions::write::common::{EffectPreview, reverse_budget_effect};
use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Creates an account for the user, optionally with an opening balance.
    ///
    /// Account names are unique per user, case-insensitively.
    pub async fn new_account(
        &self,
        user_id: &str,
        name: &str,
        opening_balance_minor: i64,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let account = Account::new(
                user_id.to_string(),
                name,
                MoneyCents::new(opening_balance_minor),
            );
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;

            tracing::debug!(account_id = %account.id, %user_id, "account created");
            Ok(account.id)
        })
    }

    /// Returns an account snapshot.
    pub async fn account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account_read(&db_tx, user_id, account_id).await?;
            Ok(Account::from(model))
        })
    }

    /// Lists the user's accounts, sorted by name.
    pub async fn list_accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id))
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Account::from).collect())
        })
    }

    /// Deletes an account together with its transactions.
    ///
    /// The budget-side effects of the account's expenses are reversed, so the
    /// remaining amounts of the user's budgets read as if those expenses had
    /// never happened. The account's own balance disappears with the row.
    pub async fn delete_account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, user_id, account_id).await?;

            let stored_txs = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account.id))
                .all(&db_tx)
                .await?;

            let mut preview = EffectPreview::new();
            for stored in &stored_txs {
                let category = self.require_category(&db_tx, stored.category_id).await?;
                let kind = CategoryKind::try_from(category.kind.as_str())?;
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
                reverse_budget_effect(&mut preview, kind, stored.amount_minor, budget_id)?;
            }

            transactions::Entity::delete_many()
                .filter(transactions::Column::AccountId.eq(account.id))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_by_id(account.id)
                .exec(&db_tx)
                .await?;
            self.persist_preview(&db_tx, preview).await?;

            tracing::debug!(%account_id, %user_id, transactions = stored_txs.len(), "account deleted");
            Ok(())
        })
    }
}
