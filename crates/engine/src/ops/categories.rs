use uuid::Uuid;

use sea_orm::{
    QueryFilter, QueryOrder, TransactionTrait, Value, prelude::*, sea_query::Expr,
};

use crate::{
    Category, CategoryKind, EngineError, ResultEngine, budgets, categories, transactions,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Creates a category. Names are globally unique, case-insensitively.
    pub async fn new_category(&self, name: &str, kind: CategoryKind) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let exists = categories::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let category = Category::new(name, kind);
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;

            tracing::debug!(category_id = %category.id, kind = kind.as_str(), "category created");
            Ok(category.id)
        })
    }

    /// Returns a category snapshot.
    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            Category::try_from(model)
        })
    }

    /// Lists all categories, sorted by name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Category::try_from).collect()
        })
    }

    /// Deletes a category and the budgets that cover it.
    ///
    /// Refused while any transaction still carries the category, since that
    /// transaction's sign would become unreadable. Budgets covering the
    /// category go with it; explicit references to those budgets from other
    /// categories' transactions are cleared first.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let category = self.require_category(&db_tx, category_id).await?;

            let in_use = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category.id))
                .one(&db_tx)
                .await?
                .is_some();
            if in_use {
                return Err(EngineError::CategoryInUse(category.name));
            }

            let budget_ids: Vec<Uuid> = budgets::Entity::find()
                .filter(budgets::Column::CategoryId.eq(category.id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| model.id)
                .collect();
            if !budget_ids.is_empty() {
                transactions::Entity::update_many()
                    .col_expr(transactions::Column::BudgetId, Expr::value(Value::Uuid(None)))
                    .filter(transactions::Column::BudgetId.is_in(budget_ids))
                    .exec(&db_tx)
                    .await?;
                budgets::Entity::delete_many()
                    .filter(budgets::Column::CategoryId.eq(category.id))
                    .exec(&db_tx)
                    .await?;
            }

            categories::Entity::delete_by_id(category.id)
                .exec(&db_tx)
                .await?;

            tracing::debug!(%category_id, "category deleted");
            Ok(())
        })
    }
}
