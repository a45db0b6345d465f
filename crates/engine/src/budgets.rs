//! Budget rows: an allocated amount and a running remaining amount per
//! (user, expense category).
//!
//! `remaining` is denormalized: it equals `allocated` minus the sum of the
//! expense transactions currently attributed to the budget. Only the mutation
//! ops under [`crate::ops`] may change it after creation.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub allocated: MoneyCents,
    pub remaining: MoneyCents,
}

impl Budget {
    /// A fresh budget starts with its full allocation remaining.
    pub fn new(user_id: String, category_id: Uuid, allocated: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            allocated,
            remaining: allocated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub allocated_minor: i64,
    pub remaining_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id),
            user_id: ActiveValue::Set(budget.user_id.clone()),
            category_id: ActiveValue::Set(budget.category_id),
            allocated_minor: ActiveValue::Set(budget.allocated.cents()),
            remaining_minor: ActiveValue::Set(budget.remaining.cents()),
        }
    }
}

impl From<Model> for Budget {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            allocated: MoneyCents::new(model.allocated_minor),
            remaining: MoneyCents::new(model.remaining_minor),
        }
    }
}
