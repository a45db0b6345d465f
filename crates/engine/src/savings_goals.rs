//! Savings goals: a running total funded explicitly, independent of the
//! ledger.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub current: MoneyCents,
    pub target: MoneyCents,
    pub created_at: DateTime<Utc>,
}

impl SavingsGoal {
    pub fn new(user_id: String, name: String, description: String, target: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            description,
            current: MoneyCents::ZERO,
            target,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub current_minor: i64,
    pub target_minor: i64,
    pub created_at: DateTimeUtc,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingsGoal> for ActiveModel {
    fn from(goal: &SavingsGoal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id),
            user_id: ActiveValue::Set(goal.user_id.clone()),
            name: ActiveValue::Set(goal.name.clone()),
            description: ActiveValue::Set(goal.description.clone()),
            current_minor: ActiveValue::Set(goal.current.cents()),
            target_minor: ActiveValue::Set(goal.target.cents()),
            created_at: ActiveValue::Set(goal.created_at),
        }
    }
}

impl From<Model> for SavingsGoal {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            current: MoneyCents::new(model.current_minor),
            target: MoneyCents::new(model.target_minor),
            created_at: model.created_at,
        }
    }
}
