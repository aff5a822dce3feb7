//! Expense records.
//!
//! An expense belongs to exactly one group, names a payer and carries the
//! total amount; how the total is divided lives in the debt rows produced at
//! creation/edit time (see [`crate::debts`]).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: String,
    pub amount: MoneyCents,
    pub description: String,
    pub category: Option<String>,
    pub paid_by: String,
    pub split_kind: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group_id: String,
        amount: MoneyCents,
        description: String,
        category: Option<String>,
        paid_by: String,
        split_kind: String,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            amount,
            description,
            category,
            paid_by,
            split_kind,
            created_by,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub amount_cents: i64,
    pub description: String,
    pub category: Option<String>,
    pub paid_by: String,
    pub split_kind: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Groups,
    #[sea_orm(has_many = "super::debts::Entity")]
    Debts,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id.clone()),
            amount_cents: ActiveValue::Set(expense.amount.cents()),
            description: ActiveValue::Set(expense.description.clone()),
            category: ActiveValue::Set(expense.category.clone()),
            paid_by: ActiveValue::Set(expense.paid_by.clone()),
            split_kind: ActiveValue::Set(expense.split_kind.clone()),
            created_by: ActiveValue::Set(expense.created_by.clone()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::Validation("invalid expense id".to_string()))?,
            group_id: model.group_id,
            amount: MoneyCents::new(model.amount_cents),
            description: model.description,
            category: model.category,
            paid_by: model.paid_by,
            split_kind: model.split_kind,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
