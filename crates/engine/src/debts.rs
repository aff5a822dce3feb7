//! Debt ledger entries.
//!
//! A [`Debt`] is a single signed obligation tied to one expense and one user:
//! `owes` rows are individual obligations, the `owed` row is the payer's
//! claim on the full expense total (the payer advanced the money and is owed
//! back whatever others did not cover).
//!
//! Invariant per expense: the `owes` amounts and the `owed` amounts each sum
//! to the expense total (a closed ledger). Money is neither created nor
//! destroyed by splitting.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    /// The user owes this amount on the expense.
    Owes,
    /// The user is owed this amount (the payer's claim).
    Owed,
}

impl DebtKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owes => "owes",
            Self::Owed => "owed",
        }
    }
}

impl TryFrom<&str> for DebtKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owes" => Ok(Self::Owes),
            "owed" => Ok(Self::Owed),
            other => Err(EngineError::Validation(format!(
                "invalid debt kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub expense_id: String,
    pub username: String,
    pub kind: DebtKind,
    pub amount: MoneyCents,
}

impl Debt {
    pub fn new(expense_id: &str, username: &str, kind: DebtKind, amount: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id: expense_id.to_string(),
            username: username.to_string(),
            kind,
            amount,
        }
    }
}

/// Builds the full set of ledger rows for one expense.
///
/// The payer always gets a single `owed` row for the full total (even when
/// not a participant). Each participant with a non-zero share gets an `owes`
/// row, including the payer's own share, which keeps the per-expense ledger
/// closed: `sum(owes) == sum(owed) == total`.
pub fn build_debt_rows(
    expense_id: &str,
    payer: &str,
    total: MoneyCents,
    shares: &[(String, MoneyCents)],
) -> Vec<Debt> {
    let mut rows = Vec::with_capacity(shares.len() + 1);
    rows.push(Debt::new(expense_id, payer, DebtKind::Owed, total));
    for (username, amount) in shares {
        if amount.is_zero() {
            continue;
        }
        rows.push(Debt::new(expense_id, username, DebtKind::Owes, *amount));
    }
    rows
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub username: String,
    pub kind: String,
    pub amount_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Debt> for ActiveModel {
    fn from(debt: &Debt) -> Self {
        Self {
            id: ActiveValue::Set(debt.id.to_string()),
            expense_id: ActiveValue::Set(debt.expense_id.clone()),
            username: ActiveValue::Set(debt.username.clone()),
            kind: ActiveValue::Set(debt.kind.as_str().to_string()),
            amount_cents: ActiveValue::Set(debt.amount.cents()),
        }
    }
}

impl TryFrom<Model> for Debt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::Validation("invalid debt id".to_string()))?,
            expense_id: model.expense_id,
            username: model.username,
            kind: DebtKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_cents),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(rows: &[Debt], kind: DebtKind) -> MoneyCents {
        rows.iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.amount)
            .sum()
    }

    #[test]
    fn ledger_is_closed_for_even_shares() {
        let shares = vec![
            ("ana".to_string(), MoneyCents::new(334)),
            ("ben".to_string(), MoneyCents::new(333)),
            ("carla".to_string(), MoneyCents::new(333)),
        ];
        let rows = build_debt_rows("e1", "ana", MoneyCents::new(1000), &shares);

        assert_eq!(sum(&rows, DebtKind::Owed), MoneyCents::new(1000));
        assert_eq!(sum(&rows, DebtKind::Owes), MoneyCents::new(1000));
        // One claim row plus one obligation per participant.
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].username, "ana");
        assert_eq!(rows[0].kind, DebtKind::Owed);
    }

    #[test]
    fn zero_shares_produce_no_rows() {
        let shares = vec![
            ("ana".to_string(), MoneyCents::ZERO),
            ("ben".to_string(), MoneyCents::new(5000)),
        ];
        let rows = build_debt_rows("e1", "ana", MoneyCents::new(5000), &shares);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].username, "ben");
        assert_eq!(rows[1].amount, MoneyCents::new(5000));
        assert_eq!(sum(&rows, DebtKind::Owed), sum(&rows, DebtKind::Owes));
    }

    #[test]
    fn payer_outside_participants_still_gets_the_claim() {
        let shares = vec![
            ("ben".to_string(), MoneyCents::new(500)),
            ("carla".to_string(), MoneyCents::new(500)),
        ];
        let rows = build_debt_rows("e1", "ana", MoneyCents::new(1000), &shares);

        assert_eq!(rows[0].username, "ana");
        assert_eq!(rows[0].amount, MoneyCents::new(1000));
        assert_eq!(sum(&rows, DebtKind::Owes), MoneyCents::new(1000));
    }

    #[test]
    fn kind_round_trips_through_strings() {
        assert_eq!(DebtKind::try_from("owes").unwrap(), DebtKind::Owes);
        assert_eq!(DebtKind::try_from("owed").unwrap(), DebtKind::Owed);
        assert!(DebtKind::try_from("other").is_err());
    }
}
