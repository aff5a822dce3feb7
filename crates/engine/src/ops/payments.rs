use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, debts, payments};

use super::{Engine, with_tx};

impl Engine {
    /// Marks a user's share of an expense as paid or unpaid.
    ///
    /// Any member of the expense's group may flip the flag (the debtor
    /// confirming they paid, or the payer confirming they were paid back).
    /// The write is an upsert keyed by `(expense_id, username)`, so repeating
    /// the same call is idempotent.
    pub async fn set_payment(
        &self,
        expense_id: &str,
        username: &str,
        paid: bool,
        user_id: &str,
    ) -> ResultEngine<payments::Model> {
        with_tx!(self, |db_tx| {
            self.require_expense_member(&db_tx, expense_id, user_id)
                .await?;

            let has_debt = debts::Entity::find()
                .filter(debts::Column::ExpenseId.eq(expense_id))
                .filter(debts::Column::Username.eq(username))
                .filter(debts::Column::Kind.eq(crate::DebtKind::Owes.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if !has_debt {
                return Err(EngineError::Validation(format!(
                    "{username} owes nothing on this expense"
                )));
            }

            let paid_at = paid.then(Utc::now);
            let existing = payments::Entity::find_by_id((
                expense_id.to_string(),
                username.to_string(),
            ))
            .one(&db_tx)
            .await?;

            let row = match existing {
                Some(model) => {
                    let mut active: payments::ActiveModel = model.into();
                    active.paid = ActiveValue::Set(paid);
                    active.paid_at = ActiveValue::Set(paid_at);
                    active.update(&db_tx).await?
                }
                None => {
                    let active = payments::ActiveModel {
                        expense_id: ActiveValue::Set(expense_id.to_string()),
                        username: ActiveValue::Set(username.to_string()),
                        paid: ActiveValue::Set(paid),
                        paid_at: ActiveValue::Set(paid_at),
                    };
                    active.insert(&db_tx).await?
                }
            };

            Ok(row)
        })
    }
}
