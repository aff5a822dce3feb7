use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Debt, EngineError, Expense, MoneyCents, ResultEngine, SplitStrategy, allocate,
    build_debt_rows, debts, expenses, payments,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

/// Input for creating an expense.
#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub group_id: String,
    pub amount: MoneyCents,
    pub description: String,
    pub category: Option<String>,
    pub paid_by: String,
    pub participants: Vec<String>,
    pub strategy: SplitStrategy,
    /// Acting (authenticated) user; recorded as the expense creator.
    pub user_id: String,
}

/// Input for editing an expense. The group cannot change; everything else is
/// resupplied and the ledger rows are rebuilt from scratch.
#[derive(Clone, Debug)]
pub struct UpdateExpenseCmd {
    pub expense_id: String,
    pub amount: MoneyCents,
    pub description: String,
    pub category: Option<String>,
    pub paid_by: String,
    pub participants: Vec<String>,
    pub strategy: SplitStrategy,
    pub user_id: String,
}

/// An expense with its ledger rows and settlement flags.
#[derive(Clone, Debug)]
pub struct ExpenseDetail {
    pub expense: Expense,
    pub debts: Vec<Debt>,
    pub payments: Vec<payments::Model>,
}

impl Engine {
    /// Creates an expense and its debt rows atomically.
    ///
    /// The allocation is computed (and fully validated) before anything is
    /// written, so a share mismatch leaves no rows behind.
    pub async fn create_expense(&self, cmd: NewExpenseCmd) -> ResultEngine<ExpenseDetail> {
        let description = normalize_required_text(&cmd.description, "description")?;
        let shares = allocate(cmd.amount, &cmd.participants, &cmd.paid_by, &cmd.strategy)?;

        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, &cmd.group_id, &cmd.user_id)
                .await?;
            let mut involved = cmd.participants.clone();
            if !involved.contains(&cmd.paid_by) {
                involved.push(cmd.paid_by.clone());
            }
            self.require_members(&db_tx, &cmd.group_id, &involved).await?;

            let expense = Expense::new(
                cmd.group_id.clone(),
                cmd.amount,
                description,
                normalize_optional_text(cmd.category.as_deref()),
                cmd.paid_by.clone(),
                cmd.strategy.as_str().to_string(),
                cmd.user_id.clone(),
                Utc::now(),
            )?;
            let expense_id = expense.id.to_string();
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            let rows = build_debt_rows(&expense_id, &cmd.paid_by, cmd.amount, &shares);
            for debt in &rows {
                debts::ActiveModel::from(debt).insert(&db_tx).await?;
            }

            Ok(ExpenseDetail {
                expense,
                debts: rows,
                payments: Vec::new(),
            })
        })
    }

    /// Edits an expense (creator-only), replacing its debt rows.
    ///
    /// Replace semantics: all prior rows are deleted and the new allocation
    /// is inserted in the same DB transaction, so the per-expense closed
    /// ledger is never observable half-built.
    pub async fn update_expense(&self, cmd: UpdateExpenseCmd) -> ResultEngine<ExpenseDetail> {
        let description = normalize_required_text(&cmd.description, "description")?;
        let shares = allocate(cmd.amount, &cmd.participants, &cmd.paid_by, &cmd.strategy)?;

        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, &cmd.expense_id).await?;
            if model.created_by != cmd.user_id {
                return Err(EngineError::Forbidden(
                    "only the expense creator may edit it".to_string(),
                ));
            }
            let mut involved = cmd.participants.clone();
            if !involved.contains(&cmd.paid_by) {
                involved.push(cmd.paid_by.clone());
            }
            self.require_members(&db_tx, &model.group_id, &involved).await?;

            let updated = expenses::ActiveModel {
                id: sea_orm::ActiveValue::Set(model.id.clone()),
                amount_cents: sea_orm::ActiveValue::Set(cmd.amount.cents()),
                description: sea_orm::ActiveValue::Set(description),
                category: sea_orm::ActiveValue::Set(normalize_optional_text(
                    cmd.category.as_deref(),
                )),
                paid_by: sea_orm::ActiveValue::Set(cmd.paid_by.clone()),
                split_kind: sea_orm::ActiveValue::Set(cmd.strategy.as_str().to_string()),
                ..Default::default()
            };
            let updated = updated.update(&db_tx).await?;

            debts::Entity::delete_many()
                .filter(debts::Column::ExpenseId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            let rows = build_debt_rows(&model.id, &cmd.paid_by, cmd.amount, &shares);
            for debt in &rows {
                debts::ActiveModel::from(debt).insert(&db_tx).await?;
            }

            let payment_rows = payments::Entity::find()
                .filter(payments::Column::ExpenseId.eq(model.id.clone()))
                .all(&db_tx)
                .await?;

            Ok(ExpenseDetail {
                expense: Expense::try_from(updated)?,
                debts: rows,
                payments: payment_rows,
            })
        })
    }

    /// Deletes an expense (creator-only), cascading its debts and payments.
    pub async fn delete_expense(&self, expense_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, expense_id).await?;
            if model.created_by != user_id {
                return Err(EngineError::Forbidden(
                    "only the expense creator may delete it".to_string(),
                ));
            }

            payments::Entity::delete_many()
                .filter(payments::Column::ExpenseId.eq(expense_id))
                .exec(&db_tx)
                .await?;
            debts::Entity::delete_many()
                .filter(debts::Column::ExpenseId.eq(expense_id))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }

    /// Returns an expense with its ledger rows and payment flags
    /// (member-gated).
    pub async fn expense_detail(
        &self,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<ExpenseDetail> {
        let model = self
            .require_expense_member(&self.database, expense_id, user_id)
            .await?;

        let debt_models = debts::Entity::find()
            .filter(debts::Column::ExpenseId.eq(expense_id))
            .all(&self.database)
            .await?;
        let mut debt_rows = Vec::with_capacity(debt_models.len());
        for debt_model in debt_models {
            debt_rows.push(Debt::try_from(debt_model)?);
        }

        let payment_rows = payments::Entity::find()
            .filter(payments::Column::ExpenseId.eq(expense_id))
            .all(&self.database)
            .await?;

        Ok(ExpenseDetail {
            expense: Expense::try_from(model)?,
            debts: debt_rows,
            payments: payment_rows,
        })
    }

    /// Lists a group's expenses, newest first (member-gated).
    pub async fn list_group_expenses(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        self.require_group_member(&self.database, group_id, user_id)
            .await?;

        let models = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id))
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Expense::try_from(model)?);
        }
        Ok(out)
    }
}
