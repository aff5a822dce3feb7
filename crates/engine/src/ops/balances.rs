use sea_orm::{ConnectionTrait, Statement};

use crate::{MoneyCents, ResultEngine};

use super::Engine;

/// Whether settled shares still count.
///
/// `Gross` sums every obligation as written; `Net` skips shares whose
/// payment flag is set, leaving only what is actually outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Netting {
    Gross,
    Net,
}

/// The two sides of a user's position.
///
/// Both totals run over `owes` rows only; the payer's own share of an
/// expense cancels out and is excluded from both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceView {
    /// What others owe this user on expenses they paid.
    pub owed_to_user: MoneyCents,
    /// What this user owes on expenses paid by others.
    pub user_owes: MoneyCents,
}

impl BalanceView {
    /// Net position: positive means the user is a creditor overall.
    pub fn balance(&self) -> MoneyCents {
        self.owed_to_user - self.user_owes
    }
}

/// The position between two specific users.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairBalance {
    pub user_owes_other: MoneyCents,
    pub other_owes_user: MoneyCents,
}

impl Engine {
    /// The acting user's position across all groups.
    pub async fn user_balance(&self, user_id: &str, netting: Netting) -> ResultEngine<BalanceView> {
        self.require_user_exists(&self.database, user_id).await?;

        let owed_to_user = self
            .sum_owes(&self.database, Some(user_id), None, None, netting)
            .await?;
        let user_owes = self
            .sum_owes(&self.database, None, Some(user_id), None, netting)
            .await?;
        Ok(BalanceView {
            owed_to_user,
            user_owes,
        })
    }

    /// The acting user's position within one group (member-gated).
    pub async fn group_balance(
        &self,
        group_id: &str,
        user_id: &str,
        netting: Netting,
    ) -> ResultEngine<BalanceView> {
        self.require_group_member(&self.database, group_id, user_id)
            .await?;

        let owed_to_user = self
            .sum_owes(&self.database, Some(user_id), None, Some(group_id), netting)
            .await?;
        let user_owes = self
            .sum_owes(&self.database, None, Some(user_id), Some(group_id), netting)
            .await?;
        Ok(BalanceView {
            owed_to_user,
            user_owes,
        })
    }

    /// The pairwise position between the acting user and another user.
    ///
    /// The two directions are reported separately, not netted against each
    /// other.
    pub async fn pair_balance(
        &self,
        user_id: &str,
        other: &str,
        netting: Netting,
    ) -> ResultEngine<PairBalance> {
        let user_owes_other = self
            .sum_owes(&self.database, Some(other), Some(user_id), None, netting)
            .await?;
        let other_owes_user = self
            .sum_owes(&self.database, Some(user_id), Some(other), None, netting)
            .await?;
        Ok(PairBalance {
            user_owes_other,
            other_owes_user,
        })
    }

    /// Sums `owes` rows joined to their expenses, with optional payer,
    /// debtor, and group filters. Self-shares (debtor is the payer) never
    /// count.
    pub(super) async fn sum_owes<C: ConnectionTrait>(
        &self,
        db: &C,
        payer: Option<&str>,
        debtor: Option<&str>,
        group_id: Option<&str>,
        netting: Netting,
    ) -> ResultEngine<MoneyCents> {
        let mut sql = String::from(
            "SELECT COALESCE(SUM(d.amount_cents), 0) AS sum \
             FROM debts d \
             JOIN expenses e ON d.expense_id = e.id \
             WHERE d.kind = 'owes' AND d.username <> e.paid_by",
        );
        let mut values: Vec<sea_orm::Value> = Vec::new();
        if let Some(payer) = payer {
            sql.push_str(" AND e.paid_by = ?");
            values.push(payer.into());
        }
        if let Some(debtor) = debtor {
            sql.push_str(" AND d.username = ?");
            values.push(debtor.into());
        }
        if let Some(group_id) = group_id {
            sql.push_str(" AND e.group_id = ?");
            values.push(group_id.into());
        }
        if netting == Netting::Net {
            sql.push_str(
                " AND NOT EXISTS (SELECT 1 FROM payments p \
                 WHERE p.expense_id = d.expense_id \
                 AND p.username = d.username AND p.paid = ?)",
            );
            values.push(true.into());
        }

        let backend = self.database.get_database_backend();
        let row = db
            .query_one(Statement::from_sql_and_values(backend, sql, values))
            .await?;
        let sum = match row {
            Some(row) => row.try_get::<i64>("", "sum")?,
            None => 0,
        };
        Ok(MoneyCents::new(sum))
    }
}
