use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, Statement, prelude::*};

use crate::{MoneyCents, ResultEngine, group_members};

use super::{Engine, Netting};

/// A group's settlement overview.
#[derive(Clone, Debug)]
pub struct GroupSummary {
    pub total_spent: MoneyCents,
    pub total_settled: MoneyCents,
    pub total_outstanding: MoneyCents,
    pub members: Vec<MemberBalance>,
}

/// One member's gross in-group position.
#[derive(Clone, Debug)]
pub struct MemberBalance {
    pub username: String,
    pub owed_to: MoneyCents,
    pub owes: MoneyCents,
}

/// One aggregated debtor/creditor pair within a group.
#[derive(Clone, Debug)]
pub struct BreakdownRow {
    pub debtor: String,
    pub debtor_name: String,
    pub creditor: String,
    pub creditor_name: String,
    pub total: MoneyCents,
}

/// One creditor the acting user still owes money to.
#[derive(Clone, Debug)]
pub struct OwedCreditor {
    pub creditor: String,
    pub creditor_name: String,
    pub total: MoneyCents,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityDirection {
    /// The acting user paid and recovers money from the others.
    Recovers,
    /// Someone else paid and the acting user owes their share.
    Owes,
}

impl ActivityDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recovers => "recovers",
            Self::Owes => "owes",
        }
    }
}

/// One expense in the acting user's activity feed.
#[derive(Clone, Debug)]
pub struct ActivityRow {
    pub expense_id: String,
    pub group_id: String,
    pub group_name: String,
    pub description: String,
    pub total: MoneyCents,
    pub direction: ActivityDirection,
    /// What the feed entry means for the user: the amount they recover
    /// (total minus their own share) or the share they owe.
    pub amount: MoneyCents,
    pub created_at: DateTime<Utc>,
}

impl Engine {
    /// A group's spend/settled/outstanding totals plus per-member gross
    /// positions (member-gated).
    pub async fn group_summary(&self, group_id: &str, user_id: &str) -> ResultEngine<GroupSummary> {
        self.require_group_member(&self.database, group_id, user_id)
            .await?;

        let backend = self.database.get_database_backend();
        let row = self
            .database
            .query_one(Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(amount_cents), 0) AS sum FROM expenses WHERE group_id = ?",
                vec![group_id.into()],
            ))
            .await?;
        let total_spent = match row {
            Some(row) => MoneyCents::new(row.try_get::<i64>("", "sum")?),
            None => MoneyCents::ZERO,
        };

        let gross = self
            .sum_owes(&self.database, None, None, Some(group_id), Netting::Gross)
            .await?;
        let total_outstanding = self
            .sum_owes(&self.database, None, None, Some(group_id), Netting::Net)
            .await?;
        let total_settled = gross - total_outstanding;

        let memberships = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .all(&self.database)
            .await?;
        let mut members = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let username = membership.username;
            let owed_to = self
                .sum_owes(
                    &self.database,
                    Some(&username),
                    None,
                    Some(group_id),
                    Netting::Gross,
                )
                .await?;
            let owes = self
                .sum_owes(
                    &self.database,
                    None,
                    Some(&username),
                    Some(group_id),
                    Netting::Gross,
                )
                .await?;
            members.push(MemberBalance {
                username,
                owed_to,
                owes,
            });
        }
        members.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(GroupSummary {
            total_spent,
            total_settled,
            total_outstanding,
            members,
        })
    }

    /// Who owes whom within a group, aggregated per debtor/creditor pair
    /// (member-gated).
    ///
    /// Self-pairs are excluded. Rows come back largest first; ties break on
    /// (debtor, creditor) so the order is stable across runs.
    pub async fn debt_breakdown(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<BreakdownRow>> {
        self.require_group_member(&self.database, group_id, user_id)
            .await?;

        let backend = self.database.get_database_backend();
        let rows = self
            .database
            .query_all(Statement::from_sql_and_values(
                backend,
                "SELECT d.username AS debtor, du.name AS debtor_name, \
                        e.paid_by AS creditor, cu.name AS creditor_name, \
                        SUM(d.amount_cents) AS total \
                 FROM debts d \
                 JOIN expenses e ON d.expense_id = e.id \
                 JOIN users du ON du.username = d.username \
                 JOIN users cu ON cu.username = e.paid_by \
                 WHERE e.group_id = ? AND d.kind = 'owes' AND d.username <> e.paid_by \
                 GROUP BY d.username, e.paid_by \
                 ORDER BY SUM(d.amount_cents) DESC, d.username ASC, e.paid_by ASC",
                vec![group_id.into()],
            ))
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(BreakdownRow {
                debtor: row.try_get("", "debtor")?,
                debtor_name: row.try_get("", "debtor_name")?,
                creditor: row.try_get("", "creditor")?,
                creditor_name: row.try_get("", "creditor_name")?,
                total: MoneyCents::new(row.try_get::<i64>("", "total")?),
            });
        }
        Ok(out)
    }

    /// The creditors the acting user still owes, with unpaid totals.
    pub async fn owed_creditors(&self, user_id: &str) -> ResultEngine<Vec<OwedCreditor>> {
        self.require_user_exists(&self.database, user_id).await?;

        let backend = self.database.get_database_backend();
        let rows = self
            .database
            .query_all(Statement::from_sql_and_values(
                backend,
                "SELECT e.paid_by AS creditor, cu.name AS creditor_name, \
                        SUM(d.amount_cents) AS total \
                 FROM debts d \
                 JOIN expenses e ON d.expense_id = e.id \
                 JOIN users cu ON cu.username = e.paid_by \
                 WHERE d.kind = 'owes' AND d.username = ? AND d.username <> e.paid_by \
                 AND NOT EXISTS (SELECT 1 FROM payments p \
                     WHERE p.expense_id = d.expense_id \
                     AND p.username = d.username AND p.paid = ?) \
                 GROUP BY e.paid_by \
                 ORDER BY SUM(d.amount_cents) DESC, e.paid_by ASC",
                vec![user_id.into(), true.into()],
            ))
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(OwedCreditor {
                creditor: row.try_get("", "creditor")?,
                creditor_name: row.try_get("", "creditor_name")?,
                total: MoneyCents::new(row.try_get::<i64>("", "total")?),
            });
        }
        Ok(out)
    }

    /// The acting user's activity feed: expenses they paid or take part in,
    /// across all their groups, newest first.
    pub async fn activity(&self, user_id: &str) -> ResultEngine<Vec<ActivityRow>> {
        self.require_user_exists(&self.database, user_id).await?;

        let backend = self.database.get_database_backend();
        let rows = self
            .database
            .query_all(Statement::from_sql_and_values(
                backend,
                "SELECT e.id AS expense_id, e.group_id AS group_id, g.name AS group_name, \
                        e.description AS description, e.amount_cents AS amount_cents, \
                        e.paid_by AS paid_by, e.created_at AS created_at, \
                        COALESCE((SELECT d.amount_cents FROM debts d \
                            WHERE d.expense_id = e.id AND d.username = ? \
                            AND d.kind = 'owes'), 0) AS share \
                 FROM expenses e \
                 JOIN expense_groups g ON g.id = e.group_id \
                 JOIN group_members m ON m.group_id = e.group_id AND m.username = ? \
                 WHERE e.paid_by = ? OR EXISTS (SELECT 1 FROM debts d \
                     WHERE d.expense_id = e.id AND d.username = ? AND d.kind = 'owes') \
                 ORDER BY e.created_at DESC",
                vec![
                    user_id.into(),
                    user_id.into(),
                    user_id.into(),
                    user_id.into(),
                ],
            ))
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let total = MoneyCents::new(row.try_get::<i64>("", "amount_cents")?);
            let share = MoneyCents::new(row.try_get::<i64>("", "share")?);
            let paid_by: String = row.try_get("", "paid_by")?;
            let (direction, amount) = if paid_by == user_id {
                (ActivityDirection::Recovers, total - share)
            } else {
                (ActivityDirection::Owes, share)
            };
            out.push(ActivityRow {
                expense_id: row.try_get("", "expense_id")?,
                group_id: row.try_get("", "group_id")?,
                group_name: row.try_get("", "group_name")?,
                description: row.try_get("", "description")?,
                total,
                direction,
                amount,
                created_at: row.try_get("", "created_at")?,
            });
        }
        Ok(out)
    }
}
