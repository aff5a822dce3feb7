use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, group_members, groups, users};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Creates a group; the creator becomes its first member.
    pub async fn new_group(&self, name: &str, user_id: &str) -> ResultEngine<String> {
        let name = normalize_required_text(name, "group name")?;
        let group_id = Uuid::new_v4().to_string();

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let group = groups::ActiveModel {
                id: ActiveValue::Set(group_id.clone()),
                name: ActiveValue::Set(name),
                created_by: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            };
            group.insert(&db_tx).await?;

            let membership = group_members::ActiveModel {
                group_id: ActiveValue::Set(group_id.clone()),
                username: ActiveValue::Set(user_id.to_string()),
            };
            membership.insert(&db_tx).await?;

            Ok(group_id.clone())
        })
    }

    /// Deletes a group and everything it owns (creator-only).
    ///
    /// The cascade runs in one DB transaction so concurrent readers never see
    /// an orphaned expense or debt: payments and debts of the group's
    /// expenses go first, then the expenses, memberships, and the group row.
    pub async fn delete_group(&self, group_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            if group.created_by != user_id {
                return Err(EngineError::Forbidden(
                    "only the group creator may delete it".to_string(),
                ));
            }

            let backend = self.database.get_database_backend();
            let cascade = [
                "DELETE FROM payments WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
                "DELETE FROM debts WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
                "DELETE FROM expenses WHERE group_id = ?;",
                "DELETE FROM group_members WHERE group_id = ?;",
                "DELETE FROM expense_groups WHERE id = ?;",
            ];
            for sql in cascade {
                db_tx
                    .execute(Statement::from_sql_and_values(
                        backend,
                        sql,
                        vec![group_id.into()],
                    ))
                    .await?;
            }

            Ok(())
        })
    }

    /// Adds a user to a group. Any current member may add.
    pub async fn add_group_member(
        &self,
        group_id: &str,
        member: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, user_id).await?;
            self.require_user_exists(&db_tx, member).await?;

            if self.is_group_member(&db_tx, group_id, member).await? {
                return Err(EngineError::ExistingKey(member.to_string()));
            }

            let membership = group_members::ActiveModel {
                group_id: ActiveValue::Set(group_id.to_string()),
                username: ActiveValue::Set(member.to_string()),
            };
            membership.insert(&db_tx).await?;
            Ok(())
        })
    }

    /// Removes a member. Members may leave on their own; removing someone
    /// else is creator-only, and the creator cannot be removed.
    pub async fn remove_group_member(
        &self,
        group_id: &str,
        member: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, group_id, user_id).await?;
            if member == group.created_by {
                return Err(EngineError::Validation(
                    "the group creator cannot be removed".to_string(),
                ));
            }
            if member != user_id && group.created_by != user_id {
                return Err(EngineError::Forbidden(
                    "only the group creator may remove other members".to_string(),
                ));
            }
            if !self.is_group_member(&db_tx, group_id, member).await? {
                return Err(EngineError::NotFound(format!("member {member}")));
            }

            group_members::Entity::delete_by_id((group_id.to_string(), member.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Lists group members (member-gated), ordered by username.
    pub async fn list_group_members(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<users::Model>> {
        self.require_group_member(&self.database, group_id, user_id)
            .await?;

        let memberships = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .all(&self.database)
            .await?;
        let usernames: Vec<String> = memberships.into_iter().map(|m| m.username).collect();

        users::Entity::find()
            .filter(users::Column::Username.is_in(usernames))
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Lists the groups the acting user belongs to, ordered by name.
    pub async fn list_user_groups(&self, user_id: &str) -> ResultEngine<Vec<groups::Model>> {
        let memberships = group_members::Entity::find()
            .filter(group_members::Column::Username.eq(user_id))
            .all(&self.database)
            .await?;
        let group_ids: Vec<String> = memberships.into_iter().map(|m| m.group_id).collect();

        groups::Entity::find()
            .filter(groups::Column::Id.is_in(group_ids))
            .order_by_asc(groups::Column::Name)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }
}
