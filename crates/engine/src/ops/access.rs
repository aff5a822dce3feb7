//! Lookup and authorization helpers shared by the operation modules.
//!
//! Convention: a missing aggregate is `NotFound`, an existing aggregate the
//! acting user may not touch is `Forbidden`, and a reference to a user that
//! cannot take part (not a member) is `Validation`. Callers map these onto
//! distinct client-facing failures.

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, expenses, group_members, groups, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_user_exists<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {username}")))
    }

    pub(super) async fn require_group<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: &str,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("group".to_string()))
    }

    pub(super) async fn is_group_member<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: &str,
        username: &str,
    ) -> ResultEngine<bool> {
        group_members::Entity::find_by_id((group_id.to_string(), username.to_string()))
            .one(db)
            .await
            .map(|row| row.is_some())
            .map_err(Into::into)
    }

    /// Loads the group and checks the acting user belongs to it.
    pub(super) async fn require_group_member<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_group(db, group_id).await?;
        if !self.is_group_member(db, group_id, user_id).await? {
            return Err(EngineError::Forbidden(
                "not a member of this group".to_string(),
            ));
        }
        Ok(group)
    }

    /// Checks that every referenced user belongs to the group (payer and
    /// participants of an expense).
    pub(super) async fn require_members<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: &str,
        usernames: &[String],
    ) -> ResultEngine<()> {
        for username in usernames {
            if !self.is_group_member(db, group_id, username).await? {
                return Err(EngineError::Validation(format!(
                    "{username} is not a member of this group"
                )));
            }
        }
        Ok(())
    }

    pub(super) async fn require_expense<C: ConnectionTrait>(
        &self,
        db: &C,
        expense_id: &str,
    ) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(expense_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("expense".to_string()))
    }

    /// Loads the expense and checks the acting user belongs to its group.
    pub(super) async fn require_expense_member<C: ConnectionTrait>(
        &self,
        db: &C,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<expenses::Model> {
        let expense = self.require_expense(db, expense_id).await?;
        if !self.is_group_member(db, &expense.group_id, user_id).await? {
            return Err(EngineError::Forbidden(
                "not a member of this group".to_string(),
            ));
        }
        Ok(expense)
    }

    pub(super) async fn find_user_by_email<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
            .map_err(Into::into)
    }
}
