use sea_orm::{ActiveValue, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*};

use crate::{EngineError, MoneyCents, ResultEngine, friends};

use super::{Engine, Netting, with_tx};

/// One entry in the friend list, with the mutual position attached.
#[derive(Clone, Debug)]
pub struct FriendSummary {
    pub username: String,
    pub name: String,
    pub email: String,
    pub owes_me: MoneyCents,
    pub i_owe: MoneyCents,
}

/// A lightweight group reference.
#[derive(Clone, Debug)]
pub struct GroupRef {
    pub id: String,
    pub name: String,
}

/// Detail view for a single friend: their profile fields, the groups both
/// users share, and the mutual position.
#[derive(Clone, Debug)]
pub struct FriendDetail {
    pub username: String,
    pub name: String,
    pub email: String,
    pub shared_groups: Vec<GroupRef>,
    pub owes_me: MoneyCents,
    pub i_owe: MoneyCents,
}

impl Engine {
    /// Adds a friend link from the acting user to another user.
    pub async fn add_friend(&self, user_id: &str, friend: &str) -> ResultEngine<()> {
        if user_id == friend {
            return Err(EngineError::Validation(
                "cannot add yourself as a friend".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, friend).await?;

            if friends::Entity::find_by_id((user_id.to_string(), friend.to_string()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(friend.to_string()));
            }

            let link = friends::ActiveModel {
                username: ActiveValue::Set(user_id.to_string()),
                friend_username: ActiveValue::Set(friend.to_string()),
            };
            link.insert(&db_tx).await?;
            Ok(())
        })
    }

    /// Removes a friendship. Both directions go, so neither side keeps a
    /// stale link.
    pub async fn remove_friend(&self, user_id: &str, friend: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let forward = friends::Entity::delete_by_id((user_id.to_string(), friend.to_string()))
                .exec(&db_tx)
                .await?;
            let reverse = friends::Entity::delete_by_id((friend.to_string(), user_id.to_string()))
                .exec(&db_tx)
                .await?;
            if forward.rows_affected == 0 && reverse.rows_affected == 0 {
                return Err(EngineError::NotFound(format!("friend {friend}")));
            }
            Ok(())
        })
    }

    /// The acting user's friends, each with the directional sums between
    /// the two of them (gross).
    pub async fn list_friends(&self, user_id: &str) -> ResultEngine<Vec<FriendSummary>> {
        self.require_user_exists(&self.database, user_id).await?;

        let links = friends::Entity::find()
            .filter(friends::Column::Username.eq(user_id))
            .order_by_asc(friends::Column::FriendUsername)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(links.len());
        for link in links {
            let friend = self
                .require_user_exists(&self.database, &link.friend_username)
                .await?;
            let pair = self
                .pair_balance(user_id, &friend.username, Netting::Gross)
                .await?;
            out.push(FriendSummary {
                username: friend.username,
                name: friend.name,
                email: friend.email,
                owes_me: pair.other_owes_user,
                i_owe: pair.user_owes_other,
            });
        }
        Ok(out)
    }

    /// Detail view for one friend: profile, shared groups, directional sums.
    pub async fn friend_detail(&self, user_id: &str, friend: &str) -> ResultEngine<FriendDetail> {
        if friends::Entity::find_by_id((user_id.to_string(), friend.to_string()))
            .one(&self.database)
            .await?
            .is_none()
        {
            return Err(EngineError::NotFound(format!("friend {friend}")));
        }
        let friend_user = self.require_user_exists(&self.database, friend).await?;

        let backend = self.database.get_database_backend();
        let rows = self
            .database
            .query_all(Statement::from_sql_and_values(
                backend,
                "SELECT g.id AS id, g.name AS name \
                 FROM expense_groups g \
                 JOIN group_members a ON a.group_id = g.id AND a.username = ? \
                 JOIN group_members b ON b.group_id = g.id AND b.username = ? \
                 ORDER BY g.name ASC",
                vec![user_id.into(), friend.into()],
            ))
            .await?;
        let mut shared_groups = Vec::with_capacity(rows.len());
        for row in rows {
            shared_groups.push(GroupRef {
                id: row.try_get("", "id")?,
                name: row.try_get("", "name")?,
            });
        }

        let pair = self.pair_balance(user_id, friend, Netting::Gross).await?;
        Ok(FriendDetail {
            username: friend_user.username,
            name: friend_user.name,
            email: friend_user.email,
            shared_groups,
            owes_me: pair.other_owes_user,
            i_owe: pair.user_owes_other,
        })
    }
}
