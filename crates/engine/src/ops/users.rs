use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, users};

use super::{Engine, Netting, normalize_required_text, with_tx};

/// Registration input. Identity (`username`) is immutable once created.
#[derive(Clone, Debug)]
pub struct RegisterCmd {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
}

/// Profile view: account fields plus the gross global balance.
#[derive(Clone, Debug)]
pub struct UserProfile {
    pub username: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub balance: super::BalanceView,
}

impl Engine {
    /// Registers a new user.
    ///
    /// Display name must be at least 3 characters and the email must look
    /// like one; username and email are both unique.
    pub async fn register_user(&self, cmd: RegisterCmd) -> ResultEngine<()> {
        let username = normalize_required_text(&cmd.username, "username")?;
        let password = normalize_required_text(&cmd.password, "password")?;
        let name = cmd.name.trim().to_string();
        if name.chars().count() < 3 {
            return Err(EngineError::Validation(
                "name must be at least 3 characters".to_string(),
            ));
        }
        let email = cmd.email.trim().to_string();
        if !email.contains('@') {
            return Err(EngineError::Validation("invalid email".to_string()));
        }

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            if self.find_user_by_email(&db_tx, &email).await?.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let user = users::ActiveModel {
                username: ActiveValue::Set(username),
                password: ActiveValue::Set(password),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                created_at: ActiveValue::Set(Utc::now()),
            };
            user.insert(&db_tx).await?;
            Ok(())
        })
    }

    /// Returns the acting user's profile with their gross balance attached.
    pub async fn user_profile(&self, user_id: &str) -> ResultEngine<UserProfile> {
        let user = self.require_user_exists(&self.database, user_id).await?;
        let balance = self.user_balance(user_id, Netting::Gross).await?;

        Ok(UserProfile {
            username: user.username,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            balance,
        })
    }
}
