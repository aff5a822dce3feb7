//! Account endpoints: registration and the profile view.

use api_types::user::{Profile, RegisterUser};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};
use engine::{RegisterCmd, users};

/// `POST /users` - the only unauthenticated route.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterUser>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .register_user(RegisterCmd {
            username: payload.username,
            password: payload.password,
            name: payload.name,
            email: payload.email,
        })
        .await?;

    Ok(StatusCode::CREATED)
}

/// `GET /users/me` - profile fields plus the gross global balance.
pub async fn profile(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Profile>, ServerError> {
    let profile = state.engine.user_profile(&user.username).await?;

    Ok(Json(Profile {
        username: profile.username,
        name: profile.name,
        email: profile.email,
        created_at: profile.created_at,
        owed_to_user_cents: profile.balance.owed_to_user.cents(),
        user_owes_cents: profile.balance.user_owes.cents(),
        balance_cents: profile.balance.balance().cents(),
    }))
}
