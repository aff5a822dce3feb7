//! Friend endpoints.

use api_types::friend::{Friend, FriendAdd, FriendDetail, GroupRef};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::users;

/// `GET /friends`
pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Friend>>, ServerError> {
    let friends = state.engine.list_friends(&user.username).await?;
    Ok(Json(
        friends
            .into_iter()
            .map(|f| Friend {
                username: f.username,
                name: f.name,
                email: f.email,
                owes_me_cents: f.owes_me.cents(),
                i_owe_cents: f.i_owe.cents(),
            })
            .collect(),
    ))
}

/// `POST /friends`
pub async fn add(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<FriendAdd>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .add_friend(&user.username, &payload.username)
        .await?;
    Ok(StatusCode::CREATED)
}

/// `GET /friends/{username}`
pub async fn detail(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<FriendDetail>, ServerError> {
    let detail = state.engine.friend_detail(&user.username, &username).await?;
    Ok(Json(FriendDetail {
        username: detail.username,
        name: detail.name,
        email: detail.email,
        shared_groups: detail
            .shared_groups
            .into_iter()
            .map(|g| GroupRef {
                id: g.id,
                name: g.name,
            })
            .collect(),
        owes_me_cents: detail.owes_me.cents(),
        i_owe_cents: detail.i_owe.cents(),
    }))
}

/// `DELETE /friends/{username}`
pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_friend(&user.username, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}
