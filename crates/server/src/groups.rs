//! Group endpoints: lifecycle, membership, and settlement views.

use api_types::group::{
    BreakdownRow, Group, GroupCreated, GroupNew, GroupSummary, Member, MemberAdd, MemberBalance,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::users;

/// `POST /groups`
pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupCreated>), ServerError> {
    let id = state.engine.new_group(&payload.name, &user.username).await?;
    Ok((StatusCode::CREATED, Json(GroupCreated { id })))
}

/// `GET /groups`
pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Group>>, ServerError> {
    let groups = state.engine.list_user_groups(&user.username).await?;
    Ok(Json(
        groups
            .into_iter()
            .map(|g| Group {
                id: g.id,
                name: g.name,
                created_by: g.created_by,
                created_at: g.created_at,
            })
            .collect(),
    ))
}

/// `DELETE /groups/{group_id}`
pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(&group_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /groups/{group_id}/members`
pub async fn members(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Member>>, ServerError> {
    let members = state
        .engine
        .list_group_members(&group_id, &user.username)
        .await?;
    Ok(Json(
        members
            .into_iter()
            .map(|m| Member {
                username: m.username,
                name: m.name,
                email: m.email,
            })
            .collect(),
    ))
}

/// `POST /groups/{group_id}/members`
pub async fn add_member(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<MemberAdd>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .add_group_member(&group_id, &payload.username, &user.username)
        .await?;
    Ok(StatusCode::CREATED)
}

/// `DELETE /groups/{group_id}/members/{username}`
pub async fn remove_member(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((group_id, username)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_group_member(&group_id, &username, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /groups/{group_id}/summary`
pub async fn summary(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupSummary>, ServerError> {
    let summary = state
        .engine
        .group_summary(&group_id, &user.username)
        .await?;
    Ok(Json(GroupSummary {
        total_spent_cents: summary.total_spent.cents(),
        total_settled_cents: summary.total_settled.cents(),
        total_outstanding_cents: summary.total_outstanding.cents(),
        members: summary
            .members
            .into_iter()
            .map(|m| MemberBalance {
                username: m.username,
                owed_to_cents: m.owed_to.cents(),
                owes_cents: m.owes.cents(),
            })
            .collect(),
    }))
}

/// `GET /groups/{group_id}/breakdown`
pub async fn breakdown(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<BreakdownRow>>, ServerError> {
    let rows = state
        .engine
        .debt_breakdown(&group_id, &user.username)
        .await?;
    Ok(Json(
        rows.into_iter()
            .map(|r| BreakdownRow {
                debtor: r.debtor,
                debtor_name: r.debtor_name,
                creditor: r.creditor,
                creditor_name: r.creditor_name,
                total_cents: r.total.cents(),
            })
            .collect(),
    ))
}
