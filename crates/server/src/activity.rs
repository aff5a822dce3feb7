//! Activity feed and "who do I owe" endpoints.

use api_types::{activity::ActivityEntry, balance::OwedCreditor};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::users;

/// `GET /activity`
pub async fn feed(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ActivityEntry>>, ServerError> {
    let rows = state.engine.activity(&user.username).await?;
    Ok(Json(
        rows.into_iter()
            .map(|r| ActivityEntry {
                expense_id: r.expense_id,
                group_id: r.group_id,
                group_name: r.group_name,
                description: r.description,
                total_cents: r.total.cents(),
                direction: r.direction.as_str().to_string(),
                amount_cents: r.amount.cents(),
                created_at: r.created_at,
            })
            .collect(),
    ))
}

/// `GET /debts/owed`
pub async fn owed(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<OwedCreditor>>, ServerError> {
    let creditors = state.engine.owed_creditors(&user.username).await?;
    Ok(Json(
        creditors
            .into_iter()
            .map(|c| OwedCreditor {
                creditor: c.creditor,
                creditor_name: c.creditor_name,
                total_cents: c.total.cents(),
            })
            .collect(),
    ))
}
