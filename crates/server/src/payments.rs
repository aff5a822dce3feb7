//! Payment flag endpoint.

use api_types::payment::{Payment, PaymentSet};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};
use engine::users;

/// `PUT /expenses/{expense_id}/payment` - idempotent upsert.
pub async fn set(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
    Json(payload): Json<PaymentSet>,
) -> Result<Json<Payment>, ServerError> {
    let row = state
        .engine
        .set_payment(&expense_id, &payload.username, payload.paid, &user.username)
        .await?;

    Ok(Json(Payment {
        expense_id: row.expense_id,
        username: row.username,
        paid: row.paid,
        paid_at: row.paid_at,
    }))
}
