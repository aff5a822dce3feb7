//! Balance endpoints: global gross/net and per-group views.

use api_types::balance::Balance;
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};
use engine::{BalanceView, Netting, users};

fn to_api(view: BalanceView) -> Balance {
    Balance {
        owed_to_user_cents: view.owed_to_user.cents(),
        user_owes_cents: view.user_owes.cents(),
        balance_cents: view.balance().cents(),
    }
}

fn parse_netting(value: &str) -> Result<Netting, ServerError> {
    match value {
        "gross" => Ok(Netting::Gross),
        "net" => Ok(Netting::Net),
        other => Err(ServerError::Generic(format!("unknown netting: {other}"))),
    }
}

/// `GET /balance/gross`
pub async fn gross(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Balance>, ServerError> {
    let view = state
        .engine
        .user_balance(&user.username, Netting::Gross)
        .await?;
    Ok(Json(to_api(view)))
}

/// `GET /balance/net`
pub async fn net(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Balance>, ServerError> {
    let view = state
        .engine
        .user_balance(&user.username, Netting::Net)
        .await?;
    Ok(Json(to_api(view)))
}

/// `GET /groups/{group_id}/balance/{netting}`
pub async fn group(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((group_id, netting)): Path<(String, String)>,
) -> Result<Json<Balance>, ServerError> {
    let netting = parse_netting(&netting)?;
    let view = state
        .engine
        .group_balance(&group_id, &user.username, netting)
        .await?;
    Ok(Json(to_api(view)))
}
