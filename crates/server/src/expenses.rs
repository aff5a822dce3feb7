//! Expense endpoints.

use api_types::expense::{
    DebtRow, Expense, ExpenseDetail, ExpenseNew, ExpenseUpdate, Split,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{MoneyCents, NewExpenseCmd, SplitStrategy, UpdateExpenseCmd, users};

fn map_split(split: Split) -> SplitStrategy {
    match split {
        Split::Equal => SplitStrategy::Equal,
        Split::Custom { amounts } => SplitStrategy::Custom(
            amounts
                .into_iter()
                .map(|s| (s.username, MoneyCents::new(s.amount_cents)))
                .collect(),
        ),
        Split::Percentage { shares } => SplitStrategy::Percentage(
            shares
                .into_iter()
                .map(|s| (s.username, s.basis_points))
                .collect(),
        ),
        Split::FullCover => SplitStrategy::FullCover,
    }
}

fn to_api(detail: engine::ExpenseDetail) -> ExpenseDetail {
    ExpenseDetail {
        expense: Expense {
            id: detail.expense.id,
            group_id: detail.expense.group_id,
            amount_cents: detail.expense.amount.cents(),
            description: detail.expense.description,
            category: detail.expense.category,
            paid_by: detail.expense.paid_by,
            split_kind: detail.expense.split_kind,
            created_by: detail.expense.created_by,
            created_at: detail.expense.created_at,
        },
        debts: detail
            .debts
            .into_iter()
            .map(|d| DebtRow {
                username: d.username,
                kind: d.kind.as_str().to_string(),
                amount_cents: d.amount.cents(),
            })
            .collect(),
        payments: detail
            .payments
            .into_iter()
            .map(|p| api_types::payment::Payment {
                expense_id: p.expense_id,
                username: p.username,
                paid: p.paid,
                paid_at: p.paid_at,
            })
            .collect(),
    }
}

/// `POST /expenses`
pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseDetail>), ServerError> {
    let detail = state
        .engine
        .create_expense(NewExpenseCmd {
            group_id: payload.group_id,
            amount: MoneyCents::new(payload.amount_cents),
            description: payload.description,
            category: payload.category,
            paid_by: payload.paid_by,
            participants: payload.participants,
            strategy: map_split(payload.split),
            user_id: user.username,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(to_api(detail))))
}

/// `GET /expenses/{expense_id}`
pub async fn detail(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
) -> Result<Json<ExpenseDetail>, ServerError> {
    let detail = state
        .engine
        .expense_detail(&expense_id, &user.username)
        .await?;
    Ok(Json(to_api(detail)))
}

/// `PATCH /expenses/{expense_id}`
pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseDetail>, ServerError> {
    let detail = state
        .engine
        .update_expense(UpdateExpenseCmd {
            expense_id,
            amount: MoneyCents::new(payload.amount_cents),
            description: payload.description,
            category: payload.category,
            paid_by: payload.paid_by,
            participants: payload.participants,
            strategy: map_split(payload.split),
            user_id: user.username,
        })
        .await?;
    Ok(Json(to_api(detail)))
}

/// `DELETE /expenses/{expense_id}`
pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(&expense_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /groups/{group_id}/expenses`
pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Expense>>, ServerError> {
    let expenses = state
        .engine
        .list_group_expenses(&group_id, &user.username)
        .await?;
    Ok(Json(
        expenses
            .into_iter()
            .map(|e| Expense {
                id: e.id,
                group_id: e.group_id,
                amount_cents: e.amount.cents(),
                description: e.description,
                category: e.category,
                paid_by: e.paid_by,
                split_kind: e.split_kind,
                created_by: e.created_by,
                created_at: e.created_at,
            })
            .collect(),
    ))
}
