use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run, run_with_listener, spawn_with_listener};

mod activity;
mod balance;
mod expenses;
mod friends;
mod groups;
mod payments;
mod server;
mod user;

pub mod types {
    pub mod user {
        pub use api_types::user::{Profile, RegisterUser};
    }

    pub mod group {
        pub use api_types::group::{
            BreakdownRow, Group, GroupCreated, GroupNew, GroupSummary, Member, MemberAdd,
            MemberBalance,
        };
    }

    pub mod expense {
        pub use api_types::expense::{
            CustomShare, DebtRow, Expense, ExpenseDetail, ExpenseNew, ExpenseUpdate, PercentShare,
            Split,
        };
    }

    pub mod payment {
        pub use api_types::payment::{Payment, PaymentSet};
    }

    pub mod balance {
        pub use api_types::balance::{Balance, OwedCreditor};
    }

    pub mod friend {
        pub use api_types::friend::{Friend, FriendAdd, FriendDetail, GroupRef};
    }

    pub mod activity {
        pub use api_types::activity::ActivityEntry;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
