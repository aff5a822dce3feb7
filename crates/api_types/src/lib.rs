//! Wire types shared by the HTTP server and its clients.
//!
//! All money amounts travel as integer cents (`*_cents`), never floats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterUser {
        pub username: String,
        pub password: String,
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Profile {
        pub username: String,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
        pub owed_to_user_cents: i64,
        pub user_owes_cents: i64,
        pub balance_cents: i64,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupCreated {
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Group {
        pub id: String,
        pub name: String,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Member {
        pub username: String,
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupSummary {
        pub total_spent_cents: i64,
        pub total_settled_cents: i64,
        pub total_outstanding_cents: i64,
        pub members: Vec<MemberBalance>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberBalance {
        pub username: String,
        pub owed_to_cents: i64,
        pub owes_cents: i64,
    }

    /// One aggregated debtor/creditor pair of a group's breakdown.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BreakdownRow {
        pub debtor: String,
        pub debtor_name: String,
        pub creditor: String,
        pub creditor_name: String,
        pub total_cents: i64,
    }
}

pub mod expense {
    use super::*;

    /// How an expense total is divided among the participants.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum Split {
        Equal,
        Custom { amounts: Vec<CustomShare> },
        Percentage { shares: Vec<PercentShare> },
        FullCover,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CustomShare {
        pub username: String,
        pub amount_cents: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PercentShare {
        pub username: String,
        /// Share in basis points; all shares must sum to 10 000.
        pub basis_points: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub group_id: String,
        pub amount_cents: i64,
        pub description: String,
        pub category: Option<String>,
        pub paid_by: String,
        pub participants: Vec<String>,
        pub split: Split,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub amount_cents: i64,
        pub description: String,
        pub category: Option<String>,
        pub paid_by: String,
        pub participants: Vec<String>,
        pub split: Split,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Expense {
        pub id: Uuid,
        pub group_id: String,
        pub amount_cents: i64,
        pub description: String,
        pub category: Option<String>,
        pub paid_by: String,
        pub split_kind: String,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtRow {
        pub username: String,
        pub kind: String,
        pub amount_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseDetail {
        pub expense: Expense,
        pub debts: Vec<DebtRow>,
        pub payments: Vec<super::payment::Payment>,
    }
}

pub mod payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentSet {
        pub username: String,
        pub paid: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Payment {
        pub expense_id: String,
        pub username: String,
        pub paid: bool,
        pub paid_at: Option<DateTime<Utc>>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Balance {
        pub owed_to_user_cents: i64,
        pub user_owes_cents: i64,
        pub balance_cents: i64,
    }

    /// A creditor the user still owes, with the unpaid total.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwedCreditor {
        pub creditor: String,
        pub creditor_name: String,
        pub total_cents: i64,
    }
}

pub mod friend {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendAdd {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Friend {
        pub username: String,
        pub name: String,
        pub email: String,
        pub owes_me_cents: i64,
        pub i_owe_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupRef {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendDetail {
        pub username: String,
        pub name: String,
        pub email: String,
        pub shared_groups: Vec<GroupRef>,
        pub owes_me_cents: i64,
        pub i_owe_cents: i64,
    }
}

pub mod activity {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivityEntry {
        pub expense_id: String,
        pub group_id: String,
        pub group_name: String,
        pub description: String,
        pub total_cents: i64,
        /// `"recovers"` when the user paid, `"owes"` otherwise.
        pub direction: String,
        pub amount_cents: i64,
        pub created_at: DateTime<Utc>,
    }
}
