//! Shared-expense ledger core.
//!
//! The engine owns the domain rules of the system: splitting an expense
//! total across participants ([`allocator`]), turning the split into signed
//! ledger rows ([`debts`]), aggregating ledger + settlement state into
//! balances, and shaping settlement views (who owes whom, group summaries,
//! friend balances). Persistence goes through sea-orm against a relational
//! store; every multi-statement mutation runs inside a single database
//! transaction.

pub use allocator::{FULL_SHARE_BPS, SplitStrategy, allocate};
pub use debts::{Debt, DebtKind, build_debt_rows};
pub use error::EngineError;
pub use expenses::Expense;
pub use money::MoneyCents;
pub use ops::{
    ActivityDirection, ActivityRow, BalanceView, BreakdownRow, Engine, EngineBuilder,
    ExpenseDetail, FriendDetail, FriendSummary, GroupRef, GroupSummary, MemberBalance, Netting,
    NewExpenseCmd, OwedCreditor, PairBalance, RegisterCmd, UpdateExpenseCmd, UserProfile,
};

mod allocator;
pub mod debts;
mod error;
pub mod expenses;
pub mod friends;
pub mod group_members;
pub mod groups;
mod money;
mod ops;
pub mod payments;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
