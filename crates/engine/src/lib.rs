//! Ledger engine: accounts, categorized transactions, budgets, and savings
//! goals, with denormalized balances maintained transactionally.
//!
//! The interesting part lives under [`ops`]: every transaction mutation runs
//! as one database transaction that exclusively locks the affected account
//! and budget rows before reading the values it will rewrite, so concurrent
//! mutations against the same rows serialize instead of losing updates.

pub use accounts::Account;
pub use budgets::Budget;
pub use categories::{Category, CategoryKind};
pub use commands::{CreateTransactionCmd, UpdateTransactionCmd};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use savings_goals::SavingsGoal;
pub use transactions::Transaction;

mod accounts;
mod budgets;
mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod savings_goals;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
