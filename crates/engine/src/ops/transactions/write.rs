//! Transaction mutations.
//!
//! Each mutation follows the same shape: lock every row whose numeric field
//! it will rewrite, simulate the balance changes on an in-memory preview,
//! persist the transaction row, then persist the previewed balances. Nothing
//! is written before every read row is locked, so two concurrent mutations
//! touching the same account or budget serialize on the row locks and each
//! sees the other's committed result.

pub(in crate::ops) mod common;
mod create;
mod delete;
mod update;
