//! Transaction operations: the mutations that keep denormalized balances
//! consistent, plus read paths.

mod list;
pub(in crate::ops) mod write;
