//! Error types for invocation processing.

use std::num::ParseIntError;
use thiserror::Error;

use crate::Amount;
use crate::model::AccountId;
use crate::store::StoreError;

/// Top-level error returned by [`Engine::dispatch`](super::Engine::dispatch).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    #[error("account {0} already exists")]
    AlreadyExists(AccountId),

    #[error("account {0} not found")]
    NotFound(AccountId),

    #[error("insufficient funds for account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Amount,
        requested: Amount,
    },

    #[error("crediting {amount} to account {account} would overflow balance {balance}")]
    BalanceOverflow {
        account: AccountId,
        balance: Amount,
        amount: Amount,
    },

    #[error("corrupt record for account {account}: {source}")]
    CorruptRecord {
        account: AccountId,
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

/// Rejected invocation arguments.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("{operation}: expected {expected} arguments, got {got}")]
    Arity {
        operation: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{operation}: {field} must be a non-empty string")]
    Empty {
        operation: &'static str,
        field: &'static str,
    },

    #[error("amount '{value}' is not a non-negative integer: {source}")]
    Amount {
        value: String,
        source: ParseIntError,
    },
}
