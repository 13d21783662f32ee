//! Core domain types for the ledger engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Amount;

/// Account identifier, also the store key of the account's record.
pub type AccountId = String;

/// Kind of the most recent operation applied to a record.
///
/// Serialized with the wire codes `"0"`..`"4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "0")]
    Open,
    #[serde(rename = "1")]
    Deposit,
    #[serde(rename = "2")]
    TransferIn,
    #[serde(rename = "3")]
    TransferOut,
    #[serde(rename = "4")]
    Withdraw,
}

impl OperationKind {
    /// Wire code of this kind, as used both in invocations and in stored records.
    pub fn code(self) -> &'static str {
        match self {
            OperationKind::Open => "0",
            OperationKind::Deposit => "1",
            OperationKind::TransferIn => "2",
            OperationKind::TransferOut => "3",
            OperationKind::Withdraw => "4",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Open => "open",
            OperationKind::Deposit => "deposit",
            OperationKind::TransferIn => "transfer_in",
            OperationKind::TransferOut => "transfer_out",
            OperationKind::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The persisted per-account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(rename = "trType")]
    pub last_operation: OperationKind,
    #[serde(rename = "accID")]
    pub account: AccountId,
    #[serde(rename = "amt")]
    pub last_amount: Amount,
    pub timestamp: String,
    /// Empty unless the last operation was a transfer.
    #[serde(rename = "oppAccID")]
    pub counterparty: AccountId,
    pub balance: Amount,
}

impl LedgerRecord {
    /// A freshly opened account with a zero balance.
    pub fn open(account: AccountId, timestamp: String) -> Self {
        Self {
            last_operation: OperationKind::Open,
            account,
            last_amount: Amount::ZERO,
            timestamp,
            counterparty: AccountId::new(),
            balance: Amount::ZERO,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Balance-changing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    TransferIn,
    TransferOut,
    Withdraw,
}

impl TransactionKind {
    /// Credits add to the balance, debits subtract from it.
    pub fn is_credit(self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }

    /// Transfers carry a counterparty account.
    pub fn is_transfer(self) -> bool {
        matches!(self, TransactionKind::TransferIn | TransactionKind::TransferOut)
    }
}

impl From<TransactionKind> for OperationKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Deposit => OperationKind::Deposit,
            TransactionKind::TransferIn => OperationKind::TransferIn,
            TransactionKind::TransferOut => OperationKind::TransferOut,
            TransactionKind::Withdraw => OperationKind::Withdraw,
        }
    }
}

/// Arguments of an account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccount {
    pub account: AccountId,
    pub timestamp: String,
}

/// Arguments of a balance-changing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub account: AccountId,
    pub amount: Amount,
    pub timestamp: String,
    pub counterparty: AccountId,
}

/// Arguments of a record lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub account: AccountId,
}

/// A validated, typed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(CreateAccount),
    Transact(Transaction),
    Query(Query),
}

/// A raw invocation as received from the caller: an operation code and
/// positional string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub operation: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(operation: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operation: operation.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Successful result of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record was written.
    Committed,
    /// Raw stored bytes returned by a query.
    Record(Vec<u8>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_record_starts_empty() {
        let record = LedgerRecord::open("acc1".into(), "t0".into());
        assert_eq!(record.last_operation, OperationKind::Open);
        assert_eq!(record.last_amount, Amount::ZERO);
        assert_eq!(record.balance, Amount::ZERO);
        assert!(record.counterparty.is_empty());
    }

    #[test]
    fn record_uses_wire_field_names() {
        let record = LedgerRecord::open("acc1".into(), "t0".into());
        let json: serde_json::Value = serde_json::from_slice(&record.encode().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "trType": "0",
                "accID": "acc1",
                "amt": 0,
                "timestamp": "t0",
                "oppAccID": "",
                "balance": 0,
            })
        );
    }

    #[test]
    fn record_survives_encoding() {
        let record = LedgerRecord {
            last_operation: OperationKind::TransferOut,
            account: "acc1".into(),
            last_amount: Amount::new(70),
            timestamp: "t3".into(),
            counterparty: "acc2".into(),
            balance: Amount::new(5),
        };
        let decoded = LedgerRecord::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn decode_rejects_negative_balance() {
        let bytes = br#"{"trType":"1","accID":"a","amt":1,"timestamp":"t","oppAccID":"","balance":-1}"#;
        assert!(LedgerRecord::decode(bytes).is_err());
    }

    #[test]
    fn decode_rejects_unknown_operation_code() {
        let bytes = br#"{"trType":"Q","accID":"a","amt":1,"timestamp":"t","oppAccID":"","balance":1}"#;
        assert!(LedgerRecord::decode(bytes).is_err());
    }

    #[test]
    fn transaction_kind_direction() {
        assert!(TransactionKind::Deposit.is_credit());
        assert!(TransactionKind::TransferIn.is_credit());
        assert!(!TransactionKind::TransferOut.is_credit());
        assert!(!TransactionKind::Withdraw.is_credit());
        assert!(TransactionKind::TransferOut.is_transfer());
        assert!(!TransactionKind::Withdraw.is_transfer());
    }

    #[test]
    fn operation_codes() {
        assert_eq!(OperationKind::from(TransactionKind::Withdraw).code(), "4");
        assert_eq!(OperationKind::Open.code(), "0");
        assert_eq!(OperationKind::TransferIn.to_string(), "transfer_in");
    }
}
