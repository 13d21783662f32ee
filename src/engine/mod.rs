//! Ledger state machine.
//!
//! The engine applies one invocation at a time against a [`LedgerStore`].
//! It keeps no state of its own: every invocation reads the account record
//! it needs from the store, validates, and writes the full record back.
//! Also supports an async stream of invocations.

use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info};

use crate::Amount;
use crate::model::{
    Command, CreateAccount, Invocation, LedgerRecord, OperationKind, Outcome, Query, Transaction,
};
use crate::store::LedgerStore;

mod dispatch;
pub use dispatch::parse;

mod error;
pub use error::{ArgumentError, LedgerError};

/// The ledger engine, generic over its backing store.
pub struct Engine<S> {
    store: S,
}

/// Public API
impl<S: LedgerStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the engine with the given invocation stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = Invocation> + Unpin) {
        while let Some(invocation) = stream.next().await {
            // failures are already logged and must not stop the run
            if let Ok(Outcome::Record(bytes)) =
                self.dispatch(&invocation.operation, &invocation.args)
            {
                info!(record = %String::from_utf8_lossy(&bytes), "query result");
            }
        }
    }

    /// Validate a raw invocation and apply it.
    pub fn dispatch(&mut self, operation: &str, args: &[String]) -> Result<Outcome, LedgerError> {
        let command = parse(operation, args).inspect_err(|e| {
            info!(operation, reason = %e, "invocation rejected");
        })?;
        self.execute(command)
    }

    /// Apply an already validated command.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, LedgerError> {
        match command {
            Command::Create(args) => {
                let result = self.create_account(&args);
                Self::log_result("create", &args.account, None, &result);
                result.map(|()| Outcome::Committed)
            }
            Command::Transact(args) => {
                let result = self.apply_transaction(&args);
                let operation = OperationKind::from(args.kind).name();
                Self::log_result(operation, &args.account, Some(args.amount), &result);
                result.map(|()| Outcome::Committed)
            }
            Command::Query(args) => self.query(&args.account).map(Outcome::Record),
        }
    }

    pub fn create(&mut self, account: &str, timestamp: &str) -> Result<(), LedgerError> {
        let args = [account.to_string(), timestamp.to_string()];
        self.dispatch("0", &args).map(|_| ())
    }

    pub fn deposit(
        &mut self,
        account: &str,
        amount: &str,
        timestamp: &str,
    ) -> Result<(), LedgerError> {
        let args = [account.to_string(), amount.to_string(), timestamp.to_string()];
        self.dispatch("1", &args).map(|_| ())
    }

    pub fn transfer_credit(
        &mut self,
        account: &str,
        amount: &str,
        timestamp: &str,
        counterparty: &str,
    ) -> Result<(), LedgerError> {
        let args = [
            account.to_string(),
            amount.to_string(),
            timestamp.to_string(),
            counterparty.to_string(),
        ];
        self.dispatch("2", &args).map(|_| ())
    }

    pub fn transfer_debit(
        &mut self,
        account: &str,
        amount: &str,
        timestamp: &str,
        counterparty: &str,
    ) -> Result<(), LedgerError> {
        let args = [
            account.to_string(),
            amount.to_string(),
            timestamp.to_string(),
            counterparty.to_string(),
        ];
        self.dispatch("3", &args).map(|_| ())
    }

    pub fn withdraw(
        &mut self,
        account: &str,
        amount: &str,
        timestamp: &str,
    ) -> Result<(), LedgerError> {
        let args = [account.to_string(), amount.to_string(), timestamp.to_string()];
        self.dispatch("4", &args).map(|_| ())
    }

    /// Raw stored bytes of an account record. Never writes.
    pub fn query(&self, account: &str) -> Result<Vec<u8>, LedgerError> {
        let result = self.read_account(&Query {
            account: account.to_string(),
        });
        Self::log_result("query", account, None, &result);
        result
    }
}

/// Private API
impl<S: LedgerStore> Engine<S> {
    /// Small helper to log `execute` results
    fn log_result<T>(
        operation: &str,
        account: &str,
        amount: Option<Amount>,
        result: &Result<T, LedgerError>,
    ) {
        match (result, amount) {
            (Ok(_), Some(amt)) => {
                info!(account, amount = %amt, "{operation} applied");
            }
            (Ok(_), None) => {
                info!(account, "{operation} applied");
            }
            // A record that does not decode means an earlier write broke an invariant
            (Err(e @ LedgerError::CorruptRecord { .. }), _) => {
                error!(account, reason = %e, "{operation} hit a corrupt record");
            }
            (Err(e), Some(amt)) => {
                info!(account, amount = %amt, reason = %e, "{operation} skipped");
            }
            (Err(e), None) => {
                info!(account, reason = %e, "{operation} skipped");
            }
        }
    }

    /// Read and decode the current record of `account`.
    fn load(&self, account: &str) -> Result<LedgerRecord, LedgerError> {
        let bytes = self
            .store
            .get(account)?
            .ok_or_else(|| LedgerError::NotFound(account.to_string()))?;

        let record = LedgerRecord::decode(&bytes).map_err(|source| LedgerError::CorruptRecord {
            account: account.to_string(),
            source,
        })?;

        if record.account != account {
            return Err(LedgerError::CorruptRecord {
                account: account.to_string(),
                source: serde::de::Error::custom(format!(
                    "record stored under '{account}' belongs to '{}'",
                    record.account
                )),
            });
        }

        Ok(record)
    }

    /// Encode and write a full record under its own account id.
    fn save(&mut self, record: &LedgerRecord) -> Result<(), LedgerError> {
        let bytes = record.encode().map_err(|source| LedgerError::CorruptRecord {
            account: record.account.clone(),
            source,
        })?;
        self.store.put(&record.account, bytes)?;
        Ok(())
    }

    /// Apply a `Command::Create`:
    /// - Ensure no record exists for the account
    /// - Write a zero-balance record
    fn create_account(&mut self, args: &CreateAccount) -> Result<(), LedgerError> {
        if self.store.get(&args.account)?.is_some() {
            return Err(LedgerError::AlreadyExists(args.account.clone()));
        }

        let record = LedgerRecord::open(args.account.clone(), args.timestamp.clone());
        self.save(&record)
    }

    /// Apply a `Command::Transact`:
    /// - Load the current record
    /// - Credit or debit the balance, refusing to go below zero
    /// - Stamp the record with this operation and write it back
    fn apply_transaction(&mut self, args: &Transaction) -> Result<(), LedgerError> {
        let mut record = self.load(&args.account)?;
        let before = record.balance;

        let after = if args.kind.is_credit() {
            before
                .checked_add(args.amount)
                .ok_or_else(|| LedgerError::BalanceOverflow {
                    account: args.account.clone(),
                    balance: before,
                    amount: args.amount,
                })?
        } else {
            before
                .checked_sub(args.amount)
                .ok_or_else(|| LedgerError::InsufficientFunds {
                    account: args.account.clone(),
                    balance: before,
                    requested: args.amount,
                })?
        };

        debug!(account = %args.account, before = %before, after = %after, "balance updated");

        record.last_operation = args.kind.into();
        record.last_amount = args.amount;
        record.timestamp = args.timestamp.clone();
        record.counterparty = args.counterparty.clone();
        record.balance = after;

        self.save(&record)
    }

    /// Apply a `Command::Query`, returning the stored bytes untouched.
    fn read_account(&self, args: &Query) -> Result<Vec<u8>, LedgerError> {
        self.store
            .get(&args.account)?
            .ok_or_else(|| LedgerError::NotFound(args.account.clone()))
    }
}

impl<S: LedgerStore + Default> Default for Engine<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
