//! Turns raw `(operation, args)` invocations into typed [`Command`]s.
//!
//! All shape checks happen here, before the store is touched.

use crate::Amount;
use crate::model::{Command, CreateAccount, OperationKind, Query, Transaction, TransactionKind};

use super::error::{ArgumentError, LedgerError};

/// Validate an invocation and build the matching command.
pub fn parse(operation: &str, args: &[String]) -> Result<Command, LedgerError> {
    let command = match operation {
        "0" => Command::Create(parse_create(args)?),
        "1" => Command::Transact(parse_transaction(TransactionKind::Deposit, args)?),
        "2" => Command::Transact(parse_transaction(TransactionKind::TransferIn, args)?),
        "3" => Command::Transact(parse_transaction(TransactionKind::TransferOut, args)?),
        "4" => Command::Transact(parse_transaction(TransactionKind::Withdraw, args)?),
        "Q" => Command::Query(parse_query(args)?),
        other => return Err(LedgerError::UnknownOperation(other.to_string())),
    };
    Ok(command)
}

fn check_arity(
    operation: &'static str,
    args: &[String],
    expected: usize,
) -> Result<(), ArgumentError> {
    if args.len() != expected {
        return Err(ArgumentError::Arity {
            operation,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn non_empty(
    operation: &'static str,
    field: &'static str,
    value: &str,
) -> Result<String, ArgumentError> {
    if value.is_empty() {
        return Err(ArgumentError::Empty { operation, field });
    }
    Ok(value.to_string())
}

fn parse_create(args: &[String]) -> Result<CreateAccount, ArgumentError> {
    const OPERATION: &str = "create";
    check_arity(OPERATION, args, 2)?;

    Ok(CreateAccount {
        account: non_empty(OPERATION, "account id", &args[0])?,
        timestamp: non_empty(OPERATION, "timestamp", &args[1])?,
    })
}

/// Positional layout: `account, amount, timestamp[, counterparty]`.
fn parse_transaction(kind: TransactionKind, args: &[String]) -> Result<Transaction, ArgumentError> {
    let operation = OperationKind::from(kind).name();
    let expected = if kind.is_transfer() { 4 } else { 3 };
    check_arity(operation, args, expected)?;

    let account = non_empty(operation, "account id", &args[0])?;
    let amount = args[1]
        .parse::<Amount>()
        .map_err(|source| ArgumentError::Amount {
            value: args[1].clone(),
            source,
        })?;
    let timestamp = non_empty(operation, "timestamp", &args[2])?;
    let counterparty = if kind.is_transfer() {
        non_empty(operation, "counterparty account id", &args[3])?
    } else {
        String::new()
    };

    Ok(Transaction {
        kind,
        account,
        amount,
        timestamp,
        counterparty,
    })
}

// An empty id is left to the lookup, which reports it as not found.
fn parse_query(args: &[String]) -> Result<Query, ArgumentError> {
    check_arity("query", args, 1)?;
    Ok(Query {
        account: args[0].clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_create() {
        let command = parse("0", &args(&["acc1", "t0"])).unwrap();
        assert_eq!(
            command,
            Command::Create(CreateAccount {
                account: "acc1".into(),
                timestamp: "t0".into(),
            })
        );
    }

    #[test]
    fn create_rejects_empty_fields() {
        let result = parse("0", &args(&["", "t0"]));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidArgument(ArgumentError::Empty {
                field: "account id",
                ..
            }))
        ));

        let result = parse("0", &args(&["acc1", ""]));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidArgument(ArgumentError::Empty {
                field: "timestamp",
                ..
            }))
        ));
    }

    #[test]
    fn create_rejects_wrong_arity() {
        let result = parse("0", &args(&["acc1"]));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidArgument(ArgumentError::Arity {
                expected: 2,
                got: 1,
                ..
            }))
        ));
    }

    #[test]
    fn deposit_has_empty_counterparty() {
        let command = parse("1", &args(&["acc1", "100", "t1"])).unwrap();
        assert_eq!(
            command,
            Command::Transact(Transaction {
                kind: TransactionKind::Deposit,
                account: "acc1".into(),
                amount: Amount::new(100),
                timestamp: "t1".into(),
                counterparty: String::new(),
            })
        );
    }

    #[test]
    fn transfer_carries_counterparty() {
        let command = parse("3", &args(&["acc1", "70", "t3", "acc2"])).unwrap();
        match command {
            Command::Transact(tx) => {
                assert_eq!(tx.kind, TransactionKind::TransferOut);
                assert_eq!(tx.counterparty, "acc2");
            }
            _ => panic!("expected transaction"),
        }
    }

    #[test]
    fn each_code_maps_to_its_kind() {
        let cases = [
            ("1", TransactionKind::Deposit),
            ("2", TransactionKind::TransferIn),
            ("3", TransactionKind::TransferOut),
            ("4", TransactionKind::Withdraw),
        ];
        for (code, expected) in cases {
            let values = if expected.is_transfer() {
                args(&["a", "1", "t", "b"])
            } else {
                args(&["a", "1", "t"])
            };
            match parse(code, &values).unwrap() {
                Command::Transact(tx) => assert_eq!(tx.kind, expected),
                _ => panic!("expected transaction for code {code}"),
            }
        }
    }

    #[test]
    fn deposit_with_transfer_arity_fails() {
        let result = parse("1", &args(&["acc1", "100", "t1", "acc2"]));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidArgument(ArgumentError::Arity {
                expected: 3,
                got: 4,
                ..
            }))
        ));
    }

    #[test]
    fn transfer_with_deposit_arity_fails() {
        let result = parse("2", &args(&["acc1", "100", "t1"]));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidArgument(ArgumentError::Arity {
                expected: 4,
                got: 3,
                ..
            }))
        ));
    }

    #[test]
    fn non_numeric_amount_fails() {
        for bad in ["ten", "-5", "1.5", ""] {
            let result = parse("4", &args(&["acc1", bad, "t1"]));
            assert!(
                matches!(
                    result,
                    Err(LedgerError::InvalidArgument(ArgumentError::Amount { .. }))
                ),
                "amount {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn query_takes_one_argument() {
        assert_eq!(
            parse("Q", &args(&["acc1"])).unwrap(),
            Command::Query(Query {
                account: "acc1".into()
            })
        );
        assert!(matches!(
            parse("Q", &args(&[])),
            Err(LedgerError::InvalidArgument(ArgumentError::Arity { .. }))
        ));
    }

    #[test]
    fn unknown_operation_keeps_the_code() {
        for code in ["5", "q", "", "deposit"] {
            match parse(code, &args(&["acc1"])) {
                Err(LedgerError::UnknownOperation(kind)) => assert_eq!(kind, code),
                other => panic!("expected unknown operation, got {other:?}"),
            }
        }
    }
}
