use std::{env, io, process};

use acct_ledger::csv::{read_invocations, write_records};
use acct_ledger::{Engine, LedgerRecord, MemoryStore};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: acct-ledger <invocations.csv>");

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let invocations = match read_invocations(path.clone()) {
        Ok(invocations) => invocations,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let mut engine = Engine::new(MemoryStore::new());
    let (sender, receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in invocations {
            match result {
                Ok(invocation) => {
                    if sender.send(invocation).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    engine.run(ReceiverStream::new(receiver)).await;

    let mut records: Vec<LedgerRecord> = engine
        .store()
        .iter()
        .filter_map(|(account, bytes)| match LedgerRecord::decode(bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                error!(account, reason = %e, "skipping corrupt record");
                None
            }
        })
        .collect();
    records.sort_by(|a, b| a.account.cmp(&b.account));

    if let Err(e) = write_records(io::stdout().lock(), &records) {
        error!("failed to write accounts: {e}");
        process::exit(1);
    }
}
