pub mod amount;
pub mod csv;
pub mod engine;
pub mod model;
pub mod store;

pub use amount::Amount;
pub use engine::{Engine, LedgerError};
pub use model::{AccountId, Invocation, LedgerRecord, OperationKind, Outcome};
pub use store::{LedgerStore, MemoryStore, StoreError};
