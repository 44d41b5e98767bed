//! The ledger and the store that persists it.
//!
//! A `Ledger` is a value: appending returns a new ledger and leaves the original untouched, so
//! filtered views and dashboard numbers can always be recomputed from the same source of truth.
//! `LedgerStore` is the single writer that loads, appends to and persists the ledger blob.

use crate::error::Res;
use crate::model::{Transaction, TransactionEntry};
use crate::store::BlobStore;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The key under which the ledger is stored in the blob store.
pub const TRANSACTIONS_KEY: &str = "transactions";

/// The full ordered collection of transactions, in insertion order.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Returns a new ledger equal to this one with `transaction` added at the end.
    #[must_use]
    pub fn append(&self, transaction: Transaction) -> Ledger {
        let mut transactions = Vec::with_capacity(self.transactions.len() + 1);
        transactions.extend_from_slice(&self.transactions);
        transactions.push(transaction);
        Ledger { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Picks the id for a transaction created at `now`: the clock value in milliseconds, bumped
    /// past the largest existing id when the clock has not moved on (or went backwards).
    pub fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let clock = now.timestamp_millis();
        match self.transactions.iter().map(Transaction::id).max() {
            Some(max) if max >= clock => max + 1,
            _ => clock,
        }
    }
}

/// Loads and persists the `Ledger` through a `BlobStore`.
pub struct LedgerStore {
    store: Box<dyn BlobStore>,
}

impl LedgerStore {
    pub fn new(store: Box<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Loads the ledger. A missing blob is a first run and a blob that cannot be parsed is treated
    /// the same way: both give an empty ledger rather than an error.
    pub async fn load(&self) -> Ledger {
        let bytes = match self.store.get(TRANSACTIONS_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No stored transactions found, starting with an empty ledger");
                return Ledger::default();
            }
            Err(e) => {
                warn!("Unable to read stored transactions, starting with an empty ledger: {e:#}");
                return Ledger::default();
            }
        };
        match serde_json::from_slice::<Ledger>(&bytes) {
            Ok(ledger) => {
                debug!("Loaded {} transactions", ledger.len());
                ledger
            }
            Err(e) => {
                warn!("Stored transactions are malformed, starting with an empty ledger: {e}");
                Ledger::default()
            }
        }
    }

    /// Serializes the whole ledger and overwrites the stored blob.
    pub async fn persist(&self, ledger: &Ledger) -> Res<()> {
        let json = serde_json::to_vec(ledger).context("Unable to serialize the ledger")?;
        self.store
            .set(TRANSACTIONS_KEY, &json)
            .await
            .context("Unable to save the ledger")
    }

    /// Records a new transaction: loads the ledger, appends the transaction built from `entry`,
    /// persists the result and returns the created transaction along with the new ledger.
    pub async fn record(
        &self,
        entry: TransactionEntry,
        now: DateTime<Utc>,
    ) -> Res<(Transaction, Ledger)> {
        let ledger = self.load().await;
        let transaction = Transaction::new(ledger.next_id(now), entry, now);
        let ledger = ledger.append(transaction.clone());
        self.persist(&ledger).await?;
        debug!(
            "Recorded transaction {}, ledger now holds {}",
            transaction.id(),
            ledger.len()
        );
        Ok((transaction, ledger))
    }
}
