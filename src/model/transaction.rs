use crate::model::{Amount, Category};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether a transaction brings money in or sends it out.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single entry in the ledger. Transactions are never edited once created.
///
/// The serialized field names are part of the on-disk format of the ledger blob:
/// ```json
/// {
///   "id": 1704442800000,
///   "amount": "40",
///   "category": "Food",
///   "type": "expense",
///   "date": "2024-01-10",
///   "note": "groceries",
///   "timestamp": 1704442800000
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: i64,
    amount: Amount,
    category: Category,
    #[serde(rename = "type")]
    kind: TransactionType,
    date: NaiveDate,
    #[serde(default)]
    note: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Builds a transaction from a validated entry. The `timestamp` is truncated to millisecond
    /// precision so that it survives a trip through the ledger blob unchanged.
    pub fn new(id: i64, entry: TransactionEntry, timestamp: DateTime<Utc>) -> Self {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(timestamp.timestamp_millis())
            .unwrap_or(timestamp);
        Self {
            id,
            amount: entry.amount,
            category: entry.category,
            kind: entry.kind,
            date: entry.date,
            note: entry.note,
            timestamp,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// The user-supplied part of a transaction, before an id and timestamp are assigned.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransactionEntry {
    pub amount: Amount,
    pub category: Category,
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub note: String,
}

impl TransactionEntry {
    /// An entry with the defaults of the entry form: an `Other` expense with no note.
    pub fn new(amount: Amount, date: NaiveDate) -> Self {
        Self {
            amount,
            category: Category::default(),
            kind: TransactionType::default(),
            date,
            note: String::new(),
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = kind;
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}
