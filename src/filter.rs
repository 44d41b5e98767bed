//! Narrows a list of transactions down by date range and category.

use crate::model::{Category, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which transactions to show. Every field is optional and an absent field does not filter
/// anything, so the default filter shows the full list.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Earliest date to keep, inclusive.
    pub start: Option<NaiveDate>,
    /// Latest date to keep, inclusive.
    pub end: Option<NaiveDate>,
    pub category: Option<Category>,
}

impl FilterSpec {
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        category: Option<Category>,
    ) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    /// True when no field is set, i.e. this filter keeps everything.
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.category.is_none()
    }

    /// Whether `transaction` satisfies every field that is set.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let date = transaction.date();
        self.start.map_or(true, |start| date >= start)
            && self.end.map_or(true, |end| date <= end)
            && self
                .category
                .map_or(true, |category| transaction.category() == category)
    }
}

/// Returns the transactions that match `spec`, in their original order.
pub fn filter(transactions: &[Transaction], spec: &FilterSpec) -> Vec<Transaction> {
    if spec.is_empty() {
        return transactions.to_vec();
    }
    transactions
        .iter()
        .filter(|t| spec.matches(t))
        .cloned()
        .collect()
}
