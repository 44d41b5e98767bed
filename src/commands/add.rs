//! The `add` command handler.

use crate::args::AddArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Category, Transaction, TransactionEntry, TransactionType};
use crate::{Config, Result};
use chrono::{Local, Utc};

/// Validates the entry in `args`, appends it to the ledger and persists the ledger.
///
/// # Arguments
///
/// - `config` - The application configuration, which locates the ledger.
/// - `args` - The amount, category, type, date and note of the new transaction. The date defaults
///   to today in local time.
///
/// # Returns
///
/// On success, returns an `Out` containing a confirmation message and the created `Transaction`.
///
/// # Errors
///
/// - `ErrorType::InvalidAmount` if the amount is empty, not a number, negative or above
///   `Amount::MAX`. Nothing is written in that case.
/// - `ErrorType::Request` if the category or type is not recognized.
/// - `ErrorType::Storage` if the ledger cannot be written.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Transaction>> {
    let amount: Amount = args.amount().parse().pub_result(ErrorType::InvalidAmount)?;
    let category: Category = args.category().parse().pub_result(ErrorType::Request)?;
    let kind: TransactionType = args
        .kind()
        .trim()
        .to_ascii_lowercase()
        .parse()
        .pub_result(ErrorType::Request)?;
    let date = args.date().unwrap_or_else(|| Local::now().date_naive());

    let entry = TransactionEntry::new(amount, date)
        .category(category)
        .kind(kind)
        .note(args.note());

    let (transaction, ledger) = config
        .ledger()
        .record(entry, Utc::now())
        .await
        .pub_result(ErrorType::Storage)?;

    let message = format!(
        "Added {} of {} in {} on {} with id {} ({} transaction{} total)",
        transaction.kind(),
        transaction.amount(),
        transaction.category(),
        transaction.date(),
        transaction.id(),
        ledger.len(),
        if ledger.len() == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, transaction))
}
