//! The `list` command handler.

use crate::args::FilterArgs;
use crate::commands::{filter_spec, render_table, Out};
use crate::filter::filter;
use crate::model::Transaction;
use crate::{Config, Result};
use tracing::debug;

/// Loads the ledger and lists the transactions that pass the date and category filters, in the
/// order they were recorded.
///
/// # Errors
///
/// - `ErrorType::Request` if the category filter is not a known category.
pub async fn list(config: Config, args: FilterArgs) -> Result<Out<Vec<Transaction>>> {
    let spec = filter_spec(&args)?;
    let ledger = config.ledger().load().await;
    let shown = filter(ledger.transactions(), &spec);
    debug!("Showing {} of {} transactions", shown.len(), ledger.len());

    if shown.is_empty() {
        return Ok(Out::new("No transactions found", shown));
    }

    let rows: Vec<Vec<String>> = shown
        .iter()
        .map(|t| {
            vec![
                t.date().to_string(),
                t.kind().to_string(),
                t.category().to_string(),
                t.amount().to_string(),
                t.note().to_string(),
            ]
        })
        .collect();
    let message = render_table(&["Date", "Type", "Category", "Amount", "Note"], &rows);
    Ok(Out::new(message, shown))
}
