//! The `dashboard` command handler.

use crate::args::DashboardArgs;
use crate::commands::{filter_spec, render_table, Out};
use crate::filter::filter;
use crate::model::format_money;
use crate::summary::Summary;
use crate::{Config, Result};
use chrono::Local;

/// Loads the ledger, applies the filters and summarizes what is left: totals, the income and
/// expense shares, expenses by category and the six month trend ending at `args.today()` (or
/// today in local time).
///
/// # Errors
///
/// - `ErrorType::Request` if the category filter is not a known category.
pub async fn dashboard(config: Config, args: DashboardArgs) -> Result<Out<Summary>> {
    let spec = filter_spec(args.filter())?;
    let ledger = config.ledger().load().await;
    let shown = filter(ledger.transactions(), &spec);
    let today = args.today().unwrap_or_else(|| Local::now().date_naive());
    let summary = Summary::new(&shown, today);
    Ok(Out::new(render(&summary), summary))
}

fn render(summary: &Summary) -> String {
    let mut sections = vec![format!(
        "Transactions: {}\nIncome:       {} ({}%)\nExpenses:     {} ({}%)\nNet balance:  {} ({})",
        summary.transaction_count,
        format_money(summary.total_income),
        summary.income_share,
        format_money(summary.total_expense),
        summary.expense_share,
        format_money(summary.net_balance),
        summary.balance_status,
    )];

    if summary.expenses_by_category.is_empty() {
        sections.push("No expenses".to_string());
    } else {
        let rows: Vec<Vec<String>> = summary
            .expenses_by_category
            .iter()
            .map(|c| vec![c.category.to_string(), format_money(c.total)])
            .collect();
        sections.push(render_table(&["Category", "Spent"], &rows));
    }

    let rows: Vec<Vec<String>> = summary
        .monthly_trend
        .iter()
        .map(|m| {
            vec![
                m.label.clone(),
                format_money(m.income),
                format_money(m.expense),
            ]
        })
        .collect();
    sections.push(render_table(&["Month", "Income", "Expenses"], &rows));

    sections.join("\n\n")
}
