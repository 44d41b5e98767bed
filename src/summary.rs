//! Dashboard numbers derived from a list of transactions.
//!
//! Everything here is a pure function of its input. Callers filter first and then summarize the
//! filtered list, recomputing from scratch whenever the list or the filter changes.

use crate::model::{Category, Transaction, TransactionType};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The number of calendar months shown in the monthly trend, ending with the current month.
pub const TREND_MONTHS: u32 = 6;

/// Sum of all income amounts.
pub fn total_income(transactions: &[Transaction]) -> Decimal {
    total_of(transactions, TransactionType::Income)
}

/// Sum of all expense amounts.
pub fn total_expense(transactions: &[Transaction]) -> Decimal {
    total_of(transactions, TransactionType::Expense)
}

/// Income minus expenses. Negative when more went out than came in.
pub fn net_balance(transactions: &[Transaction]) -> Decimal {
    total_income(transactions) - total_expense(transactions)
}

// Sums saturate at `Decimal::MAX` instead of panicking on overflow.
fn total_of(transactions: &[Transaction], kind: TransactionType) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.kind() == kind)
        .map(|t| t.amount().value())
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `part` as a percentage of `income + expense`, rounded to one decimal place. Zero when there is
/// nothing to divide by.
pub fn share(part: Decimal, income: Decimal, expense: Decimal) -> Decimal {
    let whole = income.saturating_add(expense);
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Total spent in one category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}

/// Sums expenses per category. Only categories with at least one expense appear, in the order in
/// which each was first seen.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        let amount = t.amount().value();
        match totals.iter_mut().find(|c| c.category == t.category()) {
            Some(existing) => existing.total = existing.total.saturating_add(amount),
            None => totals.push(CategoryTotal {
                category: t.category(),
                total: amount,
            }),
        }
    }
    totals
}

/// Income and expense sums for one month of the trend.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// Short month name, e.g. `Jan`.
    pub label: String,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Short month labels for the trend window ending with the month of `today`, oldest first.
pub fn trend_labels(today: NaiveDate) -> Vec<String> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..TREND_MONTHS as i32)
        .rev()
        .filter_map(|back| {
            let index = current - back;
            NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        })
        .map(month_label)
        .collect()
}

fn month_label(date: NaiveDate) -> String {
    date.format("%b").to_string()
}

/// Income and expense per month for the trailing window ending at the month of `today`.
///
/// Every month of the window is present, zero-filled when nothing happened in it. Transactions
/// are matched to a month by its short name only, so a transaction from a previous year lands in
/// the bucket with the same name. Transactions from months outside the window are left out.
pub fn monthly_trend(transactions: &[Transaction], today: NaiveDate) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = trend_labels(today)
        .into_iter()
        .map(|label| MonthBucket {
            label,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        })
        .collect();

    for t in transactions {
        let label = month_label(t.date());
        if let Some(bucket) = buckets.iter_mut().find(|b| b.label == label) {
            let total = match t.kind() {
                TransactionType::Income => &mut bucket.income,
                TransactionType::Expense => &mut bucket.expense,
            };
            *total = total.saturating_add(t.amount().value());
        }
    }
    buckets
}

/// Whether the net balance is in the black or the red.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Positive,
    Negative,
}

serde_plain::derive_display_from_serialize!(BalanceStatus);

/// Everything the dashboard shows, computed at once.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub transaction_count: usize,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
    pub balance_status: BalanceStatus,
    pub income_share: Decimal,
    pub expense_share: Decimal,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub monthly_trend: Vec<MonthBucket>,
}

impl Summary {
    pub fn new(transactions: &[Transaction], today: NaiveDate) -> Self {
        let income = total_income(transactions);
        let expense = total_expense(transactions);
        let net = income - expense;
        Self {
            transaction_count: transactions.len(),
            total_income: income,
            total_expense: expense,
            net_balance: net,
            balance_status: if net >= Decimal::ZERO {
                BalanceStatus::Positive
            } else {
                BalanceStatus::Negative
            },
            income_share: share(income, income, expense),
            expense_share: share(expense, income, expense),
            expenses_by_category: expenses_by_category(transactions),
            monthly_trend: monthly_trend(transactions, today),
        }
    }
}
