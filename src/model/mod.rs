//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod transaction;

pub use amount::{format_money, Amount, AmountError};
pub use category::{Category, UnknownCategory};
pub use transaction::{Transaction, TransactionEntry, TransactionType};
