pub mod args;
pub mod commands;
mod config;
mod error;
pub mod filter;
pub mod ledger;
pub mod model;
pub mod rates;
pub mod store;
pub mod summary;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
pub use model::Amount;
pub use rates::Mode;
