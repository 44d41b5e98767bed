//! Command handlers for the finman CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod dashboard;
mod init;
mod list;
mod rates;

use crate::args::FilterArgs;
use crate::error::{ErrorType, IntoResult};
use crate::filter::FilterSpec;
use crate::model::Category;
use crate::Result;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use dashboard::dashboard;
pub use init::init;
pub use list::list;
pub use rates::{convert, rates, watch, Conversion};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Turns the CLI filter flags into a `FilterSpec`, rejecting unknown categories.
fn filter_spec(args: &FilterArgs) -> Result<FilterSpec> {
    let category = args
        .category()
        .map(str::parse::<Category>)
        .transpose()
        .pub_result(ErrorType::Request)?;
    Ok(FilterSpec::new(args.start(), args.end(), category))
}

/// Pads each column to its widest cell and joins the rows with newlines.
fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(header.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let table = render_table(
            &["Code", "Rate"],
            &[
                vec!["USD".to_string(), "1.0000".to_string()],
                vec!["UZS".to_string(), "12850.0000".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Code  Rate");
        assert_eq!(lines[1], "----  ----------");
        assert_eq!(lines[2], "USD   1.0000");
        assert_eq!(lines[3], "UZS   12850.0000");
    }

    #[test]
    fn test_filter_spec_blank_category() {
        let args = FilterArgs::new(None, None, Some(" ".to_string()));
        assert!(filter_spec(&args).unwrap().is_empty());
    }

    #[test]
    fn test_filter_spec_unknown_category() {
        let args = FilterArgs::new(None, None, Some("Rent".to_string()));
        let err = filter_spec(&args).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }
}
