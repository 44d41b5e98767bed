//! These structs provide the CLI interface for the finman CLI.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finman: A local personal finance ledger with a live currency converter.
///
/// Record income and expenses, list and filter them, and see a dashboard of totals, category
/// breakdowns and a six month trend. The ledger is stored as JSON in the finman home directory.
///
/// Exchange rates come from exchangerate-api.com, which needs an API key. Set
/// FINMAN_OFFLINE_RATES to any non-empty value to use built-in rates instead.
#[derive(Debug, Parser, Clone)]
#[command(name = "finman", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the initial configuration file.
    ///
    /// This is the first command you should run. By default the data lives in $HOME/finman, pass
    /// --finman-home or set FINMAN_HOME to put it somewhere else.
    Init(InitArgs),
    /// Record an income or expense transaction.
    Add(AddArgs),
    /// List transactions, optionally filtered by date range and category.
    List(FilterArgs),
    /// Show totals, the expense breakdown by category and the six month trend.
    Dashboard(DashboardArgs),
    /// Fetch and show the latest exchange rates against USD.
    Rates(RateArgs),
    /// Convert an amount from one currency to another using the latest rates.
    Convert(ConvertArgs),
    /// Poll the exchange rates on an interval and print each update until interrupted.
    Watch(WatchArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where finman data and configuration is held. Defaults to ~/finman
    #[arg(long, env = "FINMAN_HOME", default_value_t = default_finman_home())]
    finman_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, finman_home: PathBuf) -> Self {
        Self {
            log_level,
            finman_home: finman_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finman_home(&self) -> &DisplayPath {
        &self.finman_home
    }
}

/// (Not shown): Args for the `finman init` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct InitArgs {
    /// Your exchangerate-api.com API key. It can also be added to config.json later.
    #[arg(long)]
    api_key: Option<String>,
}

impl InitArgs {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// (Not shown): Args for the `finman add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount, e.g. 12.50. A leading "$" and thousands separators are accepted.
    #[arg(allow_negative_numbers = true)]
    amount: String,

    /// One of: Food, Transport, Entertainment, Shopping, Bills, Other
    #[arg(long, default_value = "Other")]
    category: String,

    /// Either "income" or "expense"
    #[arg(long = "type", default_value = "expense")]
    kind: String,

    /// The date of the transaction as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// A free-form note.
    #[arg(long, default_value = "")]
    note: String,
}

impl AddArgs {
    pub fn new(
        amount: impl Into<String>,
        category: impl Into<String>,
        kind: impl Into<String>,
        date: Option<NaiveDate>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            kind: kind.into(),
            date,
            note: note.into(),
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// (Not shown): Filters shared by `finman list` and `finman dashboard`.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Only include transactions on or after this date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Only include transactions on or before this date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Only include transactions in this category. An empty value means all categories.
    #[arg(long)]
    category: Option<String>,
}

impl FilterArgs {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>, category: Option<String>) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// The category filter, with a blank value treated as no filter.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// (Not shown): Args for the `finman dashboard` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct DashboardArgs {
    #[clap(flatten)]
    filter: FilterArgs,

    /// The day the six month trend ends on (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    today: Option<NaiveDate>,
}

impl DashboardArgs {
    pub fn new(filter: FilterArgs, today: Option<NaiveDate>) -> Self {
        Self { filter, today }
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }

    pub fn today(&self) -> Option<NaiveDate> {
        self.today
    }
}

/// (Not shown): Exchange rate service options shared by the rate commands.
#[derive(Debug, Parser, Clone, Default)]
pub struct RateArgs {
    /// The exchangerate-api.com API key. Overrides the key in config.json.
    #[arg(long, env = "FINMAN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl RateArgs {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// (Not shown): Args for the `finman convert` command.
#[derive(Debug, Parser, Clone)]
pub struct ConvertArgs {
    /// The amount to convert.
    #[arg(allow_negative_numbers = true)]
    amount: String,

    /// The currency code to convert from, e.g. USD
    from: String,

    /// The currency code to convert to, e.g. EUR
    to: String,

    #[clap(flatten)]
    rates: RateArgs,
}

impl ConvertArgs {
    pub fn new(
        amount: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        rates: RateArgs,
    ) -> Self {
        Self {
            amount: amount.into(),
            from: from.into(),
            to: to.into(),
            rates,
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn rates(&self) -> &RateArgs {
        &self.rates
    }
}

/// (Not shown): Args for the `finman watch` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct WatchArgs {
    /// Seconds between fetches. Defaults to poll_interval_secs from config.json.
    #[arg(long)]
    interval: Option<u64>,

    /// Stop after this many fetches instead of waiting for Ctrl-C.
    #[arg(long)]
    ticks: Option<u64>,

    #[clap(flatten)]
    rates: RateArgs,
}

impl WatchArgs {
    pub fn new(interval: Option<u64>, ticks: Option<u64>, rates: RateArgs) -> Self {
        Self {
            interval,
            ticks,
            rates,
        }
    }

    pub fn interval(&self) -> Option<u64> {
        self.interval
    }

    pub fn ticks(&self) -> Option<u64> {
        self.ticks
    }

    pub fn rates(&self) -> &RateArgs {
        &self.rates
    }
}

fn default_finman_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finman"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finman-home or FINMAN_HOME instead of relying on the default \
                finman home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("finman")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
