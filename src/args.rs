//! These structs provide the CLI interface for the expenses CLI.

use crate::model::{Category, TransactionType};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A personal expense tracker backed by a Google sheet.
///
/// Transactions and monthly budgets live in two ranges of a Google sheet. `expenses serve` exposes
/// them over a small JSON API, and the `dashboard`, `budgets` and `insert` subcommands talk to that
/// API to show how the month is going and to record new entries.
///
/// Access to the sheet is through a Google service account. See `expenses init --help`.
#[derive(Debug, Parser, Clone)]
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
    /// Create the data directory and initialize the configuration file.
    ///
    /// You need a few things ready beforehand:
    ///
    /// - The URL of the Google sheet, passed as --sheet-url. Share the sheet with the service
    ///   account's email address so that it can read and append.
    ///
    /// - A service account JSON key, passed as --service-account. It is moved into the secrets
    ///   directory. Alternatively, leave it out and set GOOGLE_SERVICE_ACCOUNT_EMAIL and
    ///   GOOGLE_PRIVATE_KEY whenever you run `expenses serve`.
    Init(InitArgs),
    /// Serve the JSON API for the sheet.
    Serve(ServeArgs),
    /// Show income, expenses and budget progress for a month.
    Dashboard(DashboardArgs),
    /// List the budgets in effect.
    Budgets(ClientArgs),
    /// Add a transaction or a budget.
    Insert(InsertArgs),
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

    /// The directory where the expenses configuration is held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// (Not shown): Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The path to your downloaded service account key. This file will be moved to the default
    /// secrets location in the main data directory.
    #[arg(long)]
    service_account: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(sheet_url: impl Into<String>, service_account: Option<PathBuf>) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            service_account,
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn service_account(&self) -> Option<&Path> {
        self.service_account.as_deref()
    }
}

/// (Not shown): Args for the `expenses serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// The address to listen on. Defaults to the `bind` setting in config.json.
    #[arg(long)]
    bind: Option<String>,
}

impl ServeArgs {
    pub fn new(bind: Option<String>) -> Self {
        Self { bind }
    }

    pub fn bind(&self) -> Option<&str> {
        self.bind.as_deref()
    }
}

/// Arguments for commands that talk to a running `expenses serve`.
#[derive(Debug, Parser, Clone)]
pub struct ClientArgs {
    /// The URL of the expenses API.
    #[arg(long, env = "EXPENSES_SERVER", default_value = crate::client::DEFAULT_SERVER)]
    server: String,

    /// The currency symbol printed before amounts.
    #[arg(long, default_value = crate::view::DEFAULT_CURRENCY)]
    currency: String,
}

impl ClientArgs {
    pub fn new(server: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            currency: currency.into(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// (Not shown): Args for the `expenses dashboard` command.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// The month to show, as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<String>,

    #[clap(flatten)]
    client: ClientArgs,
}

impl DashboardArgs {
    pub fn new(month: Option<String>, client: ClientArgs) -> Self {
        Self { month, client }
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn client(&self) -> &ClientArgs {
        &self.client
    }
}

/// (Not shown): Args for the `expenses insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    #[command(subcommand)]
    entity: InsertSubcommand,
}

impl InsertArgs {
    pub fn new(entity: InsertSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &InsertSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum InsertSubcommand {
    /// Add a transaction.
    Transaction(InsertTransactionArgs),
    /// Add a budget, or update one by adding a newer row for the same sub-category.
    Budget(InsertBudgetArgs),
}

/// (Not shown): Args for the `expenses insert transaction` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertTransactionArgs {
    /// The amount, e.g. 12.50
    #[arg(long)]
    amount: String,

    /// Debit for an expense, Credit for income.
    #[arg(long = "type", value_enum, ignore_case = true, default_value_t = TransactionType::Debit)]
    kind: TransactionType,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Category::Personal)]
    category: Category,

    /// Required for a debit when budgets exist for the category.
    #[arg(long)]
    sub_category: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// The date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<String>,

    #[clap(flatten)]
    client: ClientArgs,
}

impl InsertTransactionArgs {
    pub fn new(amount: impl Into<String>, client: ClientArgs) -> Self {
        Self {
            amount: amount.into(),
            kind: TransactionType::Debit,
            category: Category::Personal,
            sub_category: None,
            description: None,
            date: None,
            client,
        }
    }

    pub fn with_kind(mut self, kind: TransactionType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn sub_category(&self) -> Option<&str> {
        self.sub_category.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn client(&self) -> &ClientArgs {
        &self.client
    }
}

/// (Not shown): Args for the `expenses insert budget` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertBudgetArgs {
    #[arg(long, value_enum, ignore_case = true, default_value_t = Category::Personal)]
    category: Category,

    /// The sub-category name, e.g. Rent
    #[arg(long)]
    sub_category: String,

    /// The monthly budget, e.g. 15000
    #[arg(long)]
    budget: String,

    #[clap(flatten)]
    client: ClientArgs,
}

impl InsertBudgetArgs {
    pub fn new(
        category: Category,
        sub_category: impl Into<String>,
        budget: impl Into<String>,
        client: ClientArgs,
    ) -> Self {
        Self {
            category,
            sub_category: sub_category.into(),
            budget: budget.into(),
            client,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    pub fn budget(&self) -> &str {
        &self.budget
    }

    pub fn client(&self) -> &ClientArgs {
        &self.client
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default expenses home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("expenses")
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
    pub fn path(&self) -> &Path {
        &self.0
    }
}
