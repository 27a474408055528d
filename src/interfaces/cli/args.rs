//! Command-line surface. Settings fall back to environment variables.

use crate::config::{DEFAULT_CART_KEY, DEFAULT_UNIT};
use crate::domain::catalog::{ProductStatus, SortOrder};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "storefront", author, version, about = "Storefront cart ledger and checkout", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct StorageArgs {
    /// Directory holding the local storage files
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = ".storefront", global = true)]
    pub data_dir: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "STOREFRONT_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct LedgerArgs {
    /// Currency unit label used for prices and totals
    #[arg(long, env = "STOREFRONT_UNIT", default_value = DEFAULT_UNIT, global = true)]
    pub unit: String,

    /// Local storage key of the cart blob
    #[arg(long, env = "STOREFRONT_CART_KEY", default_value = DEFAULT_CART_KEY, global = true)]
    pub cart_key: String,
}

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

#[derive(Debug, Args)]
pub struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse and manage merchant listings
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        command: CartCommand,
    },
    /// Pay for the cart through the simulated gateway
    Checkout(CheckoutArgs),
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List products as CSV
    List(ListArgs),
    /// List a new product
    Add(AddProductArgs),
    /// Delist a product
    Remove { id: String },
    /// Change a product's status
    Status { id: String, status: StatusArg },
    /// Upsert products from a CSV file
    Import { path: PathBuf },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive match on name, description or category
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Lowest unit price, inclusive
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Highest unit price, inclusive
    #[arg(long)]
    pub max: Option<Decimal>,

    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    #[arg(long, value_enum, default_value_t = SortArg::Newest)]
    pub sort: SortArg,
}

#[derive(Debug, Args)]
pub struct AddProductArgs {
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub name: String,

    /// Unit price, e.g. "0.5" or "0.5 ETH"
    #[arg(long)]
    pub price: String,

    #[arg(long)]
    pub category: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub image: String,

    #[arg(long)]
    pub token_id: Option<String>,

    /// Mark the listing as private
    #[arg(long)]
    pub private: bool,

    /// List as a draft instead of active
    #[arg(long)]
    pub draft: bool,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Print the cart lines and totals
    Show,
    /// Add a catalog product
    Add {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line
    Remove { id: String },
    /// Set a line's quantity; zero or less removes it
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Flip the cart panel visibility
    Toggle,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Connected wallet address; without it the wallet flow is requested
    #[arg(long, env = "STOREFRONT_WALLET")]
    pub wallet: Option<String>,

    /// Chance that the simulated payment is rejected
    #[arg(long, env = "STOREFRONT_FAILURE_PROBABILITY", default_value_t = 0.1)]
    pub failure_probability: f64,

    /// Simulated gateway delay in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub payment_delay_ms: u64,

    /// Interval between progress ticks in milliseconds
    #[arg(long, default_value_t = 500)]
    pub tick_ms: u64,

    /// Progress added per tick
    #[arg(long, default_value_t = 10)]
    pub progress_step: u8,

    /// Seed for reproducible simulated outcomes
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Active,
    Draft,
    Inactive,
}

impl From<StatusArg> for ProductStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => ProductStatus::Active,
            StatusArg::Draft => ProductStatus::Draft,
            StatusArg::Inactive => ProductStatus::Inactive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Newest,
    PriceLow,
    PriceHigh,
    Name,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => SortOrder::Newest,
            SortArg::PriceLow => SortOrder::PriceLowToHigh,
            SortArg::PriceHigh => SortOrder::PriceHighToLow,
            SortArg::Name => SortOrder::Name,
        }
    }
}
