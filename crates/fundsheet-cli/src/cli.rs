//! CLI argument definitions for fundsheet.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bootstrap` | Fill an empty sheet with every fund class of the catalog |
//! | `update` | Recompute the metrics of every stored row |
//! | `search` | Find stored funds by name |
//! | `check` | Repair rows with missing or non-numeric metrics |
//! | `debug` | Print settings and check the API and the sheet |
//!
//! Without a command, a numbered menu is read from stdin.
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--log-level` | `FUNDSHEET_LOG_LEVEL` or `info` | Log filter when `RUST_LOG` is unset |
//! | `--dry-run` | `false` | Use an in-memory sheet instead of Google Sheets |
//! | `--format` | `table` | Output format (table, json) |
//!
//! # Examples
//!
//! ```bash
//! fundsheet bootstrap
//! fundsheet update --log-level debug
//! fundsheet search "renta fija" --format json
//! fundsheet --dry-run check
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Fund sheet maintenance for CAFCI mutual funds
#[derive(Debug, Parser)]
#[command(
    name = "fundsheet",
    author,
    version,
    about = "Keep a spreadsheet of Argentine mutual fund classes and their yields current",
    long_about = "fundsheet pulls the CAFCI fund catalog and share prices, derives monthly \
and annual rates, and writes them to a Google Sheets spreadsheet.\n\
\n\
Use 'fundsheet <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Work against an in-memory sheet; nothing is written to Google Sheets.
    #[arg(long, global = true, default_value_t = false)]
    pub dry_run: bool,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fill an empty sheet with every fund class of the catalog.
    ///
    /// Does nothing when the sheet already holds data rows.
    Bootstrap,

    /// Recompute TNA, TEA, TEM and performance for every stored row.
    Update,

    /// Find stored funds whose name contains a query, ignoring case.
    ///
    /// # Examples
    ///
    ///   fundsheet search alianza
    ///   fundsheet search "renta fija" --format json
    Search(SearchArgs),

    /// Recompute only rows whose metrics are missing or not numeric.
    Check,

    /// Print the effective settings and check the API and the sheet.
    Debug,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Text to look for in fund names.
    pub query: String,
}
