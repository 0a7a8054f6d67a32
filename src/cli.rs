//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use clap::{Parser, Subcommand};

use crate::client::DEFAULT_API_BASE;
use crate::fallback::FallbackPolicy;
use crate::models::Location;
use crate::output::Format;

/// Geopolitical event impact analysis from your terminal.
#[derive(Parser, Debug)]
#[command(name = "geoimpact")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List recent events (one-shot fetch and exit)
    Events(EventsArgs),

    /// Analyze one event's impact for a location
    Analyze(AnalyzeArgs),

    /// Start the web UI server
    Ui(UiArgs),
}

/// Arguments for the `events` command.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Backend base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Fallback behavior when the fetch fails
    #[arg(long, default_value = "silent", value_parser = parse_policy)]
    pub fallback: FallbackPolicy,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `analyze` command.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// ID of the event to analyze (see `events` for the list)
    #[arg(long, short = 'e')]
    pub event: i64,

    /// Location to analyze the impact for
    #[arg(long, short = 'l', default_value = "India", value_parser = parse_location)]
    pub location: Location,

    /// Backend base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Fallback behavior when the analysis fails
    #[arg(long, default_value = "visible", value_parser = parse_policy)]
    pub fallback: FallbackPolicy,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `ui` command.
#[derive(Parser, Debug)]
pub struct UiArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Backend base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse a fallback policy from string.
fn parse_policy(s: &str) -> Result<FallbackPolicy, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a location from string.
fn parse_location(s: &str) -> Result<Location, String> {
    s.parse()
}
