//! GeoImpact - Geopolitical event impact analysis from your terminal.
//!
//! A terminal-first CLI and embedded web UI for exploring how world
//! events hit everyday costs, backed by the GIA analysis API.

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

mod cli;
mod client;
mod errors;
mod fallback;
mod models;
mod output;
mod server;
mod state;

use cli::{Cli, Command};
use client::{load_events, BackendClient};
use fallback::{FallbackPolicy, DEMO_DELAY_MS, DEMO_NOTICE};
use models::AnalyzeRequest;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Events(args) => cmd_events(args),
        Command::Analyze(args) => cmd_analyze(args),
        Command::Ui(args) => cmd_ui(args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `events` command - one-shot fetch of the current event list.
fn cmd_events(args: cli::EventsArgs) -> Result<()> {
    let client = BackendClient::new(args.api_base).context("failed to create backend client")?;

    let load = load_events(&client, args.fallback);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Some(notice) = load.notice {
        output::write_notice(&mut handle, notice)?;
    }
    output::write_events(&mut handle, &load.events, args.format)?;

    Ok(())
}

/// Execute the `analyze` command - one analysis request for one event.
fn cmd_analyze(args: cli::AnalyzeArgs) -> Result<()> {
    let client = BackendClient::new(args.api_base).context("failed to create backend client")?;

    // Resolve the id against the current list (demo list if the backend
    // is down), so ids here match what the UI shows.
    let load = load_events(&client, FallbackPolicy::Silent);
    let Some(event) = load.events.iter().find(|e| e.id == args.event) else {
        let ids: Vec<String> = load.events.iter().map(|e| e.id.to_string()).collect();
        anyhow::bail!(
            "no event with id {} (available: {})",
            args.event,
            ids.join(", ")
        );
    };

    let request = AnalyzeRequest::for_event(event, args.location);
    let result = client.analyze(&request);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match result {
        Ok(report) => output::write_report(&mut handle, &report, args.format)?,
        Err(e) => {
            tracing::warn!("analysis failed, substituting demo report: {e}");
            if args.fallback.is_visible() {
                output::write_notice(&mut handle, DEMO_NOTICE)?;
                handle.flush()?;
            }
            std::thread::sleep(Duration::from_millis(DEMO_DELAY_MS));
            let report = fallback::demo_report(&event.title, args.location);
            output::write_report(&mut handle, &report, args.format)?;
        }
    }

    Ok(())
}

/// Execute the `ui` command - start web server.
fn cmd_ui(args: cli::UiArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        api_base: args.api_base.clone(),
        demo_delay: Duration::from_millis(DEMO_DELAY_MS),
    };

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m⚡ GeoImpact Web UI\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{}\x1b[0m", url);
    println!("  Backend: {}", args.api_base);
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))
}
