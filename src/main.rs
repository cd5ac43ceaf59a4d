//! Sumi-Navigator main entry point
//!
//! Command-line probe: navigates to each target and reports how the
//! response was classified.

use clap::Parser;
use std::path::PathBuf;
use sumi_navigator::config::{load_config_with_hash, Config};
use sumi_navigator::NavigationSession;
use tracing_subscriber::EnvFilter;

/// Sumi-Navigator: navigation and response classification probe
///
/// Navigates to each URL, optionally clicks through links by their text,
/// and prints the status, verdict, redirect and retry information.
#[derive(Parser, Debug)]
#[command(name = "sumi-navigator")]
#[command(version = "1.0.0")]
#[command(about = "Navigation and response classification probe", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URLs to navigate to
    #[arg(value_name = "URL", required_unless_present = "dry_run")]
    urls: Vec<String>,

    /// Link text or title to click after each navigation (repeatable, in order)
    #[arg(long, value_name = "TEXT")]
    click: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show it without navigating
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut session = NavigationSession::from_config(&config)?;
    let mut failures = 0usize;

    for url in &cli.urls {
        if let Err(e) = probe(&mut session, url, &cli.click).await {
            tracing::error!("{}: {}", url, e);
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} targets failed", failures, cli.urls.len()).into());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_navigator=info,warn"),
            1 => EnvFilter::new("sumi_navigator=debug,info"),
            2 => EnvFilter::new("sumi_navigator=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Navigates to one target, clicks through, and prints each step
async fn probe(
    session: &mut NavigationSession,
    url: &str,
    clicks: &[String],
) -> sumi_navigator::Result<()> {
    session.navigate(url).await?;
    print_report(session, url)?;

    for text in clicks {
        session.click_link(text).await?;
        print_report(session, &format!("{} > {}", url, text))?;
    }

    Ok(())
}

fn print_report(session: &NavigationSession, label: &str) -> sumi_navigator::Result<()> {
    println!("=== {} ===", label);
    if let Some(document) = session.document() {
        println!("  Final URL: {}", document.url());
        if let Some(title) = document.title() {
            println!("  Title: {}", title);
        }
    }
    println!("  Status: {}", session.status_code()?);
    println!("  Verdict: {}", session.verdict()?);
    println!("  Temporary redirect: {}", session.uses_temporary_redirect());
    if let Some(permanent) = session.permanent_redirect_url() {
        println!("  Permanent redirect: {}", permanent);
    }
    if let Some(retry_at) = session.retry_at() {
        println!("  Retry at: {} ({})", retry_at.to_rfc3339(), retry_at.timestamp());
    }
    println!();
    Ok(())
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Navigator Dry Run ===\n");

    println!("Navigator Configuration:");
    println!("  Request timeout: {}s", config.navigator.request_timeout);
    println!("  Connect timeout: {}s", config.navigator.connect_timeout);
    println!("  Max redirects: {}", config.navigator.max_redirects);
    println!("  HTTPS only: {}", config.navigator.https_only);
    println!(
        "  Click refreshes metadata: {}",
        config.navigator.click_refreshes_metadata
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}
