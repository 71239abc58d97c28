//! Jobscout main entry point
//!
//! By default this serves the HTTP API; `--search` runs a single search from
//! command-line filters instead and prints the records as JSON.

use clap::Parser;
use jobscout::config::load_config;
use jobscout::engine::JobAcquisitionEngine;
use jobscout::search::{DatePosted, ExperienceLevel, JobType, SearchFilters, WorkArrangement};
use jobscout::server::run_server;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Jobscout: an authenticated job-listing acquisition engine
#[derive(Parser, Debug)]
#[command(name = "jobscout")]
#[command(version = "1.0.0")]
#[command(about = "Collects job postings from LinkedIn", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would run without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Run one search from the command line instead of serving the API
    #[arg(long)]
    search: bool,

    /// Search keywords (with --search)
    #[arg(long, requires = "search")]
    keywords: Option<String>,

    /// Search location (with --search)
    #[arg(long, requires = "search")]
    location: Option<String>,

    /// Posting age: any-time, past-24-hours, past-week, past-month
    #[arg(long, value_name = "WINDOW", requires = "search")]
    date_posted: Option<String>,

    /// Job types, repeatable: full-time, part-time, contract, ...
    #[arg(long, value_name = "TYPE", requires = "search")]
    job_type: Vec<String>,

    /// Experience levels, repeatable: internship, entry-level, associate, ...
    #[arg(long, value_name = "LEVEL", requires = "search")]
    experience: Vec<String>,

    /// Work arrangements, repeatable: on-site, remote, hybrid
    #[arg(long, value_name = "MODE", requires = "search")]
    remote: Vec<String>,

    /// Maximum number of records to collect (with --search)
    #[arg(long, default_value_t = 25, requires = "search")]
    max_jobs: usize,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    if cli.search {
        handle_search(&cli, config).await?;
    } else {
        run_server(config).await?;
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
            0 => EnvFilter::new("jobscout=info,warn"),
            1 => EnvFilter::new("jobscout=debug,info"),
            2 => EnvFilter::new("jobscout=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &jobscout::config::Config) {
    println!("=== Jobscout Dry Run ===\n");

    println!("Account:");
    println!("  Email: {}", config.account.email);

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    if let Some(binary) = &config.browser.chrome_binary {
        println!("  Chrome binary: {}", binary);
    }

    println!("\nSession:");
    println!("  Cookie file: {}", config.session.cookie_path);

    println!("\nServer:");
    println!("  Bind: {}:{}", config.server.host, config.server.port);

    match &config.mailbox {
        Some(mailbox) => println!("\nMailbox lookup: {}", mailbox.endpoint),
        None => println!("\nMailbox lookup: not configured (manual challenge completion only)"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --search mode: one search, records printed as JSON
async fn handle_search(cli: &Cli, config: jobscout::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let date_posted = match &cli.date_posted {
        Some(value) => Some(parse_value::<DatePosted>(value)?),
        None => None,
    };

    let filters = SearchFilters {
        keywords: cli.keywords.clone(),
        location: cli.location.clone(),
        date_posted,
        experience_level: parse_values::<ExperienceLevel>(&cli.experience)?,
        job_type: parse_values::<JobType>(&cli.job_type)?,
        remote: parse_values::<WorkArrangement>(&cli.remote)?,
    };

    let mut engine = JobAcquisitionEngine::launch(&config).await?;
    let result = engine.search(&filters, cli.max_jobs).await;
    engine.close().await;

    let records = result?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Parses one kebab-case CLI value through the filters' serde names
fn parse_value<T: serde::de::DeserializeOwned>(
    value: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let json = format!("\"{}\"", value);
    Ok(serde_json::from_str(&json).map_err(|_| format!("unknown value: {}", value))?)
}

/// Parses repeatable kebab-case CLI values
fn parse_values<T: serde::de::DeserializeOwned>(
    values: &[String],
) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    values.iter().map(|v| parse_value(v)).collect()
}
