//! Ham Wrapped CLI - Summarize a year of amateur radio contacts from an ADIF log.

use anyhow::{Context, Result};
use clap::Parser;
use ham_wrapped::{
    Config, ContactRecord, LogStatistics, ReferenceDatabase, StatsContext, TARGET_YEAR,
    compute_all, enrich, loader, looks_like_adif, parse_adif,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Ham Wrapped - Year-in-review statistics for an ADIF log
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ADIF log file to analyze
    log: PathBuf,

    /// CTY.DAT country file path or URL (defaults to the config file setting)
    #[arg(long, env = "HAM_WRAPPED_CTY")]
    cty: Option<String>,

    /// Skip callsign resolution entirely
    #[arg(long, conflicts_with = "cty")]
    no_cty: bool,

    /// Maidenhead locator of your station, for distances
    #[arg(short, long, env = "HAM_WRAPPED_LOCATOR")]
    locator: Option<String>,

    /// Print statistics as JSON
    #[arg(long)]
    json: bool,

    /// Print the resolved contacts as JSON instead of statistics
    #[arg(long, conflicts_with = "json")]
    records: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    config.validate()?;

    let locator = args.locator.clone().or_else(|| config.locator.clone());
    if let Some(ref callsign) = config.callsign {
        info!("Station: {}", callsign);
    }

    let text = loader::read_file(&args.log)
        .await
        .with_context(|| format!("Failed to load log {}", args.log.display()))?;
    if !looks_like_adif(&text) {
        warn!("{} does not look like an ADIF file", args.log.display());
    }

    let db = if args.no_cty {
        None
    } else {
        let source = args.cty.as_deref().unwrap_or(&config.cty_source);
        load_reference_database(source, Duration::from_secs(config.fetch_timeout)).await
    };

    let ctx = StatsContext {
        db: db.as_ref(),
        fallback_station: config.fallback_station.into(),
        top_callsigns: config.top_callsigns,
    };
    let (records, stats) = analyze(&text, locator.as_deref(), &ctx)?;

    if args.records {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }

    Ok(())
}

/// Load and parse the country file, continuing without one on failure.
async fn load_reference_database(source: &str, timeout: Duration) -> Option<ReferenceDatabase> {
    match loader::load_text(source, timeout).await {
        Ok(text) => {
            let db = ReferenceDatabase::parse(&text);
            if db.is_empty() {
                warn!("No entities found in {}, callsigns will not be resolved", source);
                None
            } else {
                Some(db)
            }
        }
        Err(e) => {
            warn!("Continuing without country data: {}", e);
            None
        }
    }
}

/// Parse, resolve and summarize a log.
///
/// Fails only when the log has no usable contacts for the target year.
fn analyze(
    text: &str,
    locator: Option<&str>,
    ctx: &StatsContext<'_>,
) -> Result<(Vec<ContactRecord>, LogStatistics)> {
    let mut log = parse_adif(text);

    if log.records.is_empty() {
        let years: Vec<String> = log.other_years.keys().map(|y| y.to_string()).collect();
        if years.is_empty() {
            anyhow::bail!("No QSOs found in log");
        }
        anyhow::bail!(
            "No QSOs from {} found in log (log contains {})",
            TARGET_YEAR,
            years.join(", ")
        );
    }

    if let Some(db) = ctx.db {
        let resolved = enrich(&mut log.records, db);
        info!("Resolved {} of {} callsigns", resolved, log.records.len());
    }

    let stats = compute_all(&log.records, locator, ctx);
    Ok((log.records, stats))
}
