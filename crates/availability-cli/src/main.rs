//! `availability` CLI: localize recurring templates, merge interval files,
//! resolve trimesters, and sync one owner's window from the Data API.
//!
//! ## Usage
//!
//! ```sh
//! # Concrete intervals for the week starting Monday 2026-10-12
//! availability week --template tutor7.json --start 2026-10-12 --timezone America/New_York
//!
//! # A trimester of the template by weekday
//! availability trimester --template tutor7.json --trimester fall --timezone America/New_York
//!
//! # Merge adjacent same-location intervals (stdin → stdout)
//! cat intervals.json | availability merge
//!
//! # Which trimester a date belongs to
//! availability resolve 2026-10-12
//!
//! # Fetch and reconcile one owner's availability window
//! availability --config availability.toml sync --owner tutor:7 --exclude-sessions
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the level) so stdout stays JSON.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use availability_engine::{
    merge, AvailabilityInterval, AvailabilityRecord, DstPolicy, EngineConfig,
    HttpAvailabilityApi, Owner, RecurringRecord, RecurringTemplate, RecurringTemplateStore,
    SyncCoordinator, SyncParams, SystemClock, Trimester, WindowReplaceStore,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "availability",
    version,
    about = "Availability scheduling engine CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Localize a recurring template onto seven concrete days
    Week {
        /// Recurring template JSON file
        #[arg(long)]
        template: PathBuf,
        /// First day of the week (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// IANA timezone, e.g. America/New_York
        #[arg(long)]
        timezone: String,
        /// Overrides `localize.dst_policy` from the config
        #[arg(long, value_enum)]
        dst_policy: Option<PolicyArg>,
    },
    /// Show one trimester of a template by weekday
    Trimester {
        /// Recurring template JSON file
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        trimester: Trimester,
        /// IANA timezone, e.g. America/New_York
        #[arg(long)]
        timezone: String,
    },
    /// Merge a JSON array of availability records
    Merge {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the trimester a date falls in
    Resolve { date: NaiveDate },
    /// Fetch one owner's window from the Data API and print the stored result
    Sync {
        /// Owner as `tutor:<id>` or `counselor:<id>`
        #[arg(long)]
        owner: Owner,
        /// Window start (RFC 3339); defaults to now
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Window end (RFC 3339); defaults to now plus the sync horizon
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        exclude_sessions: bool,
        #[arg(long)]
        use_recurring: bool,
        #[arg(long)]
        location: Option<u64>,
        #[arg(long)]
        for_availability_view: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Skip,
    ShiftForward,
    WallClock,
}

impl From<PolicyArg> for DstPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Skip => DstPolicy::Skip,
            PolicyArg::ShiftForward => DstPolicy::ShiftForward,
            PolicyArg::WallClock => DstPolicy::WallClock,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Week {
            template,
            start,
            timezone,
            dst_policy,
        } => {
            let (owner, templates) = load_template(&template)?;
            let policy = dst_policy.map_or(config.localize.dst_policy, DstPolicy::from);
            let week = templates
                .localize_week(owner, start, &timezone, &config.trimesters, policy)
                .context("Failed to localize week")?;
            print_json(&week)?;
        }
        Commands::Trimester {
            template,
            trimester,
            timezone,
        } => {
            let (owner, templates) = load_template(&template)?;
            let days = templates
                .localize_trimester(owner, trimester, &timezone)
                .context("Failed to localize trimester")?;
            print_json(&days)?;
        }
        Commands::Merge { input, output } => {
            let raw = read_input(input.as_deref())?;
            let records: Vec<AvailabilityRecord> =
                serde_json::from_str(&raw).context("Input must be a JSON array of records")?;
            let merged = merge_by_owner(records)?;
            let pretty = serde_json::to_string_pretty(&merged)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Resolve { date } => {
            println!("{}", config.trimesters.resolve(date));
        }
        Commands::Sync {
            owner,
            start,
            end,
            exclude_sessions,
            use_recurring,
            location,
            for_availability_view,
        } => {
            let api = HttpAvailabilityApi::from_config(&config.api)
                .context("Data API client not configured")?;
            let coordinator = SyncCoordinator::from_config(api, SystemClock, &config.sync);
            let params = SyncParams {
                start,
                end,
                exclude_sessions: exclude_sessions.then_some(true),
                use_recurring_availability: use_recurring.then_some(true),
                location,
                for_availability_view: for_availability_view.then_some(true),
            };

            let mut store = WindowReplaceStore::new();
            let stored = coordinator
                .sync(&mut store, owner, params)
                .await
                .with_context(|| format!("Sync failed for {}", owner))?;
            let records: Vec<AvailabilityRecord> =
                stored.iter().map(AvailabilityInterval::to_record).collect();
            print_json(&records)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "availability=debug"
    } else {
        "availability=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Read a wire-format template file into a one-entry template store.
fn load_template(path: &Path) -> Result<(Owner, RecurringTemplateStore)> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template: {}", path.display()))?;
    let record: RecurringRecord = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid template JSON: {}", path.display()))?;
    let template = RecurringTemplate::try_from(record).context("Invalid template owner")?;
    let owner = template.owner;
    debug!(%owner, active = template.active, "template loaded");

    let mut templates = RecurringTemplateStore::new();
    templates.put(template);
    Ok((owner, templates))
}

/// Merge records per owner; intervals of different owners never merge.
fn merge_by_owner(records: Vec<AvailabilityRecord>) -> Result<Vec<AvailabilityRecord>> {
    let mut by_owner: BTreeMap<Owner, Vec<AvailabilityInterval>> = BTreeMap::new();
    for record in records {
        let interval = AvailabilityInterval::try_from(record).context("Invalid record")?;
        by_owner.entry(interval.owner()).or_default().push(interval);
    }

    Ok(by_owner
        .into_values()
        .flat_map(merge)
        .map(|iv| iv.to_record())
        .collect())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => println!("{}", content),
    }
    Ok(())
}
