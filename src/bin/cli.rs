//! wxarchive CLI
//!
//! Command-line interface over a weewx archive:
//! - Look up daily, monthly, yearly and all-time records, optionally one kind
//! - Show the period of record and observation types
//! - Summarize an observation type
//! - Print a default config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use wxarchive::config::{generate_default_config, Config};
use wxarchive::records::{
    AggregateKind, ExtremeRecord, Record, RecordResolver, RecordResult, RecordSet, Window,
};
use wxarchive::storage::{ArchiveStore, TimeBasis, TimeSpan};

#[derive(Parser)]
#[command(name = "wxarchive")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Weather records and statistics from a weewx archive")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Archive database (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Calendar time basis: utc or local (overrides config)
    #[arg(long, global = true)]
    pub time_basis: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Max, min and sum records for one observation type
    Records {
        /// Observation type (e.g. outTemp, rain)
        obs_type: String,
        /// Only this aggregate: max, min or sum (default: all three)
        #[arg(short, long)]
        kind: Option<String>,
        #[command(subcommand)]
        window: WindowArg,
    },

    /// Show the period of record
    Por,

    /// List observation types
    ObsTypes,

    /// Summary statistics for one observation type
    Stats {
        /// Observation type
        obs_type: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum WindowArg {
    /// One calendar day across all years
    Daily {
        /// Month name or number
        #[arg(short, long)]
        month: String,
        /// Day of month
        #[arg(short, long)]
        day: u32,
    },
    /// One calendar month across all years
    Monthly {
        /// Month name or number
        #[arg(short, long)]
        month: String,
    },
    /// One calendar year
    Yearly {
        #[arg(short, long)]
        year: i32,
    },
    /// Every recorded day
    AllTime,
}

impl WindowArg {
    fn to_window(&self) -> Result<Window> {
        let window = match self {
            WindowArg::Daily { month, day } => Window::day(month, *day)?,
            WindowArg::Monthly { month } => Window::month(month)?,
            WindowArg::Yearly { year } => Window::year(*year)?,
            WindowArg::AllTime => Window::AllTime,
        };
        Ok(window)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let store = open_store(&cli)?;

    match cli.command {
        Commands::Records {
            obs_type,
            kind,
            window,
        } => {
            let window = window.to_window()?;
            let kinds = selected_kinds(kind.as_deref())?;
            let resolver = RecordResolver::new(store);

            let resolved = if kinds.len() == AggregateKind::ALL.len() {
                resolver.resolve_all(&obs_type, &window)
            } else {
                kinds.iter().try_fold(
                    RecordSet::default(),
                    |mut set, &kind| -> RecordResult<RecordSet> {
                        *record_slot(&mut set, kind) = resolver.resolve(&obs_type, &window, kind)?;
                        Ok(set)
                    },
                )
            };
            let records =
                resolved.with_context(|| format!("Failed to resolve {} records", obs_type))?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
                OutputFormat::Table => print_records(&obs_type, &window, &kinds, &records),
            }
        }

        Commands::Por => {
            let por = store.period_of_record()?;
            match (cli.format, por) {
                (OutputFormat::Json, por) => println!("{}", serde_json::to_string_pretty(&por)?),
                (OutputFormat::Table, Some(por)) => {
                    println!("First record: {}", por.start);
                    println!("Last record:  {}", por.end);
                    println!("Days:         {}", por.num_days);
                    println!("Years:        {:.1}", por.num_years);
                }
                (OutputFormat::Table, None) => println!("Archive contains no records."),
            }
        }

        Commands::ObsTypes => {
            let columns = store.observation_types()?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&columns)?),
                OutputFormat::Table => {
                    println!("{:<24} {}", "Name", "Type");
                    println!("{}", "-".repeat(36));
                    for column in columns {
                        println!("{:<24} {}", column.name, column.sql_type);
                    }
                }
            }
        }

        Commands::Stats { obs_type } => {
            let stats = store.stats(&obs_type, TimeSpan::all())?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Table => {
                    println!("{}", obs_type);
                    println!("  Count: {}", stats.count);
                    println!("  Min:   {}", format_value(stats.min));
                    println!("  Max:   {}", format_value(stats.max));
                    println!("  Avg:   {}", format_value(stats.avg));
                    println!("  Sum:   {}", format_value(stats.sum));
                }
            }
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

fn open_store(cli: &Cli) -> Result<ArchiveStore> {
    let mut config = Config::load_default();

    if let Some(db) = &cli.db {
        config.archive.db_path = db.to_string_lossy().into_owned();
    }
    if let Some(basis) = &cli.time_basis {
        config.archive.time_basis = basis.parse::<TimeBasis>()?;
    }

    Ok(ArchiveStore::new(config.archive.options()))
}

/// Aggregates requested with `--kind`; all of them when absent
fn selected_kinds(kind: Option<&str>) -> Result<Vec<AggregateKind>> {
    match kind {
        Some(kind) => Ok(vec![kind.parse::<AggregateKind>()?]),
        None => Ok(AggregateKind::ALL.to_vec()),
    }
}

fn record_slot(records: &mut RecordSet, kind: AggregateKind) -> &mut Option<Record> {
    match kind {
        AggregateKind::Max => &mut records.max,
        AggregateKind::Min => &mut records.min,
        AggregateKind::Sum => &mut records.sum,
    }
}

fn format_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn print_records(obs_type: &str, window: &Window, kinds: &[AggregateKind], records: &RecordSet) {
    println!("{} records, {}", obs_type, window);
    println!("{}", "-".repeat(60));

    for &kind in kinds {
        let record = match kind {
            AggregateKind::Max => &records.max,
            AggregateKind::Min => &records.min,
            AggregateKind::Sum => &records.sum,
        };

        match record {
            None => println!("{:<5} no data", kind.to_string()),
            Some(Record::Extreme(extreme)) => print_extreme(&kind.to_string(), extreme),
            Some(Record::Total(total)) => {
                println!("{:<5} {:.2} total", kind.to_string(), total.total);
                if let Some(peak) = &total.peak_day {
                    print_extreme("  day", peak);
                }
            }
            Some(Record::MonthlyTotal(monthly)) => {
                match &monthly.wettest_year {
                    Some(year) => {
                        let years: Vec<String> = year.years.iter().map(|y| y.to_string()).collect();
                        println!("{:<5} {:.2} in {}", kind.to_string(), year.total, years.join(", "));
                    }
                    None => println!("{:<5} no yearly totals", kind.to_string()),
                }
                if let Some(peak) = &monthly.peak_day {
                    print_extreme("  day", peak);
                }
            }
        }
    }
}

fn print_extreme(label: &str, record: &ExtremeRecord) {
    println!("{:<5} {:.2} at {}", label, record.value, record.times.join(", "));
}
