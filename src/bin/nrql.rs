//! nrql — build NRQL queries from the command line
//!
//! # Usage
//!
//! ```bash
//! # Build a query from flags
//! nrql build --select userAgentName --from PageView --since "4 days ago" --timeseries
//!
//! # Render a saved query from nrql.toml
//! nrql run windows_users
//!
//! # List saved queries as JSON
//! nrql list --format json
//! ```

use anyhow::Result;
use chrono::TimeZone;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use nrql::config::{QueryDef, parse_zone};
use nrql::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nrql")]
#[command(version)]
#[command(about = "Build New Relic Query Language strings", long_about = None)]
#[command(after_help = "EXAMPLES:
    nrql build --all --from PageView --since '1 days ago'
    nrql build --select userAgentName,countryCode --from PageView --facet countryCode --limit 20
    nrql run windows_users --config ./nrql.toml")]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a query from command line flags
    Build(BuildArgs),
    /// Render a saved query from nrql.toml
    Run {
        /// Name of the saved query
        name: String,
        /// Path to the config file
        #[arg(short, long, env = "NRQL_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Render every saved query from nrql.toml
    List {
        /// Path to the config file
        #[arg(short, long, env = "NRQL_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Render a query that uses every clause
    Demo,
    /// Show the clause reference
    Clauses,
}

#[derive(Args)]
struct BuildArgs {
    /// Attributes or expressions to select
    #[arg(short, long, value_delimiter = ',', conflicts_with = "all", required_unless_present = "all")]
    select: Vec<String>,

    /// Select all attributes (SELECT *)
    #[arg(short, long)]
    all: bool,

    /// Event types to query
    #[arg(long, value_delimiter = ',', required = true)]
    from: Vec<String>,

    /// WHERE conditions, passed through verbatim
    #[arg(short = 'w', long = "where")]
    filter: Option<String>,

    /// FACET attribute or expression
    #[arg(long)]
    facet: Option<String>,

    #[arg(short, long)]
    limit: Option<usize>,

    /// Beginning of the time range ("4 days ago", "yesterday", "2015-01-01 00:00:00")
    #[arg(long)]
    since: Option<String>,

    /// End of the time range
    #[arg(long)]
    until: Option<String>,

    /// Beginning of the range to compare with
    #[arg(long)]
    compare_with: Option<String>,

    /// TIMESERIES bucket: a period such as "1 hours", AUTO or MAX
    #[arg(long, num_args = 0..=1, default_missing_value = "AUTO")]
    timeseries: Option<String>,

    /// WITH TIMEZONE fragment, passed through verbatim
    #[arg(long)]
    timezone: Option<String>,

    /// Zone used to read exact timestamps
    #[arg(short, long, default_value = "UTC")]
    zone: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Build(args) => build_query(args).and_then(|q| print_query(None, &q, cli.format)),
        Commands::Run { name, config } => run_saved(name, config.as_ref(), cli.format),
        Commands::List { config } => list_saved(config.as_ref(), cli.format),
        Commands::Demo => demo_query().and_then(|q| print_query(None, &q, cli.format)),
        Commands::Clauses => {
            show_clauses();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let directive = if verbose { "nrql=debug" } else { "nrql=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_query(args: &BuildArgs) -> Result<String> {
    let zone = parse_zone(&args.zone)?;
    let query = args.to_query_def().to_builder(zone)?;
    Ok(query.render()?)
}

impl BuildArgs {
    /// The flags as a saved-query definition, so both paths build alike.
    fn to_query_def(&self) -> QueryDef {
        let select = if self.all {
            vec!["*".to_string()]
        } else {
            self.select.clone()
        };
        QueryDef {
            select,
            from: self.from.clone(),
            filter: self.filter.clone(),
            facet: self.facet.clone(),
            limit: self.limit,
            since: self.since.clone(),
            until: self.until.clone(),
            compare_with: self.compare_with.clone(),
            timeseries: self.timeseries.clone(),
            timezone: self.timezone.clone(),
            raw: Default::default(),
        }
    }
}

fn run_saved(name: &str, config: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let (_, config) = NrqlConfig::discover(config.map(PathBuf::as_path))?;
    let nrql = config.query(name)?.render()?;
    print_query(Some(name), &nrql, format)
}

fn list_saved(config: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let (path, config) = NrqlConfig::discover(config.map(PathBuf::as_path))?;

    let mut rendered = Vec::new();
    for name in config.queries.keys() {
        let nrql = config.query(name).and_then(|q| q.render());
        rendered.push((name.as_str(), nrql));
    }

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = rendered
                .iter()
                .map(|(name, nrql)| match nrql {
                    Ok(nrql) => serde_json::json!({ "name": name, "nrql": nrql }),
                    Err(e) => serde_json::json!({ "name": name, "error": e.to_string() }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "Saved queries in".dimmed(), path.display().to_string().cyan());
            if rendered.is_empty() {
                println!("{}", "(none)".dimmed());
            }
            for (name, nrql) in &rendered {
                match nrql {
                    Ok(nrql) => println!("  {} {}", name.yellow().bold(), nrql.white()),
                    Err(e) => println!("  {} {}", name.yellow().bold(), e.to_string().red()),
                }
            }
        }
    }
    Ok(())
}

/// Canonical query touching every clause but WITH TIMEZONE.
fn demo_query() -> Result<String> {
    let compare_from = chrono::Utc
        .with_ymd_and_hms(2015, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid demo timestamp"))?;

    let mut query = QueryBuilder::new();
    query
        .select(["userAgentName"])?
        .from(["PageView"])?
        .filter(r#"userAgentOS = "Windows""#)?
        .facet("countryCode")?
        .limit(20)?
        .since(Moment::ago(TimePeriod::days(4)))?
        .until(Moment::Yesterday)?
        .compare_with(Moment::exact(compare_from))?
        .time_series(Some(TimePeriod::hours(1)))?;

    Ok(query.render()?)
}

fn print_query(name: Option<&str>, nrql: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({ "name": name, "nrql": nrql });
            println!("{}", serde_json::to_string(&value)?);
        }
        OutputFormat::Text => println!("{}", nrql),
    }
    Ok(())
}

fn show_clauses() {
    println!("{}", "NRQL Clause Reference".cyan().bold());
    println!();

    let setters = [
        (Clause::Select, "--select a,b | --all", "required"),
        (Clause::From, "--from A,B", "required"),
        (Clause::Where, "--where EXPR", "verbatim"),
        (Clause::Facet, "--facet EXPR", "verbatim"),
        (Clause::Limit, "--limit N", ""),
        (Clause::Since, "--since MOMENT", ""),
        (Clause::Until, "--until MOMENT", ""),
        (Clause::CompareWith, "--compare-with MOMENT", "needs SINCE or UNTIL"),
        (Clause::TimeSeries, "--timeseries [PERIOD]", "AUTO when bare"),
        (Clause::WithTimeZone, "--timezone TZ", "verbatim"),
    ];

    println!(
        "{:16} {:26} {}",
        "Keyword".white().bold(),
        "Flag".white().bold(),
        "Notes".white().bold()
    );
    println!("{}", "─".repeat(64).dimmed());

    for (clause, flag, notes) in setters {
        println!(
            "{:16} {:26} {}",
            clause.keyword().cyan().bold(),
            flag.yellow(),
            notes.dimmed()
        );
    }

    println!();
    println!(
        "{} yesterday | <n> <unit> ago | YYYY-MM-DD[ HH:MM:SS]",
        "MOMENT:".white().bold()
    );
    let units: Vec<&str> = TimeUnit::ALL.iter().map(TimeUnit::as_str).collect();
    println!("{} {}", "UNITS:".white().bold(), units.join(", "));
}
