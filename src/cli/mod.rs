use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::export::{self, csv::CsvSection};
use crate::server;
use crate::services::{AggregationService, PeriodSpec};
use crate::store::{HttpReportStore, JsonlReportStore};
use crate::types::Result;

/// Monthly labor, material and subcontractor totals from daily reports
#[derive(Parser)]
#[command(name = "nippo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding reports/**/*.jsonl and projects.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the daily-report service (overrides --data-dir)
    #[arg(long, global = true)]
    store_url: Option<String>,

    /// Config file (default: ~/.nippo/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate one period and print it
    Aggregate(AggregateArgs),

    /// Run the HTTP service
    Serve {
        /// Listen address (default from config, then 127.0.0.1:8080)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
struct AggregateArgs {
    /// Months relative to the current month (-1 = last month)
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["start", "end"])]
    offset: Option<i32>,

    /// First day of an explicit range (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Last day of an explicit range (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Restrict to one project
    #[arg(long)]
    project: Option<String>,

    /// Output as JSON
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output one section as CSV
    #[arg(long, value_enum)]
    csv: Option<CsvSection>,

    /// Show only the N most expensive materials
    #[arg(long)]
    top: Option<usize>,
}

impl AggregateArgs {
    fn period_spec(&self) -> PeriodSpec {
        match (self.start, self.end) {
            (Some(start), Some(end)) => PeriodSpec::Range { start, end },
            _ => PeriodSpec::Offset(self.offset.unwrap_or(0)),
        }
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = self.resolve_config()?;
        match self.command {
            Commands::Aggregate(args) => run_aggregate(&config, &args),
            Commands::Serve { bind } => run_serve(&config, bind),
        }
    }

    /// Config file, then environment, then flags
    fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::resolve(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(url) = &self.store_url {
            config.store_url = Some(url.clone());
        }
        Ok(config)
    }
}

/// Pick the store named by `config`: the HTTP service when a URL is set,
/// otherwise the JSONL directory (per-tenant subdirectory when a tenant is set)
pub fn build_service(config: &Config) -> Result<AggregationService> {
    let tenant = config
        .tenant
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match &config.store_url {
        Some(url) => {
            let store =
                Arc::new(HttpReportStore::new(url)?.with_tenant(tenant.map(str::to_string)));
            Ok(AggregationService::new(store.clone(), store))
        }
        None => {
            let mut dir = config.data_dir()?;
            if let Some(tenant) = tenant {
                dir = dir.join(tenant);
            }
            let store = Arc::new(JsonlReportStore::with_data_dir(dir));
            Ok(AggregationService::new(store.clone(), store))
        }
    }
}

fn run_aggregate(config: &Config, args: &AggregateArgs) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let result = service.run(args.period_spec(), args.project.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(section) = args.csv {
        print!("{}", export::csv::to_csv(&result, section)?);
    } else {
        print!("{}", export::text::render(&result, args.top));
    }
    Ok(())
}

fn run_serve(config: &Config, bind: Option<String>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| config.bind.clone());
    // The blocking HTTP client must be created outside the async runtime
    let service = build_service(config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(service, &bind))?;
    Ok(())
}
