use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use dailyreport::{Config, Report, ReportStore, Session, export, from_record, input, query};
use eyre::{Result, eyre};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "dailyreport")]
#[command(about = "Record, archive and export daily activity reports")]
#[command(version)]
struct Cli {
    /// Path to the store directory (default: from config, else the user data dir)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Config file (default: <config dir>/dailyreport/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and save a report
    Record {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Report day, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Arrival time, HH:MM
        #[arg(long)]
        arrival: String,

        /// Departure time, HH:MM
        #[arg(long)]
        departure: String,

        /// Task as "HH:MM-HH:MM|description[|problems]" (repeatable)
        #[arg(long = "task")]
        tasks: Vec<String>,

        /// Work planned for the next day
        #[arg(long, default_value = "")]
        planned: String,
    },

    /// List stored reports
    List {
        /// Only reports of this day, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print one report
    Show { id: i64 },

    /// Write one report to <YYYY-MM-DD>.txt
    Export {
        id: i64,

        /// Output directory (default: from config, else current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Rebuild the SQLite cache from the JSONL log
    Sync,
}

fn main() {
    // Setup tracing
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let store_path = cli.store_path.clone().unwrap_or_else(|| config.store_path());

    let mut store = ReportStore::open(&store_path)?;

    match cli.command {
        Commands::Record {
            first_name,
            last_name,
            date,
            arrival,
            departure,
            tasks,
            planned,
        } => {
            let day = date.unwrap_or_else(|| Utc::now().date_naive());
            let mut report = Report::new(day);
            report.first_name = first_name.or(config.first_name.clone()).unwrap_or_default();
            report.last_name = last_name.or(config.last_name.clone()).unwrap_or_default();
            report.arrival_time = Some(input::parse_clock(day, &arrival)?);
            report.departure_time = Some(input::parse_clock(day, &departure)?);
            report.tasks = tasks
                .iter()
                .map(|spec| input::parse_task(day, spec))
                .collect::<Result<Vec<_>>>()?;
            report.planned_tasks = planned;

            let mut session = Session::new(store, day);
            session.replace_current(report);
            let id = session.save()?;
            println!("{} (id = {})", "Report saved".green(), id);
        }
        Commands::List { date } => {
            let mut session = Session::new(store, Utc::now().date_naive());
            session.load()?;
            session.select_date(date);

            for rejected in session.rejected() {
                eprintln!("{} {}", "Warning:".yellow().bold(), rejected);
            }

            let reports = session.visible();
            if reports.is_empty() {
                println!("No reports found");
                return Ok(());
            }
            print_reports(&reports);

            if date.is_none() {
                let days: Vec<String> = query::dates(session.past()).iter().map(|d| d.to_string()).collect();
                println!("Days with reports: {}", days.join(", "));
            }
        }
        Commands::Show { id } => {
            let report = load_report(&store, id)?;
            print!("{}", export::render(&report));
        }
        Commands::Export { id, out } => {
            let report = load_report(&store, id)?;
            let dir = out.unwrap_or_else(|| config.export_dir());
            let path = export::write(&report, &dir)?;
            println!("{} {}", "Exported to".green(), path.display());
        }
        Commands::Sync => {
            println!("Syncing database from JSONL log...");
            let count = store.sync()?;
            println!("Sync complete ({} reports)", count);
        }
    }

    Ok(())
}

fn load_report(store: &ReportStore, id: i64) -> Result<Report> {
    let record = store.get(id)?.ok_or_else(|| eyre!("Report {} not found", id))?;
    Ok(from_record(record)?)
}

fn print_reports(reports: &[Report]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Arrival").add_attribute(Attribute::Bold),
            Cell::new("Departure").add_attribute(Attribute::Bold),
            Cell::new("Tasks").add_attribute(Attribute::Bold),
        ]);

    for r in reports {
        table.add_row(vec![
            Cell::new(r.id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::new(r.day()),
            Cell::new(r.full_name()),
            Cell::new(clock(r.arrival_time)),
            Cell::new(clock(r.departure_time)),
            Cell::new(r.tasks.len()),
        ]);
    }

    println!("{table}");
}

fn clock(value: Option<chrono::DateTime<Utc>>) -> String {
    value.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()
}
