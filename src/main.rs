mod cli;
mod config;
mod engine;
mod error;
mod loader;
mod models;
mod utils;
mod web;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{format_companies, format_years, resolve_company, Menu};
use crate::config::AppConfig;
use crate::engine::query::{parse_year_input, QueryKind};
use crate::engine::QueryEngine;
use crate::web::AppState;

#[derive(Parser)]
#[command(name = "finquery", about = "Predefined queries over company financials", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// CSV file to load (overrides data.csv_path)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive numbered menu (default)
    Menu,

    /// Answer one query: revenue, income_change, highest_revenue, profit_margin, cash_flow
    Query {
        kind: QueryKind,

        #[arg(short, long)]
        company: Option<String>,

        #[arg(short, long)]
        year: Option<String>,
    },

    /// List companies in first-appearance order
    Companies,

    /// List fiscal years, ascending
    Years,

    /// Show dataset statistics
    Stats,

    /// Run the web front end
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "finquery=info,warn",
        1 => "finquery=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(path) = cli.data {
        config.data.csv_path = path;
    }

    let engine = match QueryEngine::load(&config.data.csv_path) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to load financial data: {}", e);
            return Err(e)
                .with_context(|| format!("Cannot start without {:?}", config.data.csv_path));
        }
    };
    if engine.table().is_empty() {
        warn!(
            "{:?} has no usable rows; every query will report missing data",
            config.data.csv_path
        );
    } else {
        info!("Financial data loaded from {:?}", config.data.csv_path);
    }

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = io::stdin();
            Menu::new(&engine, stdin.lock(), io::stdout()).run()?;
        }

        Command::Query { kind, company, year } => {
            let company = company.map(|c| resolve_company(&c, &engine.available_companies()));
            let answer = match year.as_deref().map(parse_year_input).transpose() {
                Ok(year) => engine.dispatch(kind, company.as_deref(), year.flatten()),
                Err(e) => e.to_string(),
            };
            println!("{}", answer);
        }

        Command::Companies => println!("{}", format_companies(&engine.available_companies())),

        Command::Years => println!("{}", format_years(&engine.available_years())),

        Command::Stats => {
            let table = engine.table();
            let years = engine.available_years();
            println!("─────────────────────────────────");
            println!("  finquery — Dataset Stats");
            println!("─────────────────────────────────");
            println!("  Rows      : {}", utils::fmt_number(table.len() as i64));
            println!("  Companies : {}", engine.available_companies().len());
            let bound = |y: Option<&i32>| y.map(|y| y.to_string()).unwrap_or("—".into());
            println!("  From      : {}", bound(years.first()));
            println!("  To        : {}", bound(years.last()));
            println!("  Source    : {}", table.source.display());
            println!("  Loaded    : {}", table.loaded_at.format("%Y-%m-%d %H:%M:%S"));
            println!("─────────────────────────────────");
        }

        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let addr = config.server.socket_addr()?;
            web::serve(AppState::new(engine), addr).await?;
        }
    }

    Ok(())
}
