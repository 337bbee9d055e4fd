// Copyright 2026 Montax Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use montax::cli::{inspect_cmd, search_cmd};
use montax::logging;
use montax::query::{CommonParams, SearchQuery};

#[derive(Parser)]
#[command(
    name = "montax",
    about = "Montax — search public tax records from the Monongalia County tax portal",
    version,
    after_help = "Run 'montax <command> --help' for details on each search mode.\n\
                  Raw responses are kept under logs/ and can be re-read with 'montax inspect'."
)]
struct Cli {
    /// Portal domain to search
    #[arg(long, default_value = "monongalia.softwaresystems.com")]
    domain: String,

    /// Full search URL (overrides --domain; gains /SEARCH.html if missing)
    #[arg(long, short = 'u')]
    url: Option<String>,

    /// Output file for results (.txt, .csv, .json, .xlsx)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long = "verbose", short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// User agent string to send with requests
    #[arg(
        long,
        default_value = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/91.0.4472.124 Safari/537.36"
    )]
    user_agent: String,

    /// Maximum number of pages to retrieve (default: all)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Limit search to a specific tax year
    #[arg(long)]
    limit_year: Option<String>,

    /// Property type: B=Both, R=Real, P=Personal
    #[arg(long, default_value = "B", value_parser = ["B", "R", "P"])]
    prop_type: String,

    /// Payment status: B=Both, P=Paid, U=Unpaid
    #[arg(long, default_value = "B", value_parser = ["B", "P", "U"])]
    status: String,

    /// Filter by district code (e.g. 01, 02)
    #[arg(long)]
    district: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search by taxpayer name ("last first")
    Name {
        /// Taxpayer name, last name first
        name: String,
    },
    /// Search by account number
    Account {
        /// Taxpayer account number
        account: String,
    },
    /// Search by tax year and ticket number
    Ticket {
        /// Tax year (4 digits)
        year: String,
        /// Ticket number
        ticket: String,
        /// Ticket suffix (optional)
        #[arg(long, short = 's', default_value = "")]
        suffix: String,
    },
    /// Search by district/map/parcel
    Map {
        /// District code
        #[arg(long, default_value = "")]
        district: String,
        /// Map number
        #[arg(long, default_value = "")]
        map: String,
        /// Parcel number
        #[arg(long, default_value = "")]
        parcel: String,
        /// Sub-parcel number
        #[arg(long, default_value = "")]
        subparcel: String,
    },
    /// Inspect a saved response artifact (newest if none given)
    Inspect {
        /// Artifact path (defaults to the newest under logs/)
        file: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Inspect and completions never touch the network or the log file.
    match &cli.command {
        Commands::Inspect { file } => {
            let result = inspect_cmd::run(file.clone());
            if let Err(e) = &result {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
            return result;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "montax", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    logging::init(cli.verbose, std::path::Path::new("logs"))?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "montax started");

    let query = match &cli.command {
        Commands::Name { name } => SearchQuery::Name { name: name.clone() },
        Commands::Account { account } => SearchQuery::Account {
            account: account.clone(),
        },
        Commands::Ticket {
            year,
            ticket,
            suffix,
        } => SearchQuery::Ticket {
            year: year.clone(),
            ticket: ticket.clone(),
            suffix: suffix.clone(),
        },
        Commands::Map {
            district,
            map,
            parcel,
            subparcel,
        } => SearchQuery::MapParcel {
            district: district.clone(),
            map: map.clone(),
            parcel: parcel.clone(),
            sub_parcel: subparcel.clone(),
        },
        Commands::Inspect { .. } | Commands::Completions { .. } => unreachable!(),
    };

    let common = CommonParams {
        limit_year: cli.limit_year.clone(),
        prop_type: Some(cli.prop_type.clone()),
        status: Some(cli.status.clone()),
        district: cli.district.clone(),
    };

    let args = search_cmd::RunArgs {
        domain: cli.domain.clone(),
        url: cli.url.clone(),
        output: cli.output.clone(),
        timeout_secs: cli.timeout,
        user_agent: cli.user_agent.clone(),
        max_pages: cli.max_pages,
        quiet: cli.quiet,
    };

    let result = search_cmd::run(query, common, args).await;

    // Consistent exit codes: 0 = ran to completion (including "no records"
    // and "search failed" outcomes), 1 = unexpected internal fault.
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        eprintln!("For more details, check the log files in the 'logs' directory.");
        std::process::exit(1);
    }

    result
}
