//! CLI binary for wwise-id-finder.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wwise_id_finder::render::render_page;
use wwise_id_finder::{AppConfig, ConfigOverrides, Shell};
use wwise_search::backends::{check_bank_directory, check_project_directory};
use wwise_search::{Dispatcher, IdTypeFilter, SearchRequest, Source};

/// Find Wwise objects by GUID, ShortID or MediaID.
#[derive(Parser)]
#[command(name = "wwise-id-finder", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wwise project directory (contains the .wproj).
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Generated SoundBank directory (contains SoundbanksInfo).
    #[arg(long, global = true)]
    bank_dir: Option<PathBuf>,

    /// WAAPI host.
    #[arg(long, global = true)]
    host: Option<String>,

    /// WAAPI port.
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Search one source for an identifier.
    Search {
        /// project, waapi or bank.
        #[arg(short, long)]
        source: Source,

        /// Identifier kinds to match (GUID, ShortID, MediaID).
        #[arg(short = 't', long = "type", value_delimiter = ',')]
        types: Vec<String>,

        /// Page to print.
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        /// The identifier to look up.
        id: String,
    },

    /// Test the WAAPI connection.
    Probe,

    /// Check the configured project and bank directories.
    Check,

    /// Interactive session (default).
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("wwise_id_finder=info,wwise_search=info")
        }))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply(&ConfigOverrides {
        project: cli.project_dir,
        bank: cli.bank_dir,
        host: cli.host,
        port: cli.port,
    });

    match cli.command.unwrap_or(Command::Shell) {
        Command::Search {
            source,
            types,
            page,
            id,
        } => run_search(config, source, &types, page, &id).await,
        Command::Probe => run_probe(config).await,
        Command::Check => run_check(&config),
        Command::Shell => run_shell(config).await,
    }
}

async fn run_search(
    config: AppConfig,
    source: Source,
    types: &[String],
    page: i64,
    id: &str,
) -> anyhow::Result<()> {
    let filters = if types.is_empty() {
        IdTypeFilter::all().iter().copied().collect()
    } else {
        IdTypeFilter::parse_tags(types)
    };
    let request = SearchRequest::new(source, id, filters);

    let mut ctx = config.into_context();
    Dispatcher::local().search(&mut ctx, &request).await?;

    let state = ctx.page_mut(source);
    state.set_page(page);
    print!("{}", render_page(state));
    Ok(())
}

async fn run_probe(config: AppConfig) -> anyhow::Result<()> {
    let info = Dispatcher::local().probe(&config.sources).await?;
    println!("{}", info.summary());
    Ok(())
}

fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    let mut failures = 0;

    match config.sources.project.path.as_deref() {
        Some(path) => match check_project_directory(path) {
            Ok(()) => println!("project: ok ({})", path.display()),
            Err(e) => {
                println!("project: {e}");
                failures += 1;
            }
        },
        None => println!("project: not configured"),
    }

    match config.sources.bank.path.as_deref() {
        Some(path) => match check_bank_directory(path) {
            Ok(()) => println!("bank: ok ({})", path.display()),
            Err(e) => {
                println!("bank: {e}");
                failures += 1;
            }
        },
        None => println!("bank: not configured"),
    }

    let waapi = &config.sources.waapi;
    println!("waapi: {}:{}", waapi.host, waapi.port);

    if failures > 0 {
        bail!("{failures} directory check(s) failed");
    }
    Ok(())
}

async fn run_shell(config: AppConfig) -> anyhow::Result<()> {
    println!("wwise-id-finder v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands.");

    let mut shell = Shell::new(Dispatcher::local(), config.into_context());
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell
        .run(stdin, &mut std::io::stdout(), &mut std::io::stderr())
        .await?;
    Ok(())
}
