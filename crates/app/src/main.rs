use std::{path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser, error::ErrorKind};
use engine::{Boi, Engine, Registry, parse_ledger, render_ledger, synthesize};
use migration::{Migrator, MigratorTrait};

use error::{AppError, Result};
use settings::{Database, Settings};

mod dates;
mod error;
mod present;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "bois")]
#[command(about = "Who owes whom in the group, and why")]
pub struct Cli {
    /// Participant to report on. Without it nothing is printed.
    pub boi: Option<String>,
    /// Only consider transactions of this day (`today`, `ayer`, `3 days ago`,
    /// `-2`, `2024-01-31`, ...).
    #[arg(short, long)]
    pub date: Option<String>,
    /// Write the synthesized ledger text to disk.
    #[arg(long)]
    pub keepdb: bool,
    /// Colored output.
    #[arg(long)]
    pub color: bool,
    /// Report whom the participant owes instead of who owes them.
    #[arg(long)]
    pub debts: bool,
    /// Collapse mutual debts into one net amount per pair.
    #[arg(long, conflicts_with = "debts")]
    pub net: bool,
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Registry JSON file.
    #[arg(long)]
    pub registry: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match settings::load(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("bois: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "bois={level},engine={level}",
            level = settings.level
        ))
        .init();

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Usage(err)) => err.exit(),
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("bois: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let Some(name) = cli.boi.as_deref() else {
        return Ok(());
    };
    let date = cli
        .date
        .as_deref()
        .map(|input| dates::parse(input, chrono::Local::now().date_naive()))
        .transpose()?;

    let registry = Registry::from_path(&settings.registry)?;
    let boi = known_boi(&registry, name)?;

    let entries = synthesize(&registry)?;
    let text = render_ledger(&entries);
    if cli.keepdb {
        std::fs::write(&settings.ledger_path, &text)?;
        tracing::info!(
            path = %settings.ledger_path.display(),
            entries = entries.len(),
            "ledger written"
        );
    }
    let entries = parse_ledger(&text)?;

    let db = connect(&settings.database).await?;
    let engine = Engine::builder().database(db).build().await?;
    engine.load(&entries).await?;

    let style = present::Style {
        color: settings.color,
    };
    let lines = if cli.debts {
        present::debts(&boi, &engine.debts(&boi, date).await?, style)
    } else if cli.net {
        let lines = engine.net_balances(&boi, &registry.bois, date).await?;
        present::balances(&boi, &lines, style)
    } else {
        present::balances(&boi, &engine.balances(&boi, date).await?, style)
    };
    for line in lines {
        println!("{line}");
    }

    Ok(())
}

/// The registry participant called `name`, or a usage error listing the
/// known ones.
fn known_boi(registry: &Registry, name: &str) -> std::result::Result<Boi, clap::Error> {
    registry.boi(name).cloned().map_err(|_| {
        let known: Vec<&str> = registry.bois.iter().map(Boi::name).collect();
        Cli::command().error(
            ErrorKind::InvalidValue,
            format!("unknown boi '{name}' (known: {})", known.join(", ")),
        )
    })
}

async fn connect(config: &Database) -> Result<sea_orm::DatabaseConnection> {
    let database = sea_orm::Database::connect(config.url()).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!(url = %config.url(), "ledger store ready");
    Ok(database)
}
