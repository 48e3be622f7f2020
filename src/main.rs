use anyhow::Result;
use clap::{Parser, Subcommand};

use storefront_migrate::{config, db, MigrateError, Runner, StepRegistry};

#[derive(Parser)]
#[command(
    name = "migrate",
    about = "Schema evolution runner for the storefront catalog database",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending steps in ascending version order
    Up {
        /// Stop after this version (inclusive)
        #[arg(long, value_name = "VERSION")]
        to: Option<String>,
    },
    /// Revert applied steps in descending version order
    Down {
        /// Keep this version and everything before it; omit to revert all
        #[arg(long, value_name = "VERSION")]
        to: Option<String>,
    },
    /// List applied and pending steps
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    config::init_tracing(&cfg.log_level, cfg.log_json);

    let conn = db::connect(&db::DbConfig::from(&cfg)).await?;
    let runner = Runner::new(conn, StepRegistry::builtin()?);

    let outcome = match cli.command {
        Commands::Up { to } => runner.up(to.as_deref()).await.map(|applied| {
            println!("applied {applied} step(s)");
        }),
        Commands::Down { to } => runner.down(to.as_deref()).await.map(|reverted| {
            println!("reverted {reverted} step(s)");
        }),
        Commands::Status => runner.status().await.map(print_status),
    };

    if let Err(err) = outcome {
        eprintln!("{}", failure_line(&err));
        std::process::exit(1);
    }
    Ok(())
}

fn print_status(status: storefront_migrate::runner::MigrationStatus) {
    println!("applied ({}):", status.applied.len());
    for entry in &status.applied {
        println!("  {}  {}", entry.version_id, entry.applied_at.to_rfc3339());
    }
    println!("pending ({}):", status.pending.len());
    for step in &status.pending {
        println!("  {}  {}", step.version_id, step.description);
    }
}

/// The single operator-facing failure line; the fmt layer already writes the
/// structured log, so nothing else goes to stderr.
fn failure_line(err: &MigrateError) -> String {
    match err.version_id() {
        Some(version_id) => format!("migration failed at {version_id}: {err}"),
        None => format!("migration failed: {err}"),
    }
}
