//! Aurora Protocol - Development Tools

use std::path::PathBuf;

use aurora_core::content::ContentTables;
use aurora_core::prelude::PlayerRole;
use aurora_tools::validate::{export_builtin, validate_builtin, validate_path};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aurora-tools")]
#[command(about = "Development tools for Aurora Protocol")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate content files (the built-in tables when no path is given)
    Validate {
        /// Content RON file or directory of them
        path: Option<PathBuf>,
    },
    /// Write the built-in tables to a RON file
    Export {
        /// Output file
        #[arg(default_value = "content.ron")]
        output: PathBuf,
    },
    /// List abilities, items and enemies of a content file
    List {
        /// Content RON file (defaults to the built-in tables)
        path: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            let reports = match path {
                Some(path) => {
                    tracing::info!("Validating content in: {}", path.display());
                    match validate_path(&path) {
                        Ok(reports) => reports,
                        Err(e) => {
                            tracing::error!("Validation failed: {e}");
                            std::process::exit(1);
                        }
                    }
                }
                None => vec![validate_builtin()],
            };

            let mut failed = false;
            for report in &reports {
                if report.is_valid() {
                    println!("OK    {}", report.label());
                } else {
                    failed = true;
                    println!("FAIL  {}", report.label());
                    for error in &report.errors {
                        println!("      - {error}");
                    }
                }
            }
            if failed {
                std::process::exit(1);
            }
        }
        Commands::Export { output } => {
            if let Err(e) = export_builtin(&output) {
                tracing::error!("Export failed: {e}");
                std::process::exit(1);
            }
            println!("Wrote {}", output.display());
        }
        Commands::List { path } => {
            let tables = match path {
                Some(path) => match ContentTables::load(&path) {
                    Ok(tables) => tables,
                    Err(e) => {
                        tracing::error!("Cannot load {}: {e}", path.display());
                        std::process::exit(1);
                    }
                },
                None => ContentTables::builtin().clone(),
            };
            print_tables(&tables);
        }
    }
}

fn print_tables(tables: &ContentTables) {
    for (title, role) in [
        ("Offensive abilities", PlayerRole::Offense),
        ("Defensive abilities", PlayerRole::Defense),
    ] {
        println!("{title}:");
        for ability in tables.abilities_for_role(role) {
            println!(
                "  {:<18} cost {:>3}  cooldown {}{}",
                ability.name,
                ability.energy_cost,
                ability.cooldown,
                if ability.ultimate { "  [ultimate]" } else { "" }
            );
        }
    }
    println!("Items:");
    for item in tables.items() {
        println!("  {:<18} {}", item.name, item.description);
    }
    println!("Enemies:");
    for (round, enemy) in tables.enemies.iter().enumerate() {
        println!(
            "  {}. {:<18} hp {:>3}  def {:>2}  dmg {}-{}",
            round + 1,
            enemy.name,
            enemy.health,
            enemy.defense,
            enemy.damage.min,
            enemy.damage.max
        );
    }
}
