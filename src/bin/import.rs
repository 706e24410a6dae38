// src/bin/import.rs
// DOCUMENTATION: Load the Pexels CSV export into the database
// PURPOSE: Idempotent seeding of photographers and photos
//
// Usage:
//   cargo run --bin import -- --file data/photos.csv --verbose
//   cargo run --bin import -- --seed-admin

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use photo_gallery_api::config::{self, Config};
use photo_gallery_api::services::{ImportService, ImportStats, DEMO_ADMIN_EMAIL};
use std::path::PathBuf;
use std::process;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Import Pexels photos from CSV
#[derive(Parser, Debug)]
#[command(name = "import")]
#[command(about = "Import photographers and photos from a Pexels CSV export")]
struct Cli {
    /// CSV file to import
    #[arg(short, long, env = "IMPORT_FILE", default_value = "data/photos.csv")]
    file: PathBuf,

    /// Log every created record
    #[arg(short, long)]
    verbose: bool,

    /// Create the demo admin account if it does not exist
    #[arg(long)]
    seed_admin: bool,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", if cli.verbose { "debug,sqlx=warn" } else { "info,sqlx=warn" });
    }
    env_logger::init();
    let config = Config::from_env();

    if let Err(e) = run(&cli, &config).await {
        eprintln!("{}❌ Import failed: {:#}{}", RED, e, RESET);
        process::exit(1);
    }
}

async fn run(cli: &Cli, config: &Config) -> Result<()> {
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    let pool = config::init_db_pool(config)
        .await
        .context("failed to connect to database")?;

    if config.run_migrations {
        config::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }

    if cli.seed_admin {
        let created = ImportService::seed_admin(&pool)
            .await
            .context("failed to seed admin user")?;
        if created {
            println!("{}✅ Created admin user {}{}", GREEN, DEMO_ADMIN_EMAIL, RESET);
        } else {
            println!("{}Admin user {} already exists{}", YELLOW, DEMO_ADMIN_EMAIL, RESET);
        }
    }

    println!("\n{}📥 Importing {}...{}", CYAN, cli.file.display(), RESET);
    let stats = ImportService::import_file(&pool, &cli.file, cli.verbose)
        .await
        .with_context(|| format!("could not import {}", cli.file.display()))?;

    print_summary(&stats);
    Ok(())
}

fn print_summary(stats: &ImportStats) {
    println!("\n{}📋 Import Summary{}", BOLD, RESET);
    println!("────────────────────────────────────────");
    println!("  • Photographers created: {}{}{}", GREEN, stats.photographers_created, RESET);
    println!("  • Photographers found:   {}", stats.photographers_found);
    println!("  • Photos created:        {}{}{}", GREEN, stats.photos_created, RESET);
    println!("  • Photos found:          {}", stats.photos_found);
    println!("  • Duration:              {}s", stats.duration_seconds);

    if stats.errors.is_empty() {
        println!("\n{}✨ Import completed without errors{}", GREEN, RESET);
        return;
    }

    println!("\n{}⚠️  {} rows failed:{}", YELLOW, stats.errors.len(), RESET);
    for row in &stats.errors {
        println!(
            "  - pexels_id {}: {}",
            row.pexels_id.as_deref().unwrap_or("?"),
            row.error
        );
    }
}
