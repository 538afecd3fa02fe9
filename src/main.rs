// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod api;
mod config;
mod db;
mod error;
mod models;
mod settings;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dotenvy::dotenv;
use futures::future::try_join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{ExchangeRateClient, RateSource};
use crate::config::Config;
use crate::db::SqliteStore;
use crate::models::{CurrencyRecord, FavoritesStore};

#[derive(Parser)]
#[command(name = "currency-converter", version, about = "Currency converter with live exchange rates and favorites")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Popular currencies and your favorites
    Home,
    /// Convert an amount from one currency into one or more others
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Source currency code (defaults to the first catalog entry)
        #[arg(short, long)]
        from: Option<String>,
        /// Target currency code, repeatable (defaults to the second catalog entry)
        #[arg(short, long)]
        to: Vec<String>,
        /// Exchange the source and the first target
        #[arg(long)]
        swap: bool,
    },
    /// Currency information and its current exchange rates
    Detail {
        code: String,
        /// Write the rate table to output/ as CSV
        #[arg(long)]
        export: bool,
    },
    /// Manage favorite currencies
    Favorites {
        #[command(subcommand)]
        action: FavoriteAction,
    },
    /// Show or change user settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Write the effective configuration to a file
    InitConfig {
        #[arg(default_value = "config.toml")]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    List,
    Add { code: String },
    Remove { code: String },
    /// Add the currency if it is not a favorite, remove it otherwise
    Toggle { code: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    /// Set dark-mode, notifications or auto-update to true/false
    Set {
        key: String,
        #[arg(action = ArgAction::Set)]
        value: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = config::load_config()?;

    match cli.command.unwrap_or(Commands::Home) {
        Commands::Home => show_home(&config).await?,
        Commands::Convert {
            amount,
            from,
            to,
            swap,
        } => convert_amount(&config, amount, from, to, swap).await?,
        Commands::Detail { code, export } => show_detail(&config, &code, export).await?,
        Commands::Favorites { action } => manage_favorites(&config, action).await?,
        Commands::Settings { action } => manage_settings(action.unwrap_or(SettingsAction::Show))?,
        Commands::InitConfig { path } => {
            config::save_config(&config, &path)?;
            println!("✅ Configuration written to {}", path.display());
        }
    }

    Ok(())
}

async fn open_favorites(config: &Config) -> Result<FavoritesStore<SqliteStore>> {
    let pool = db::create_db_pool(&config.storage.database_url)
        .await
        .with_context(|| format!("Failed to open {}", config.storage.database_url))?;

    Ok(FavoritesStore::new(SqliteStore::new(pool))
        .with_duplicate_policy(config.favorites.duplicate_policy)
        .with_corrupt_read_policy(config.favorites.on_corrupt))
}

fn lookup_currency(code: &str) -> Result<CurrencyRecord> {
    let code = code.trim().to_uppercase();
    match models::find_currency(&code) {
        Some(record) => Ok(record),
        None => bail!("Unknown currency code: {}", code),
    }
}

fn spinner(message: String) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn print_currency(record: &CurrencyRecord) {
    println!("  {} {:<20} {}", record.flag, record.name, record.code);
}

async fn show_home(config: &Config) -> Result<()> {
    let settings = settings::load_settings()?;
    let favorites = open_favorites(config).await?.list_favorites().await?;

    println!("💱 Currency Converter\n");

    println!("Favorites");
    if favorites.is_empty() {
        println!("  No favorites yet, add one with `favorites add <CODE>`");
    } else if settings.auto_update {
        let (base, _) = models::default_pair();
        let client = ExchangeRateClient::from_config(&config.api);
        let progress = spinner(format!("Fetching {} rates...", base.code));
        let table = client.fetch_rates(&base.code).await;
        progress.finish_and_clear();

        match table {
            Ok(table) => {
                for favorite in &favorites {
                    match table.rate(&favorite.code) {
                        Ok(rate) => println!(
                            "  {} {:<20} {}  1 {} = {:.4}",
                            favorite.flag, favorite.name, favorite.code, base.code, rate
                        ),
                        Err(_) => print_currency(favorite),
                    }
                }
            }
            Err(e) => {
                log::warn!("Showing favorites without rates: {}", e);
                favorites.iter().for_each(print_currency);
            }
        }
    } else {
        favorites.iter().for_each(print_currency);
    }

    println!("\nPopular Currencies");
    models::catalog().iter().for_each(print_currency);

    Ok(())
}

/// Normalise the requested codes, fill in the default pair and apply `--swap`,
/// which exchanges the source with the first target.
fn resolve_conversion(from: Option<String>, to: Vec<String>, swap: bool) -> (String, Vec<String>) {
    let (default_from, default_to) = models::default_pair();
    let mut from = from
        .map(|code| code.trim().to_uppercase())
        .unwrap_or(default_from.code);
    let mut targets: Vec<String> = to.iter().map(|code| code.trim().to_uppercase()).collect();
    if targets.is_empty() {
        targets.push(default_to.code);
    }
    if swap {
        std::mem::swap(&mut from, &mut targets[0]);
    }
    (from, targets)
}

async fn convert_amount(
    config: &Config,
    amount: f64,
    from: Option<String>,
    to: Vec<String>,
    swap: bool,
) -> Result<()> {
    if !amount.is_finite() {
        bail!("Amount must be a number");
    }

    let (from, targets) = resolve_conversion(from, to, swap);

    let client = ExchangeRateClient::from_config(&config.api);
    let progress = ProgressBar::new(targets.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    progress.set_message(format!("Converting from {}", from));

    let conversions = targets.iter().map(|target| {
        let (client, progress, from) = (&client, &progress, &from);
        async move {
            let value = models::convert(client, amount, from, target).await;
            progress.inc(1);
            value.map(|value| (target.as_str(), value))
        }
    });
    let results = try_join_all(conversions).await;
    progress.finish_and_clear();

    for (target, value) in results? {
        println!("{:.2} {} = {:.2} {}", amount, from, value, target);
    }

    Ok(())
}

async fn show_detail(config: &Config, code: &str, export: bool) -> Result<()> {
    let currency = lookup_currency(code)?;
    let favorites = open_favorites(config).await?;
    let is_favorite = favorites.is_favorite(&currency.code).await?;

    println!(
        "{} {} {}",
        currency.flag,
        currency.name,
        if is_favorite { "★" } else { "☆" }
    );
    println!("\nCurrency Information");
    println!("  Code:   {}", currency.code);
    println!("  Symbol: {}", currency.symbol);

    let client = ExchangeRateClient::from_config(&config.api);
    let progress = spinner(format!("Fetching {} rates...", currency.code));
    let table = client.fetch_rates(&currency.code).await;
    progress.finish_and_clear();

    let table = match table {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error loading rates for {}: {}", currency.code, e);
            return Ok(());
        }
    };

    println!("\nExchange Rates");
    if let Some(date) = table.date() {
        println!("  As of {}", date);
    }
    for (code, rate) in &table.rates {
        println!("  {:<6}{:>16.4}", code, rate);
    }

    if export {
        let path = models::export_rates_csv(&table, &currency.code, Path::new("output"))?;
        println!("\n📁 CSV file created: {}", path.display());
    }

    Ok(())
}

async fn manage_favorites(config: &Config, action: FavoriteAction) -> Result<()> {
    let favorites = open_favorites(config).await?;

    match action {
        FavoriteAction::List => {
            let list = favorites.list_favorites().await?;
            if list.is_empty() {
                println!("No favorites yet");
            }
            list.iter().for_each(print_currency);
        }
        FavoriteAction::Add { code } => {
            let currency = lookup_currency(&code)?;
            favorites.add_favorite(&currency).await?;
            println!("⭐ {} added to favorites", currency.code);
        }
        FavoriteAction::Remove { code } => {
            let code = code.trim().to_uppercase();
            match favorites.remove_favorite(&code).await? {
                0 => println!("{} is not a favorite", code),
                _ => println!("✅ {} removed from favorites", code),
            }
        }
        FavoriteAction::Toggle { code } => {
            let currency = lookup_currency(&code)?;
            if favorites.toggle_favorite(&currency).await? {
                println!("⭐ {} added to favorites", currency.code);
            } else {
                println!("✅ {} removed from favorites", currency.code);
            }
        }
    }

    Ok(())
}

fn manage_settings(action: SettingsAction) -> Result<()> {
    let mut current = settings::load_settings()?;

    match action {
        SettingsAction::Show => {
            println!("Settings\n");
            for (key, description, value) in current.entries() {
                println!("  {:<14} {:<5} {}", key, value, description);
            }
            println!("\n  Version        {}", env!("CARGO_PKG_VERSION"));
        }
        SettingsAction::Set { key, value } => {
            current.set(&key, value)?;
            settings::save_settings(&current)?;
            println!("✅ {} set to {}", key, value);
        }
    }

    Ok(())
}
