use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{EphemeralCache, HttpWordApi, Route, SnapshotCache, WordStore};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod views;

use config::{load_settings, normalize_cache_url, Settings};

#[derive(Parser, Debug)]
#[command(name = "vocab", about = "Read, collect and review vocabulary words")]
struct Cli {
    /// Word service base url (overrides vocab.toml and environment)
    #[arg(long)]
    api_base: Option<String>,
    /// Local cache database url or file path
    #[arg(long)]
    cache_db: Option<String>,
    /// Keep the word pool in memory only for this run
    #[arg(long)]
    no_cache: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the full word pool from the service
    Load,
    /// Show the locally cached word pool
    List,
    /// Create or update a word
    Add {
        word: String,
        #[arg(default_value = "")]
        definition: String,
    },
    /// Remove a word
    Delete { word: String },
    /// Pick a random word
    Random,
    /// Render the view bound to a path
    Open {
        #[arg(default_value = "/")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_base) = cli.api_base {
        settings.api_base = api_base;
    }
    if let Some(cache_db) = cli.cache_db {
        settings.cache_database_url = normalize_cache_url(&cache_db);
    }

    let store = open_store(&settings, cli.no_cache).await?;
    let outcome = dispatch(&store, cli.command).await;
    store.close().await.context("failed to flush word pool on exit")?;
    outcome
}

async fn open_store(settings: &Settings, no_cache: bool) -> Result<WordStore> {
    let api = match settings.request_timeout() {
        Some(timeout) => HttpWordApi::with_timeout(&settings.api_base, timeout)?,
        None => HttpWordApi::new(&settings.api_base)?,
    };

    let cache: Arc<dyn SnapshotCache> = if no_cache {
        Arc::new(EphemeralCache::default())
    } else {
        Arc::new(
            Storage::new(&settings.cache_database_url)
                .await
                .context("failed to open local cache")?,
        )
    };

    info!(api_base = %api.base_url(), no_cache, "opening word store");
    Ok(WordStore::open(Arc::new(api), cache, settings.cache_key.clone()).await)
}

async fn dispatch(store: &WordStore, command: Command) -> Result<()> {
    match command {
        Command::Load => {
            store.load_words().await?;
            println!("{}", views::render_pool(&store.words()));
        }
        Command::List => {
            println!("{}", views::render_pool(&store.words()));
        }
        Command::Add { word, definition } => {
            let stored = store.add_word(&word, &definition).await?;
            println!("{}", views::render_card(Some(&stored)));
        }
        Command::Delete { word } => {
            if store.delete_word(&word).await? {
                println!("deleted {word}");
            } else {
                println!("{word} was not in the local pool");
            }
        }
        Command::Random => {
            println!("{}", views::render_card(store.random_word().as_ref()));
        }
        Command::Open { path } => {
            let route = Route::resolve(&path);
            if route == Route::NotFound {
                bail!("no view is bound to path '{path}'");
            }
            let pick = match route {
                Route::Review => store.random_word(),
                _ => None,
            };
            println!("{}", views::render(route, &store.snapshot(), pick.as_ref()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
