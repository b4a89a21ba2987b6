//! Binary entrypoint for the questledger CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and seed the catalog
//! - `seed` - seed any empty catalog collection (from `seed.dir` when set)
//! - `status` - document counts per collection
//! - `character`, `update-character` - read or patch a player's character
//! - `inventory`, `use`, `equip` - inventory and gear
//! - `enemies`, `quests`, `complete` - catalog enemies and quest progress
//! - `shop`, `buy`, `sell` - commerce
//!
//! Every command prints its result as JSON. Rejected operations print an
//! error object with the matching HTTP status to stderr and exit with 2.
//!
//! See the library crate docs for module-level details: `questledger::`.
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, error, info};
use serde::Serialize;

use questledger::config::Config;
use questledger::game::{
    self, CharacterUpdate, Collection, GameError, GameStore, GameStoreBuilder, SeedSource,
};
use questledger::metrics;

#[derive(Parser)]
#[command(name = "questledger")]
#[command(about = "Persistent game state and commerce for a browser RPG")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file and seed the catalog
    Init,
    /// Seed empty catalog collections
    Seed,
    /// Show document counts per collection
    Status,
    /// Show a player's character, creating it on first access
    Character { player: String },
    /// Patch a player's character
    UpdateCharacter {
        player: String,
        /// Full patch as JSON (camelCase fields); flags below override it
        #[arg(long)]
        json: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        level: Option<u32>,
        #[arg(long)]
        experience: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        gold: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        health: Option<i32>,
        #[arg(long, allow_hyphen_values = true)]
        mana: Option<i32>,
    },
    /// Show a player's inventory joined with item details
    Inventory { player: String },
    /// Use a consumable
    Use {
        player: String,
        item: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Equip an item into its slot
    Equip { player: String, item: String },
    /// List catalog enemies
    Enemies,
    /// List a player's quests
    Quests { player: String },
    /// Complete an active quest and collect its reward
    Complete { player: String, quest: String },
    /// List the items the shop sells
    Shop,
    /// Buy items from the shop
    Buy {
        player: String,
        item: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Sell items back to the shop
    Sell {
        player: String,
        item: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    db_path: String,
    items: usize,
    enemies: usize,
    quests: usize,
    characters: usize,
    inventories: usize,
    player_quests: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        info!("Initializing new questledger configuration");
        Config::create_default(&cli.config).await?;
        info!("Configuration file created at {}", cli.config);
        let config = Config::load(&cli.config).await?;
        let store = open_store(&config, false)?;
        let report = store.ensure_seeded(&seed_source(&config));
        return print_json(&report);
    }

    let config = Config::load(&cli.config)
        .await
        .unwrap_or_else(|e| {
            eprintln!("{}; using defaults", e);
            Config::default()
        });
    init_logging(&Some(config.clone()), cli.verbose);

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Seed => {
            let store = open_store(&config, false)?;
            let report = store.ensure_seeded(&seed_source(&config));
            print_json(&report)
        }
        Commands::Status => {
            let store = open_store(&config, false)?;
            let status = Status {
                db_path: config.db_path().display().to_string(),
                items: store.count(Collection::Items)?,
                enemies: store.count(Collection::Enemies)?,
                quests: store.count(Collection::Quests)?,
                characters: store.count(Collection::Characters)?,
                inventories: store.count(Collection::Inventories)?,
                player_quests: store.count(Collection::PlayerQuests)?,
            };
            print_json(&status)
        }
        Commands::Character { player } => {
            let store = open_store(&config, true)?;
            emit(game::character::get(&store, &player))
        }
        Commands::UpdateCharacter {
            player,
            json,
            name,
            level,
            experience,
            gold,
            health,
            mana,
        } => {
            let mut updates: CharacterUpdate = match json {
                Some(raw) => serde_json::from_str(&raw).context("Invalid character patch")?,
                None => CharacterUpdate::default(),
            };
            updates.name = name.or(updates.name);
            updates.level = level.or(updates.level);
            updates.experience = experience.or(updates.experience);
            updates.gold = gold.or(updates.gold);
            updates.health = health.or(updates.health);
            updates.mana = mana.or(updates.mana);
            let store = open_store(&config, true)?;
            emit(game::character::update(&store, &player, &updates))
        }
        Commands::Inventory { player } => {
            let store = open_store(&config, true)?;
            emit(game::inventory::get(&store, &player))
        }
        Commands::Use {
            player,
            item,
            quantity,
        } => {
            let store = open_store(&config, true)?;
            emit(game::items::use_consumable(&store, &player, &item, quantity))
        }
        Commands::Equip { player, item } => {
            let store = open_store(&config, true)?;
            emit(game::items::equip(&store, &player, &item))
        }
        Commands::Enemies => {
            let store = open_store(&config, true)?;
            emit(store.list_enemies())
        }
        Commands::Quests { player } => {
            let store = open_store(&config, true)?;
            emit(game::quest::list_for_player(&store, &player))
        }
        Commands::Complete { player, quest } => {
            let store = open_store(&config, true)?;
            emit(game::quest::complete(&store, &player, &quest))
        }
        Commands::Shop => {
            let store = open_store(&config, true)?;
            emit(game::shop::list_stock(&store, &config.shop))
        }
        Commands::Buy {
            player,
            item,
            quantity,
        } => {
            let store = open_store(&config, true)?;
            emit(game::shop::buy(&store, &player, &item, quantity))
        }
        Commands::Sell {
            player,
            item,
            quantity,
        } => {
            let store = open_store(&config, true)?;
            emit(game::shop::sell(&store, &player, &item, quantity))
        }
    }
}

fn seed_source(config: &Config) -> SeedSource {
    match config.seed_dir() {
        Some(dir) => SeedSource::Directory(dir),
        None => SeedSource::Builtin,
    }
}

fn open_store(config: &Config, seed: bool) -> Result<GameStore> {
    let path = config.db_path();
    let mut builder = GameStoreBuilder::new(&path);
    if !seed {
        builder = builder.without_catalog_seed();
    } else if let Some(dir) = config.seed_dir() {
        builder = builder.with_seed_dir(dir);
    }
    builder
        .open()
        .map_err(|e| anyhow!("Failed to open game store at {}: {}", path.display(), e))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a successful result, or report a rejection the way an HTTP shell
/// would: status code plus message.
///
/// Counters only cover this process, so they are logged at debug level
/// rather than reported by `status`.
fn emit<T: Serialize>(result: Result<T, GameError>) -> Result<()> {
    debug!("Operation counters: {:?}", metrics::snapshot());
    match result {
        Ok(value) => print_json(&value),
        Err(e) if e.is_rejection() => {
            let body = serde_json::json!({ "status": e.status_code(), "error": e.to_string() });
            eprintln!("{}", body);
            std::process::exit(2);
        }
        Err(e) => {
            error!("Operation failed: {}", e);
            Err(e.into())
        }
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
