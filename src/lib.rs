//! # questledger - persistent game state for a browser RPG
//!
//! questledger keeps the per-player state of a small role-playing game in an
//! embedded sled database: character sheets, item inventories and quest
//! progress, next to a read-only catalog of items, enemies and quests.
//!
//! ## Features
//!
//! - **Lazy aggregates**: a player's character, inventory and starter quests
//!   are created on first access, exactly once even under concurrent calls.
//! - **Atomic document updates**: every mutation is a compare-and-swap loop,
//!   so concurrent stack increments and gold changes are never lost.
//! - **Commerce**: buy at catalog price, sell at half price, use consumables,
//!   equip gear.
//! - **Quest rewards**: completion flips the quest before paying out, so a
//!   reward is granted once no matter how many requests race.
//! - **Idempotent seeding**: the built-in catalog (or JSON seed files) is
//!   loaded into empty collections on every start.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use questledger::game::{self, GameStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = GameStore::open("./data/questledger")?;
//!     let purchase = game::buy(&store, "player-1", "item_6", 2)?;
//!     println!("{}", purchase.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - store, catalog, aggregates and composite operations
//! - [`config`] - TOML configuration
//! - [`logutil`] - single-line escaping for player-supplied log text
//! - [`metrics`] - process-wide operation counters

pub mod config;
pub mod game;
pub mod logutil;
pub mod metrics;
