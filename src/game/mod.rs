//! Game state and commerce core.
//! Sled-backed catalog and per-player aggregates (character, inventory,
//! quest progress) plus the composite operations that move gold and items
//! between them.

pub mod catalog;
pub mod character;
pub mod errors;
pub mod inventory;
pub mod items;
pub mod quest;
pub mod seed_loader;
pub mod shop;
pub mod storage;
pub mod types;

pub use catalog::{
    canonical_enemies, canonical_items, canonical_quests, ensure_seeded, SeedReport, SeedSource,
};
pub use errors::{GameError, StoreError};
pub use items::{equip, use_consumable, Equipped, ItemUsed};
pub use quest::{complete, list_for_player, quest_key, QuestRewards};
pub use shop::{buy, buy_price, list_stock, sell, sell_price, Purchase, Sale, SELL_RATIO_PERCENT};
pub use storage::{Collection, GameStore, GameStoreBuilder, Record};
pub use types::*;
