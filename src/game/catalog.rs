//! Reference catalog: the built-in item, enemy and quest dataset and the
//! idempotent seeding step that loads it into an empty store.
//!
//! Each category is seeded independently. A category is only written when
//! its collection is empty, so seeding is safe to run on every start; a
//! failure in one category is logged and does not stop the others.

use std::path::PathBuf;

use log::{error, info};
use serde::Serialize;

use crate::game::errors::GameError;
use crate::game::seed_loader;
use crate::game::storage::{Collection, GameStore, Record};
use crate::game::types::{
    CatalogEnemy, CatalogItem, CatalogQuest, ItemRarity, ItemType, QuestReward, QuestType,
};

/// Where seed data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// The dataset compiled into the crate.
    Builtin,
    /// `items.json`, `enemies.json` and `quests.json` in a directory. A
    /// missing file falls back to the built-in data for that category.
    Directory(PathBuf),
}

/// Documents inserted per category by one seeding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub items: usize,
    pub enemies: usize,
    pub quests: usize,
    /// Categories whose seeding failed.
    pub failed: Vec<&'static str>,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.items + self.enemies + self.quests
    }
}

pub fn canonical_items() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new("item_1", "Flameforged Sword", ItemType::Weapon, ItemRarity::Rare, 200)
            .with_damage(15)
            .with_description("Wreathed in living flame"),
        CatalogItem::new("item_2", "Steel Cuirass", ItemType::Armor, ItemRarity::Common, 150)
            .with_defense(12)
            .with_description("Sturdy plate of tempered steel"),
        CatalogItem::new("item_3", "Warrior's Helm", ItemType::Helmet, ItemRarity::Common, 75)
            .with_defense(5)
            .with_description("A helm fit for the front line"),
        CatalogItem::new("item_4", "Swift Boots", ItemType::Boots, ItemRarity::Uncommon, 100)
            .with_speed(3)
            .with_description("Light on the feet"),
        CatalogItem::new("item_5", "Ring of Might", ItemType::Accessory, ItemRarity::Rare, 300)
            .with_strength(2)
            .with_description("Grants the strength of giants"),
        CatalogItem::new("item_6", "Healing Potion", ItemType::Consumable, ItemRarity::Common, 25)
            .with_effect("heal", 50)
            .with_description("Restores 50 HP"),
        CatalogItem::new("item_7", "Mana Potion", ItemType::Consumable, ItemRarity::Common, 20)
            .with_effect("mana", 30)
            .with_description("Restores 30 mana"),
        CatalogItem::new("item_8", "Iron Sword", ItemType::Weapon, ItemRarity::Common, 100)
            .with_damage(10)
            .with_description("A plain iron blade"),
        CatalogItem::new("item_9", "Leather Armor", ItemType::Armor, ItemRarity::Common, 80)
            .with_defense(8)
            .with_description("Light leather protection"),
        CatalogItem::new("item_10", "Titan Shield", ItemType::Shield, ItemRarity::Epic, 500)
            .with_defense(15)
            .with_description("A legendary titanium shield"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn enemy(
    id: &str,
    name: &str,
    level: u32,
    health: i32,
    attack: i32,
    defense: i32,
    experience: i64,
    gold_reward: i64,
    image: &str,
) -> CatalogEnemy {
    CatalogEnemy {
        id: id.to_string(),
        name: name.to_string(),
        level,
        health,
        max_health: health,
        attack,
        defense,
        experience,
        gold_reward,
        image: image.to_string(),
    }
}

pub fn canonical_enemies() -> Vec<CatalogEnemy> {
    vec![
        enemy("enemy_1", "Goblin Warrior", 8, 60, 12, 5, 120, 25, "🧌"),
        enemy("enemy_2", "Wild Wolf", 10, 80, 15, 3, 150, 30, "🐺"),
        enemy("enemy_3", "Skull Mage", 15, 120, 25, 8, 300, 75, "💀"),
        enemy("enemy_4", "Ancient Dragon", 25, 300, 45, 20, 1000, 500, "🐲"),
    ]
}

pub fn canonical_quests() -> Vec<CatalogQuest> {
    vec![
        CatalogQuest {
            id: "quest_1".to_string(),
            title: "Goblin Menace".to_string(),
            description: "Defeat 5 goblin warriors to protect the village".to_string(),
            quest_type: QuestType::Kill,
            target: Some("Goblin Warrior".to_string()),
            required: 5,
            reward: QuestReward {
                experience: 500,
                gold: 100,
                item: None,
            },
            is_active: true,
        },
        CatalogQuest {
            id: "quest_2".to_string(),
            title: "The Mage's Trial".to_string(),
            description: "Reach level 15".to_string(),
            quest_type: QuestType::Level,
            target: None,
            required: 15,
            reward: QuestReward {
                experience: 0,
                gold: 300,
                item: Some("item_5".to_string()),
            },
            is_active: true,
        },
        CatalogQuest {
            id: "quest_3".to_string(),
            title: "Treasure Hunt".to_string(),
            description: "Collect 1000 gold".to_string(),
            quest_type: QuestType::Collect,
            target: Some("gold".to_string()),
            required: 1000,
            reward: QuestReward {
                experience: 800,
                gold: 0,
                item: Some("item_10".to_string()),
            },
            is_active: true,
        },
    ]
}

/// Seed every empty catalog collection. Never fails; per-category errors
/// are logged and recorded in the report.
pub fn ensure_seeded(store: &GameStore, source: &SeedSource) -> SeedReport {
    let mut report = SeedReport::default();

    match seed_category(store, Collection::Items, || load_items(source)) {
        Ok(n) => report.items = n,
        Err(e) => {
            error!("Error seeding items: {}", e);
            report.failed.push("items");
        }
    }
    match seed_category(store, Collection::Enemies, || load_enemies(source)) {
        Ok(n) => report.enemies = n,
        Err(e) => {
            error!("Error seeding enemies: {}", e);
            report.failed.push("enemies");
        }
    }
    match seed_category(store, Collection::Quests, || load_quests(source)) {
        Ok(n) => report.quests = n,
        Err(e) => {
            error!("Error seeding quests: {}", e);
            report.failed.push("quests");
        }
    }

    report
}

/// Catalog documents are keyed by their own id.
trait CatalogDoc: Record {
    fn doc_id(&self) -> &str;
}

impl CatalogDoc for CatalogItem {
    fn doc_id(&self) -> &str {
        &self.id
    }
}

impl CatalogDoc for CatalogEnemy {
    fn doc_id(&self) -> &str {
        &self.id
    }
}

impl CatalogDoc for CatalogQuest {
    fn doc_id(&self) -> &str {
        &self.id
    }
}

/// `load` only runs when the collection is empty.
fn seed_category<T: CatalogDoc>(
    store: &GameStore,
    collection: Collection,
    load: impl FnOnce() -> Result<Vec<T>, GameError>,
) -> Result<usize, GameError> {
    if store.count(collection)? > 0 {
        return Ok(0);
    }
    let docs: Vec<(String, T)> = load()?
        .into_iter()
        .map(|doc| (doc.doc_id().to_string(), doc))
        .collect();
    let inserted = store.bulk_insert(collection, &docs)?;
    info!("Seeded {} {}", inserted, collection.name());
    Ok(inserted)
}

fn load_items(source: &SeedSource) -> Result<Vec<CatalogItem>, GameError> {
    match source {
        SeedSource::Builtin => Ok(canonical_items()),
        SeedSource::Directory(dir) => {
            Ok(seed_loader::load_items_from_dir(dir)?.unwrap_or_else(canonical_items))
        }
    }
}

fn load_enemies(source: &SeedSource) -> Result<Vec<CatalogEnemy>, GameError> {
    match source {
        SeedSource::Builtin => Ok(canonical_enemies()),
        SeedSource::Directory(dir) => {
            Ok(seed_loader::load_enemies_from_dir(dir)?.unwrap_or_else(canonical_enemies))
        }
    }
}

fn load_quests(source: &SeedSource) -> Result<Vec<CatalogQuest>, GameError> {
    match source {
        SeedSource::Builtin => Ok(canonical_quests()),
        SeedSource::Directory(dir) => {
            Ok(seed_loader::load_quests_from_dir(dir)?.unwrap_or_else(canonical_quests))
        }
    }
}
