use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::errors::GameError;

pub const CHARACTER_SCHEMA_VERSION: u8 = 1;
pub const INVENTORY_SCHEMA_VERSION: u8 = 1;
pub const PLAYER_QUEST_SCHEMA_VERSION: u8 = 1;

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Weapon,
    Armor,
    Helmet,
    Boots,
    Shield,
    Accessory,
    Consumable,
    Misc,
}

impl ItemType {
    /// Equipment slot this item type occupies, if any. Shields have no slot.
    pub fn slot(self) -> Option<EquipmentSlot> {
        match self {
            ItemType::Weapon => Some(EquipmentSlot::Weapon),
            ItemType::Armor => Some(EquipmentSlot::Armor),
            ItemType::Helmet => Some(EquipmentSlot::Helmet),
            ItemType::Boots => Some(EquipmentSlot::Boots),
            ItemType::Accessory => Some(EquipmentSlot::Accessory),
            ItemType::Shield | ItemType::Consumable | ItemType::Misc => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemRarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Kill,
    Collect,
    Level,
    Explore,
}

/// Consumable effect: a kind tag plus its magnitude.
///
/// Only `heal` and `mana` have an effect on the character; other kinds are
/// accepted and do nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemEffect {
    pub kind: String,
    pub value: i32,
}

impl ItemEffect {
    pub fn new(kind: &str, value: i32) -> Self {
        Self {
            kind: kind.to_string(),
            value,
        }
    }

    pub fn vital(&self) -> Option<Vital> {
        match self.kind.as_str() {
            "heal" => Some(Vital::Health),
            "mana" => Some(Vital::Mana),
            _ => None,
        }
    }
}

/// Character pool restored by a consumable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Vital {
    Health,
    Mana,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub rarity: ItemRarity,
    pub price: i64,
    #[serde(default)]
    pub damage: Option<i32>,
    #[serde(default)]
    pub defense: Option<i32>,
    #[serde(default)]
    pub speed: Option<i32>,
    #[serde(default)]
    pub strength: Option<i32>,
    #[serde(default)]
    pub effect: Option<ItemEffect>,
    #[serde(default)]
    pub description: String,
}

impl CatalogItem {
    pub fn new(id: &str, name: &str, item_type: ItemType, rarity: ItemRarity, price: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            item_type,
            rarity,
            price,
            damage: None,
            defense: None,
            speed: None,
            strength: None,
            effect: None,
            description: String::new(),
        }
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = Some(defense);
        self
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_strength(mut self, strength: i32) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_effect(mut self, kind: &str, value: i32) -> Self {
        self.effect = Some(ItemEffect::new(kind, value));
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEnemy {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub experience: i64,
    pub gold_reward: i64,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct QuestReward {
    #[serde(default)]
    pub experience: i64,
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub item: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuest {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    #[serde(default)]
    pub target: Option<String>,
    pub required: u32,
    pub reward: QuestReward,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Character
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterStats {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub constitution: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            intelligence: 10,
            constitution: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Helmet,
    Boots,
    Accessory,
}

impl std::fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EquipmentSlot::Weapon => "weapon",
            EquipmentSlot::Armor => "armor",
            EquipmentSlot::Helmet => "helmet",
            EquipmentSlot::Boots => "boots",
            EquipmentSlot::Accessory => "accessory",
        };
        f.write_str(name)
    }
}

/// Five optional slots, each holding a catalog item id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Equipment {
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub helmet: Option<String>,
    pub boots: Option<String>,
    pub accessory: Option<String>,
}

impl Equipment {
    pub fn get(&self, slot: EquipmentSlot) -> Option<&str> {
        match slot {
            EquipmentSlot::Weapon => self.weapon.as_deref(),
            EquipmentSlot::Armor => self.armor.as_deref(),
            EquipmentSlot::Helmet => self.helmet.as_deref(),
            EquipmentSlot::Boots => self.boots.as_deref(),
            EquipmentSlot::Accessory => self.accessory.as_deref(),
        }
    }

    /// Overwrite a slot, returning the previous occupant.
    pub fn set(&mut self, slot: EquipmentSlot, item_id: &str) -> Option<String> {
        let target = match slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armor => &mut self.armor,
            EquipmentSlot::Helmet => &mut self.helmet,
            EquipmentSlot::Boots => &mut self.boots,
            EquipmentSlot::Accessory => &mut self.accessory,
        };
        target.replace(item_id.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub experience: i64,
    pub experience_to_next: i64,
    pub gold: i64,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub stats: CharacterStats,
    pub equipment: Equipment,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl Character {
    /// Fixed starting sheet handed to every new player.
    pub fn starter(player_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: player_id.to_string(),
            name: "Adventurer".to_string(),
            level: 12,
            experience: 2400,
            experience_to_next: 3000,
            gold: 850,
            health: 100,
            max_health: 100,
            mana: 75,
            max_mana: 75,
            stats: CharacterStats {
                strength: 18,
                dexterity: 14,
                intelligence: 16,
                constitution: 15,
                wisdom: 12,
                charisma: 10,
            },
            equipment: Equipment {
                weapon: Some("item_1".to_string()),
                armor: Some("item_2".to_string()),
                helmet: Some("item_3".to_string()),
                boots: Some("item_4".to_string()),
                accessory: Some("item_5".to_string()),
            },
            created_at: now,
            updated_at: now,
            schema_version: CHARACTER_SCHEMA_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Add to health or mana, capped at the matching maximum.
    pub fn restore(&mut self, vital: Vital, amount: i32) {
        match vital {
            Vital::Health => {
                self.health = self.health.saturating_add(amount).min(self.max_health);
            }
            Vital::Mana => {
                self.mana = self.mana.saturating_add(amount).min(self.max_mana);
            }
        }
    }
}

/// Partial character update. Absent fields are left untouched.
///
/// No range checks are applied here: callers can drive gold negative or
/// health above `max_health` through this path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CharacterUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub experience: Option<i64>,
    #[serde(default)]
    pub gold: Option<i64>,
    #[serde(default)]
    pub health: Option<i32>,
    #[serde(default)]
    pub mana: Option<i32>,
    #[serde(default)]
    pub stats: Option<CharacterStats>,
    #[serde(default)]
    pub equipment: Option<Equipment>,
}

impl CharacterUpdate {
    pub fn apply(&self, character: &mut Character) {
        if let Some(name) = &self.name {
            character.name = name.clone();
        }
        if let Some(level) = self.level {
            character.level = level;
        }
        if let Some(experience) = self.experience {
            character.experience = experience;
        }
        if let Some(gold) = self.gold {
            character.gold = gold;
        }
        if let Some(health) = self.health {
            character.health = health;
        }
        if let Some(mana) = self.mana {
            character.mana = mana;
        }
        if let Some(stats) = self.stats {
            character.stats = stats;
        }
        if let Some(equipment) = &self.equipment {
            character.equipment = equipment.clone();
        }
    }
}

// ============================================================================
// Inventory
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub item_id: String,
    pub quantity: u32,
    pub equipped: bool,
}

impl InventoryEntry {
    pub fn new(item_id: &str, quantity: u32) -> Self {
        Self {
            item_id: item_id.to_string(),
            quantity,
            equipped: false,
        }
    }
}

/// One player's item stacks. At most one entry per item id; entries never
/// hold a zero quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub id: String,
    pub player_id: String,
    pub items: Vec<InventoryEntry>,
    pub schema_version: u8,
}

impl Inventory {
    pub fn id_for(player_id: &str) -> String {
        format!("inv_{}", player_id)
    }

    pub fn empty(player_id: &str) -> Self {
        Self {
            id: Self::id_for(player_id),
            player_id: player_id.to_string(),
            items: Vec::new(),
            schema_version: INVENTORY_SCHEMA_VERSION,
        }
    }

    /// Starter stock: potions, mana potions and a few pieces of gear.
    pub fn starter(player_id: &str) -> Self {
        let mut inventory = Self::empty(player_id);
        inventory.items = vec![
            InventoryEntry::new("item_6", 5),
            InventoryEntry::new("item_7", 3),
            InventoryEntry::new("item_8", 1),
            InventoryEntry::new("item_9", 1),
            InventoryEntry::new("item_10", 1),
        ];
        inventory
    }

    pub fn entry(&self, item_id: &str) -> Option<&InventoryEntry> {
        self.items.iter().find(|e| e.item_id == item_id)
    }

    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.entry(item_id).map(|e| e.quantity).unwrap_or(0)
    }

    /// Increment an existing stack or append a new unequipped one.
    /// Returns true when an existing stack grew.
    ///
    /// A stack that cannot hold `quantity` more units is left untouched and
    /// `InvalidQuantity` is returned.
    pub fn add(&mut self, item_id: &str, quantity: u32) -> Result<bool, GameError> {
        if let Some(entry) = self.items.iter_mut().find(|e| e.item_id == item_id) {
            entry.quantity = entry
                .quantity
                .checked_add(quantity)
                .ok_or(GameError::InvalidQuantity(quantity))?;
            return Ok(true);
        }
        self.items.push(InventoryEntry::new(item_id, quantity));
        Ok(false)
    }

    /// Whether the stack for `item_id` has room for `quantity` more units.
    pub fn can_hold(&self, item_id: &str, quantity: u32) -> bool {
        self.quantity_of(item_id).checked_add(quantity).is_some()
    }

    /// Decrement a stack, dropping it once nothing is left. Returns false
    /// when the item is not held.
    pub fn remove(&mut self, item_id: &str, quantity: u32) -> bool {
        let Some(index) = self.items.iter().position(|e| e.item_id == item_id) else {
            return false;
        };
        if quantity >= self.items[index].quantity {
            self.items.remove(index);
        } else {
            self.items[index].quantity -= quantity;
        }
        true
    }

    /// Like [`Inventory::remove`], but refuses when fewer than `quantity`
    /// units are held.
    pub fn take_exact(&mut self, item_id: &str, quantity: u32) -> bool {
        if self.quantity_of(item_id) < quantity {
            return false;
        }
        self.remove(item_id, quantity)
    }
}

/// An inventory entry joined with its catalog definition. Entry fields win
/// over catalog fields on name collisions.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub item_id: String,
    pub quantity: u32,
    pub equipped: bool,
}

// ============================================================================
// Quests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuest {
    pub id: String,
    pub player_id: String,
    pub quest_id: String,
    pub progress: u32,
    pub completed: bool,
    pub active: bool,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub schema_version: u8,
}

impl PlayerQuest {
    pub fn new(player_id: &str, quest_id: &str, ordinal: usize, progress: u32) -> Self {
        Self {
            id: format!("pq_{}_{}", player_id, ordinal),
            player_id: player_id.to_string(),
            quest_id: quest_id.to_string(),
            progress,
            completed: false,
            active: true,
            started_at: Utc::now(),
            completed_at: None,
            schema_version: PLAYER_QUEST_SCHEMA_VERSION,
        }
    }

    /// Quests every new player starts with, already partly progressed.
    pub fn starter_set(player_id: &str) -> Vec<Self> {
        vec![
            Self::new(player_id, "quest_1", 1, 3),
            Self::new(player_id, "quest_2", 2, 12),
        ]
    }

    /// Active and not yet completed.
    pub fn is_open(&self) -> bool {
        self.active && !self.completed
    }

    /// One-way transition; a completed quest never becomes active again.
    pub fn mark_complete(&mut self) {
        self.completed = true;
        self.active = false;
        self.completed_at = Some(Utc::now());
    }
}

/// A player quest joined with its catalog definition. Player-quest fields
/// (including `id`) win over catalog fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestView {
    pub id: String,
    pub player_id: String,
    pub quest_id: String,
    pub progress: u32,
    pub completed: bool,
    pub active: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    pub target: Option<String>,
    pub required: u32,
    pub reward: QuestReward,
    pub is_active: bool,
}

impl QuestView {
    pub fn join(quest: CatalogQuest, progress: PlayerQuest) -> Self {
        Self {
            id: progress.id,
            player_id: progress.player_id,
            quest_id: progress.quest_id,
            progress: progress.progress,
            completed: progress.completed,
            active: progress.active,
            started_at: progress.started_at,
            completed_at: progress.completed_at,
            title: quest.title,
            description: quest.description,
            quest_type: quest.quest_type,
            target: quest.target,
            required: quest.required,
            reward: quest.reward,
            is_active: quest.is_active,
        }
    }
}
