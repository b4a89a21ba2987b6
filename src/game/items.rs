//! Using consumables and equipping gear.

use log::{info, warn};
use serde::Serialize;

use crate::game::character;
use crate::game::errors::GameError;
use crate::game::inventory;
use crate::game::storage::GameStore;
use crate::game::types::EquipmentSlot;
use crate::logutil::escape_log;
use crate::metrics;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUsed {
    pub item_id: String,
    pub quantity: u32,
    pub health: i32,
    pub mana: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipped {
    pub item_id: String,
    pub slot: EquipmentSlot,
    /// Item that occupied the slot before. It is not returned to the inventory.
    pub replaced: Option<String>,
    pub message: String,
}

/// Consume `quantity` units of an item and apply its effect once.
///
/// The units are removed before the effect is applied, and removal does
/// not depend on the effect being recognised: unknown effect kinds (and
/// items without an effect) are consumed with no change to the character.
pub fn use_consumable(
    store: &GameStore,
    player_id: &str,
    item_id: &str,
    quantity: u32,
) -> Result<ItemUsed, GameError> {
    let item = store.get_item(item_id)?;
    if !inventory::remove_exact(store, player_id, item_id, quantity)? {
        return Err(GameError::NotInInventory(item_id.to_string()));
    }

    let restore = item
        .effect
        .as_ref()
        .and_then(|effect| effect.vital().map(|vital| (vital, effect.value)));
    let result = match restore {
        Some((vital, amount)) => character::mutate(store, player_id, |c| {
            c.restore(vital, amount);
            Ok(())
        })
        .map(|(c, ())| c),
        None => character::get(store, player_id),
    };
    let sheet = result.map_err(|e| {
        warn!(
            "{}x {} consumed by {} but effect not applied: {}",
            quantity,
            item_id,
            escape_log(player_id),
            e
        );
        e
    })?;

    metrics::inc_items_used();
    info!("{} used {}x {}", escape_log(player_id), quantity, item_id);
    Ok(ItemUsed {
        item_id: item.id,
        quantity,
        health: sheet.health,
        mana: sheet.mana,
        message: format!("{} used!", item.name),
    })
}

/// Put an item into its equipment slot, overwriting whatever was there.
///
/// Ownership is not checked and the previous occupant is not returned to
/// the inventory.
pub fn equip(store: &GameStore, player_id: &str, item_id: &str) -> Result<Equipped, GameError> {
    let item = store.get_item(item_id)?;
    let slot = item
        .item_type
        .slot()
        .ok_or_else(|| GameError::NotEquippable(item_id.to_string()))?;

    let (_, replaced) = character::mutate(store, player_id, |c| Ok(c.equipment.set(slot, item_id)))?;

    metrics::inc_equips();
    info!(
        "{} equipped {} in {} slot",
        escape_log(player_id),
        item_id,
        slot
    );
    Ok(Equipped {
        item_id: item.id,
        slot,
        replaced,
        message: format!("{} equipped!", item.name),
    })
}
