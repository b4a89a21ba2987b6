//! Inventory aggregate: per-player item stacks.
//!
//! Every mutation goes through [`GameStore::modify`], so concurrent adds and
//! removes on the same inventory serialize instead of overwriting each other.

use log::{debug, info, warn};

use crate::game::errors::GameError;
use crate::game::storage::{Collection, GameStore};
use crate::game::types::{CatalogItem, Inventory, InventoryEntry, InventoryView};
use crate::logutil::escape_log;
use crate::metrics;

fn ensure_quantity(quantity: u32) -> Result<(), GameError> {
    if quantity == 0 {
        return Err(GameError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// The raw inventory document, creating the starter stock if absent.
pub fn load(store: &GameStore, player_id: &str) -> Result<Inventory, GameError> {
    let key = Inventory::id_for(player_id);
    if let Some(inventory) = store.get_doc(Collection::Inventories, &key)? {
        return Ok(inventory);
    }
    let fresh = Inventory::starter(player_id);
    if store.insert_if_absent(Collection::Inventories, &key, &fresh)? {
        metrics::inc_inventories_created();
        info!("Created starter inventory for {}", escape_log(player_id));
        return Ok(fresh);
    }
    store
        .get_doc(Collection::Inventories, &key)?
        .ok_or_else(|| GameError::NotFound(format!("inventory: {}", key)))
}

/// The player's inventory joined with catalog details. Entries whose item
/// is missing from the catalog are skipped.
pub fn get(store: &GameStore, player_id: &str) -> Result<Vec<InventoryView>, GameError> {
    let inventory = load(store, player_id)?;
    let mut views = Vec::with_capacity(inventory.items.len());
    for entry in inventory.items {
        let Some(item) = store.get_doc::<CatalogItem>(Collection::Items, &entry.item_id)? else {
            warn!("Inventory {} holds unknown item {}", inventory.id, entry.item_id);
            continue;
        };
        views.push(InventoryView {
            item,
            item_id: entry.item_id,
            quantity: entry.quantity,
            equipped: entry.equipped,
        });
    }
    Ok(views)
}

/// Add `quantity` units of `item_id`, stacking onto an existing entry.
///
/// A player without an inventory gets one holding just this entry (no
/// starter stock). Returns the resulting entry.
pub fn add_item(
    store: &GameStore,
    player_id: &str,
    item_id: &str,
    quantity: u32,
) -> Result<InventoryEntry, GameError> {
    ensure_quantity(quantity)?;
    let key = Inventory::id_for(player_id);
    loop {
        let updated = store.modify(Collection::Inventories, &key, |inventory: &mut Inventory| {
            inventory.add(item_id, quantity)
        })?;
        if let Some((inventory, stacked)) = updated {
            debug!(
                "Added {}x {} to {} (stacked: {})",
                quantity, item_id, key, stacked
            );
            return inventory
                .entry(item_id)
                .cloned()
                .ok_or_else(|| GameError::NotFound(format!("{} in {}", item_id, key)));
        }

        let mut fresh = Inventory::empty(player_id);
        fresh.add(item_id, quantity)?;
        if store.insert_if_absent(Collection::Inventories, &key, &fresh)? {
            metrics::inc_inventories_created();
            debug!("Created inventory {} holding {}x {}", key, quantity, item_id);
            return Ok(InventoryEntry::new(item_id, quantity));
        }
        // Someone else created it in the meantime; stack onto theirs.
    }
}

/// Fail with `InvalidQuantity` when the player's stack of `item_id` cannot
/// take `quantity` more units. A missing inventory always has room.
pub fn ensure_room(
    store: &GameStore,
    player_id: &str,
    item_id: &str,
    quantity: u32,
) -> Result<(), GameError> {
    ensure_quantity(quantity)?;
    let key = Inventory::id_for(player_id);
    match store.get_doc::<Inventory>(Collection::Inventories, &key)? {
        Some(inventory) if !inventory.can_hold(item_id, quantity) => {
            Err(GameError::InvalidQuantity(quantity))
        }
        _ => Ok(()),
    }
}

fn remove_with(
    store: &GameStore,
    player_id: &str,
    item_id: &str,
    quantity: u32,
    take: fn(&mut Inventory, &str, u32) -> bool,
) -> Result<bool, GameError> {
    ensure_quantity(quantity)?;
    let key = Inventory::id_for(player_id);
    let result = store.modify(Collection::Inventories, &key, |inventory: &mut Inventory| {
        if take(inventory, item_id, quantity) {
            Ok(())
        } else {
            Err(GameError::NotInInventory(item_id.to_string()))
        }
    });
    match result {
        Ok(Some(_)) => {
            debug!("Removed {}x {} from {}", quantity, item_id, key);
            Ok(true)
        }
        Ok(None) | Err(GameError::NotInInventory(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove up to `quantity` units. A stack that would drop to zero or below
/// is deleted outright. Returns false, without mutating anything, when the
/// player has no inventory or no such entry.
pub fn remove_item(
    store: &GameStore,
    player_id: &str,
    item_id: &str,
    quantity: u32,
) -> Result<bool, GameError> {
    remove_with(store, player_id, item_id, quantity, Inventory::remove)
}

/// Remove exactly `quantity` units. Returns false, without mutating
/// anything, when fewer are held.
pub fn remove_exact(
    store: &GameStore,
    player_id: &str,
    item_id: &str,
    quantity: u32,
) -> Result<bool, GameError> {
    remove_with(store, player_id, item_id, quantity, Inventory::take_exact)
}
