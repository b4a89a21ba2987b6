//! Inventory aggregate, consumables and equipment against a seeded store.

use questledger::game::{
    character, equip, inventory, use_consumable, CharacterUpdate, EquipmentSlot, GameError,
    GameStore,
};
use tempfile::TempDir;

fn open_store() -> (TempDir, GameStore) {
    let tmp = TempDir::new().unwrap();
    let store = GameStore::open(tmp.path()).unwrap();
    (tmp, store)
}

#[test]
fn test_starter_inventory_contents() {
    let (_tmp, store) = open_store();
    let inventory = inventory::load(&store, "p1").unwrap();
    assert_eq!(inventory.id, "inv_p1");
    assert_eq!(inventory.quantity_of("item_6"), 5);
    assert_eq!(inventory.quantity_of("item_7"), 3);
    for id in ["item_8", "item_9", "item_10"] {
        assert_eq!(inventory.quantity_of(id), 1, "{}", id);
    }
    assert_eq!(inventory.items.len(), 5);
    assert!(inventory.items.iter().all(|e| !e.equipped));
}

#[test]
fn test_inventory_view_merges_catalog_fields() {
    let (_tmp, store) = open_store();
    let views = inventory::get(&store, "p1").unwrap();
    let shield = views.iter().find(|v| v.item_id == "item_10").unwrap();
    let json = serde_json::to_value(shield).unwrap();
    assert_eq!(json["name"], "Titan Shield");
    assert_eq!(json["type"], "shield");
    assert_eq!(json["itemId"], "item_10");
    assert_eq!(json["quantity"], 1);
    assert_eq!(json["equipped"], false);
}

#[test]
fn test_remove_item_collapses_overdrawn_stack() {
    let (_tmp, store) = open_store();
    inventory::load(&store, "p1").unwrap();
    assert!(inventory::remove_item(&store, "p1", "item_7", 10).unwrap());
    assert!(inventory::load(&store, "p1").unwrap().entry("item_7").is_none());
    assert!(!inventory::remove_item(&store, "p1", "item_7", 1).unwrap());
}

#[test]
fn test_add_then_remove_restores_entries() {
    let (_tmp, store) = open_store();
    let before = inventory::load(&store, "p1").unwrap().items;

    inventory::add_item(&store, "p1", "item_3", 4).unwrap();
    assert!(inventory::remove_item(&store, "p1", "item_3", 4).unwrap());

    let after = inventory::load(&store, "p1").unwrap().items;
    assert_eq!(after, before);
    assert!(after.iter().all(|e| e.quantity > 0));
}

#[test]
fn test_remove_absent_entry_changes_nothing() {
    let (_tmp, store) = open_store();
    let before = inventory::load(&store, "p1").unwrap().items;

    assert!(!inventory::remove_item(&store, "p1", "item_1", 1).unwrap());
    assert!(!inventory::remove_exact(&store, "p1", "item_1", 1).unwrap());

    assert_eq!(inventory::load(&store, "p1").unwrap().items, before);
}

#[test]
fn test_remove_item_decrements() {
    let (_tmp, store) = open_store();
    inventory::load(&store, "p1").unwrap();
    assert!(inventory::remove_item(&store, "p1", "item_6", 2).unwrap());
    assert_eq!(inventory::load(&store, "p1").unwrap().quantity_of("item_6"), 3);
}

#[test]
fn test_use_potion_heals_and_consumes() {
    let (_tmp, store) = open_store();
    inventory::load(&store, "p1").unwrap();
    let hurt = CharacterUpdate {
        health: Some(30),
        ..Default::default()
    };
    character::update(&store, "p1", &hurt).unwrap();

    let used = use_consumable(&store, "p1", "item_6", 1).unwrap();
    assert_eq!(used.health, 80);
    assert_eq!(used.message, "Healing Potion used!");
    assert_eq!(inventory::load(&store, "p1").unwrap().quantity_of("item_6"), 4);
    assert_eq!(character::get(&store, "p1").unwrap().health, 80);
}

#[test]
fn test_mana_potion_caps_at_max() {
    let (_tmp, store) = open_store();
    inventory::load(&store, "p1").unwrap();
    let used = use_consumable(&store, "p1", "item_7", 1).unwrap();
    assert_eq!(used.mana, 75);
}

#[test]
fn test_use_without_stock_is_rejected() {
    let (_tmp, store) = open_store();
    inventory::load(&store, "p1").unwrap();
    let err = use_consumable(&store, "p1", "item_6", 6).unwrap_err();
    assert!(matches!(err, GameError::NotInInventory(_)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(inventory::load(&store, "p1").unwrap().quantity_of("item_6"), 5);

    let err = use_consumable(&store, "p1", "item_404", 1).unwrap_err();
    assert!(matches!(err, GameError::NotFound(_)));
}

#[test]
fn test_equip_weapon_sets_only_weapon_slot() {
    let (_tmp, store) = open_store();
    let before = character::get(&store, "p1").unwrap();

    let receipt = equip(&store, "p1", "item_8").unwrap();
    assert_eq!(receipt.slot, EquipmentSlot::Weapon);
    assert_eq!(receipt.replaced.as_deref(), Some("item_1"));

    let after = character::get(&store, "p1").unwrap();
    assert_eq!(after.equipment.weapon.as_deref(), Some("item_8"));
    assert_eq!(after.equipment.armor, before.equipment.armor);
    assert_eq!(after.equipment.helmet, before.equipment.helmet);
    assert_eq!(after.equipment.boots, before.equipment.boots);
    assert_eq!(after.equipment.accessory, before.equipment.accessory);
}

#[test]
fn test_equip_consumable_is_rejected() {
    let (_tmp, store) = open_store();
    let before = character::get(&store, "p1").unwrap();
    let err = equip(&store, "p1", "item_6").unwrap_err();
    assert!(matches!(err, GameError::NotEquippable(_)));
    assert_eq!(character::get(&store, "p1").unwrap().equipment, before.equipment);
}
