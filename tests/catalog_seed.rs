//! Catalog seeding against real sled stores: idempotence across reopen and
//! data-driven seed directories.

use questledger::game::{
    canonical_items, Collection, GameStore, GameStoreBuilder, ItemType, SeedSource,
};
use tempfile::TempDir;

#[test]
fn test_open_seeds_canonical_catalog() {
    let tmp = TempDir::new().unwrap();
    let store = GameStore::open(tmp.path()).unwrap();

    assert_eq!(store.count(Collection::Items).unwrap(), 10);
    assert_eq!(store.count(Collection::Enemies).unwrap(), 4);
    assert_eq!(store.count(Collection::Quests).unwrap(), 3);

    let dragon = store.get_enemy("enemy_4").unwrap();
    assert_eq!(dragon.name, "Ancient Dragon");
    assert_eq!(dragon.health, dragon.max_health);

    let quest = store.get_quest("quest_3").unwrap();
    assert_eq!(quest.reward.item.as_deref(), Some("item_10"));
}

#[test]
fn test_reopen_does_not_reseed() {
    let tmp = TempDir::new().unwrap();
    {
        let store = GameStore::open(tmp.path()).unwrap();
        assert_eq!(store.count(Collection::Items).unwrap(), 10);
    }

    let store = GameStore::open(tmp.path()).unwrap();
    let report = store.ensure_seeded(&SeedSource::Builtin);
    assert_eq!(report.total(), 0);
    assert!(report.failed.is_empty());
    assert_eq!(store.count(Collection::Items).unwrap(), 10);
    assert_eq!(store.list_items().unwrap().len(), canonical_items().len());
}

#[test]
fn test_seed_dir_overrides_one_category() {
    let store_dir = TempDir::new().unwrap();
    let seed_dir = TempDir::new().unwrap();
    std::fs::write(
        seed_dir.path().join("items.json"),
        r#"[
            {"id": "relic", "name": "Old Relic", "type": "misc", "price": 7},
            {"id": "elixir", "name": "Elixir", "type": "consumable", "rarity": "rare",
             "price": 90, "effect": {"kind": "heal", "value": 100}}
        ]"#,
    )
    .unwrap();

    let store = GameStoreBuilder::new(store_dir.path())
        .with_seed_dir(seed_dir.path())
        .open()
        .unwrap();

    assert_eq!(store.count(Collection::Items).unwrap(), 2);
    let elixir = store.get_item("elixir").unwrap();
    assert_eq!(elixir.item_type, ItemType::Consumable);
    assert_eq!(elixir.effect.map(|e| e.value), Some(100));

    // Files that are absent fall back to the built-in data.
    assert_eq!(store.count(Collection::Enemies).unwrap(), 4);
    assert_eq!(store.count(Collection::Quests).unwrap(), 3);
}

#[test]
fn test_unknown_catalog_ids_are_not_found() {
    let tmp = TempDir::new().unwrap();
    let store = GameStore::open(tmp.path()).unwrap();
    let err = store.get_item("item_404").unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(store.get_enemy("enemy_404").is_err());
}

#[test]
fn test_negative_seed_price_skips_items_only() {
    let store_dir = TempDir::new().unwrap();
    let seed_dir = TempDir::new().unwrap();
    std::fs::write(
        seed_dir.path().join("items.json"),
        r#"[{"id": "refund", "name": "Refund Scroll", "type": "misc", "price": -500}]"#,
    )
    .unwrap();

    let store = GameStoreBuilder::new(store_dir.path())
        .without_catalog_seed()
        .open()
        .unwrap();
    let report = store.ensure_seeded(&SeedSource::Directory(seed_dir.path().into()));

    assert_eq!(report.failed, vec!["items"]);
    assert_eq!(store.count(Collection::Items).unwrap(), 0);
    assert!(store.get_item("refund").is_err());
    assert_eq!(report.enemies, 4);
    assert_eq!(report.quests, 3);
}
