//! Buying and selling catalog items for gold.
//!
//! Each trade touches two aggregates in sequence. Gold moves as an atomic
//! delta on the character, items through the inventory operations; there
//! is no transaction spanning both, and the window between them is logged.

use log::{info, warn};
use serde::Serialize;

use crate::config::ShopConfig;
use crate::game::character;
use crate::game::errors::GameError;
use crate::game::inventory;
use crate::game::storage::{Collection, GameStore};
use crate::game::types::CatalogItem;
use crate::logutil::escape_log;
use crate::metrics;

/// Share of the catalog price paid back when selling.
pub const SELL_RATIO_PERCENT: i64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub item_id: String,
    pub quantity: u32,
    pub total_cost: i64,
    pub gold: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub item_id: String,
    pub quantity: u32,
    pub proceeds: i64,
    pub gold: i64,
    pub message: String,
}

fn units(quantity: u32) -> Result<i64, GameError> {
    if quantity == 0 {
        return Err(GameError::InvalidQuantity(quantity));
    }
    Ok(i64::from(quantity))
}

/// Catalog price times quantity.
pub fn buy_price(item: &CatalogItem, quantity: u32) -> Result<i64, GameError> {
    item.price
        .checked_mul(units(quantity)?)
        .ok_or(GameError::InvalidQuantity(quantity))
}

/// Half the catalog price, rounded down, times quantity.
pub fn sell_price(item: &CatalogItem, quantity: u32) -> Result<i64, GameError> {
    let units = units(quantity)?;
    item.price
        .checked_mul(SELL_RATIO_PERCENT)
        .and_then(|scaled| scaled.div_euclid(100).checked_mul(units))
        .ok_or(GameError::InvalidQuantity(quantity))
}

/// The configured stock joined with the catalog, in stock order. Ids the
/// catalog does not know are skipped.
pub fn list_stock(store: &GameStore, shop: &ShopConfig) -> Result<Vec<CatalogItem>, GameError> {
    let mut items = Vec::with_capacity(shop.stock.len());
    for item_id in &shop.stock {
        match store.get_doc::<CatalogItem>(Collection::Items, item_id)? {
            Some(item) => items.push(item),
            None => warn!("Shop stock lists unknown item {}", item_id),
        }
    }
    Ok(items)
}

/// Pay `price * quantity` gold and receive `quantity` units.
///
/// Fails with `InsufficientFunds`, changing nothing, when the character
/// cannot cover the total, and with `InvalidQuantity` when the stack has no
/// room for the units. If granting the items fails after the debit, the
/// gold is refunded.
pub fn buy(store: &GameStore, player_id: &str, item_id: &str, quantity: u32) -> Result<Purchase, GameError> {
    let item = store.get_item(item_id)?;
    let total_cost = buy_price(&item, quantity)?;
    inventory::ensure_room(store, player_id, item_id, quantity)?;

    let character = character::debit_gold(store, player_id, total_cost)?;
    if let Err(e) = inventory::add_item(store, player_id, item_id, quantity) {
        match character::grant(store, player_id, 0, total_cost) {
            Ok(_) => warn!(
                "Refunded {} gold to {} after {}x {} could not be granted: {}",
                total_cost,
                escape_log(player_id),
                quantity,
                item_id,
                e
            ),
            Err(refund) => warn!(
                "{} paid {} gold for {}x {} but the item was not granted ({}) and the refund failed: {}",
                escape_log(player_id),
                total_cost,
                quantity,
                item_id,
                e,
                refund
            ),
        }
        return Err(e);
    }

    metrics::inc_purchases();
    info!(
        "{} bought {}x {} for {} gold",
        escape_log(player_id),
        quantity,
        item_id,
        total_cost
    );
    Ok(Purchase {
        item_id: item.id,
        quantity,
        total_cost,
        gold: character.gold,
        message: format!("Purchased {}x {}", quantity, item.name),
    })
}

/// Give up `quantity` units for half their catalog price.
///
/// Fails with `NotInInventory`, changing nothing, unless the full quantity
/// is held.
pub fn sell(store: &GameStore, player_id: &str, item_id: &str, quantity: u32) -> Result<Sale, GameError> {
    let item = store.get_item(item_id)?;
    let proceeds = sell_price(&item, quantity)?;

    if !inventory::remove_exact(store, player_id, item_id, quantity)? {
        return Err(GameError::NotInInventory(item_id.to_string()));
    }
    let character = character::grant(store, player_id, 0, proceeds).map_err(|e| {
        warn!(
            "{} sold {}x {} but {} gold was not credited: {}",
            escape_log(player_id),
            quantity,
            item_id,
            proceeds,
            e
        );
        e
    })?;

    metrics::inc_sales();
    info!(
        "{} sold {}x {} for {} gold",
        escape_log(player_id),
        quantity,
        item_id,
        proceeds
    );
    Ok(Sale {
        item_id: item.id,
        quantity,
        proceeds,
        gold: character.gold,
        message: format!("Sold {}x {} for {} gold", quantity, item.name, proceeds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::storage::GameStoreBuilder;
    use crate::game::types::{Inventory, ItemRarity, ItemType};
    use tempfile::TempDir;

    fn setup_test_store() -> (TempDir, GameStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStoreBuilder::new(dir.path()).open().expect("store");
        (dir, store)
    }

    #[test]
    fn sell_price_rounds_down() {
        let odd = CatalogItem::new("odd", "Odd Trinket", ItemType::Misc, ItemRarity::Common, 25);
        assert_eq!(sell_price(&odd, 1).unwrap(), 12);
        assert_eq!(sell_price(&odd, 3).unwrap(), 36);
        assert!(matches!(sell_price(&odd, 0), Err(GameError::InvalidQuantity(0))));
    }

    #[test]
    fn buy_price_rejects_overflow() {
        let pricey = CatalogItem::new("gem", "Gem", ItemType::Misc, ItemRarity::Legendary, i64::MAX);
        assert!(matches!(buy_price(&pricey, 2), Err(GameError::InvalidQuantity(2))));
    }

    #[test]
    fn stock_follows_config_order() {
        let (_dir, store) = setup_test_store();
        let shop = ShopConfig {
            stock: vec!["item_6".into(), "missing".into(), "item_1".into()],
        };
        let items = list_stock(&store, &shop).unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["item_6", "item_1"]);
    }

    #[test]
    fn buy_debits_and_grants() {
        let (_dir, store) = setup_test_store();
        inventory::load(&store, "p1").unwrap();
        let purchase = buy(&store, "p1", "item_6", 2).unwrap();
        assert_eq!(purchase.total_cost, 50);
        assert_eq!(purchase.gold, 800);
        assert_eq!(inventory::load(&store, "p1").unwrap().quantity_of("item_6"), 7);
    }

    #[test]
    fn buy_short_by_one_changes_nothing() {
        let (_dir, store) = setup_test_store();
        inventory::load(&store, "p1").unwrap();
        character::update(
            &store,
            "p1",
            &crate::game::types::CharacterUpdate {
                gold: Some(499),
                ..Default::default()
            },
        )
        .unwrap();

        let err = buy(&store, "p1", "item_10", 1).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientFunds {
                required: 500,
                available: 499
            }
        ));
        assert_eq!(character::get(&store, "p1").unwrap().gold, 499);
        assert_eq!(inventory::load(&store, "p1").unwrap().quantity_of("item_10"), 1);
    }

    #[test]
    fn buy_into_full_stack_charges_nothing() {
        let (_dir, store) = setup_test_store();
        let mut full = Inventory::empty("p1");
        full.add("item_6", u32::MAX - 10).unwrap();
        store
            .insert_if_absent(Collection::Inventories, &full.id, &full)
            .unwrap();

        let err = buy(&store, "p1", "item_6", 100).unwrap_err();
        assert!(matches!(err, GameError::InvalidQuantity(100)));
        assert_eq!(character::get(&store, "p1").unwrap().gold, 850);
        assert_eq!(
            inventory::load(&store, "p1").unwrap().quantity_of("item_6"),
            u32::MAX - 10
        );
    }

    #[test]
    fn sell_credits_half_price() {
        let (_dir, store) = setup_test_store();
        inventory::load(&store, "p1").unwrap();
        let sale = sell(&store, "p1", "item_7", 3).unwrap();
        assert_eq!(sale.proceeds, 30);
        assert_eq!(sale.gold, 880);
        assert!(inventory::load(&store, "p1").unwrap().entry("item_7").is_none());
    }

    #[test]
    fn sell_missing_item_changes_nothing() {
        let (_dir, store) = setup_test_store();
        inventory::load(&store, "p1").unwrap();
        let err = sell(&store, "p1", "item_1", 1).unwrap_err();
        assert!(matches!(err, GameError::NotInInventory(_)));
        assert_eq!(character::get(&store, "p1").unwrap().gold, 850);
    }
}
