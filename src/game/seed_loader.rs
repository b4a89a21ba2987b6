//! JSON seed loaders for data-driven catalog content.
//!
//! A seed directory may hold `items.json`, `enemies.json` and `quests.json`,
//! each a JSON array in the same camelCase shape the catalog types
//! serialize to. Admins can swap the starting catalog without recompiling.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::info;
use serde::de::DeserializeOwned;

use crate::game::errors::{GameError, StoreError};
use crate::game::types::{CatalogEnemy, CatalogItem, CatalogQuest};

pub const ITEMS_FILE: &str = "items.json";
pub const ENEMIES_FILE: &str = "enemies.json";
pub const QUESTS_FILE: &str = "quests.json";

/// Parse `dir/file` as a JSON array. `Ok(None)` when the file does not exist.
fn load_array<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Option<Vec<T>>, GameError> {
    let path = dir.join(file);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let records: Vec<T> = serde_json::from_str(&contents)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(Some(records))
}

/// Items file contents. A record with a negative price rejects the whole file.
pub fn load_items_from_dir<P: AsRef<Path>>(dir: P) -> Result<Option<Vec<CatalogItem>>, GameError> {
    let items: Option<Vec<CatalogItem>> = load_array(dir.as_ref(), ITEMS_FILE)?;
    if let Some(item) = items.iter().flatten().find(|item| item.price < 0) {
        return Err(StoreError::InvalidSeed(format!(
            "{} has negative price {}",
            item.id, item.price
        ))
        .into());
    }
    Ok(items)
}

pub fn load_enemies_from_dir<P: AsRef<Path>>(
    dir: P,
) -> Result<Option<Vec<CatalogEnemy>>, GameError> {
    load_array(dir.as_ref(), ENEMIES_FILE)
}

pub fn load_quests_from_dir<P: AsRef<Path>>(
    dir: P,
) -> Result<Option<Vec<CatalogQuest>>, GameError> {
    load_array(dir.as_ref(), QUESTS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{ItemType, QuestType};
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_none() {
        let dir = TempDir::new().expect("tempdir");
        assert!(load_items_from_dir(dir.path()).expect("load").is_none());
    }

    #[test]
    fn parses_catalog_json_shape() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(ITEMS_FILE),
            r#"[{"id":"elixir","name":"Elixir","type":"consumable","price":90,
                "effect":{"kind":"heal","value":200}}]"#,
        )
        .expect("write");
        std::fs::write(
            dir.path().join(QUESTS_FILE),
            r#"[{"id":"q_rat","title":"Rats","description":"Clear the cellar",
                "type":"kill","required":3,"reward":{"gold":10}}]"#,
        )
        .expect("write");

        let items = load_items_from_dir(dir.path()).expect("load").expect("present");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, ItemType::Consumable);
        assert_eq!(items[0].effect.as_ref().map(|e| e.value), Some(200));

        let quests = load_quests_from_dir(dir.path()).expect("load").expect("present");
        assert_eq!(quests[0].quest_type, QuestType::Kill);
        assert_eq!(quests[0].reward.experience, 0);
        assert!(quests[0].is_active);
    }

    #[test]
    fn negative_price_rejects_items_file() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(ITEMS_FILE),
            r#"[{"id":"relic","name":"Old Relic","type":"misc","price":7},
                {"id":"cursed","name":"Cursed Coin","type":"misc","price":-40}]"#,
        )
        .expect("write");

        let err = load_items_from_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            GameError::StoreUnavailable(StoreError::InvalidSeed(ref msg)) if msg.contains("cursed")
        ));
    }

    #[test]
    fn zero_price_is_accepted() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(ITEMS_FILE),
            r#"[{"id":"pebble","name":"Pebble","type":"misc","price":0}]"#,
        )
        .expect("write");

        let items = load_items_from_dir(dir.path()).expect("load").expect("present");
        assert_eq!(items[0].price, 0);
    }
}
