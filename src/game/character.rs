//! Character aggregate: one sheet per player, created on first access.

use log::{debug, info};

use crate::game::errors::GameError;
use crate::game::storage::{Collection, GameStore};
use crate::game::types::{Character, CharacterUpdate};
use crate::logutil::escape_log;
use crate::metrics;

/// Fetch a player's character, creating the starter sheet if none exists.
///
/// Concurrent first calls race on an insert-if-absent; the loser re-reads
/// the winner's sheet.
pub fn get(store: &GameStore, player_id: &str) -> Result<Character, GameError> {
    if let Some(character) = store.get_doc(Collection::Characters, player_id)? {
        return Ok(character);
    }
    let fresh = Character::starter(player_id);
    if store.insert_if_absent(Collection::Characters, player_id, &fresh)? {
        metrics::inc_characters_created();
        info!("Created character for {}", escape_log(player_id));
        return Ok(fresh);
    }
    store
        .get_doc(Collection::Characters, player_id)?
        .ok_or_else(|| GameError::NotFound(format!("character: {}", player_id)))
}

/// Apply the present fields of `updates`, stamp `updated_at`, and return
/// the stored result.
pub fn update(
    store: &GameStore,
    player_id: &str,
    updates: &CharacterUpdate,
) -> Result<Character, GameError> {
    let (character, ()) = mutate(store, player_id, |character| {
        updates.apply(character);
        Ok(())
    })?;
    if let Some(name) = &updates.name {
        debug!("Character {} renamed to {}", escape_log(player_id), escape_log(name));
    }
    Ok(character)
}

/// Atomically run `f` against the player's character, creating the sheet
/// first if needed. `f` may abort with an error, leaving the sheet as it was.
pub fn mutate<R>(
    store: &GameStore,
    player_id: &str,
    mut f: impl FnMut(&mut Character) -> Result<R, GameError>,
) -> Result<(Character, R), GameError> {
    get(store, player_id)?;
    store
        .modify(Collection::Characters, player_id, |character: &mut Character| {
            let outcome = f(character)?;
            character.touch();
            Ok(outcome)
        })?
        .ok_or_else(|| GameError::NotFound(format!("character: {}", player_id)))
}

/// Add experience and gold in one atomic step.
pub fn grant(
    store: &GameStore,
    player_id: &str,
    experience: i64,
    gold: i64,
) -> Result<Character, GameError> {
    let (character, ()) = mutate(store, player_id, |character| {
        character.experience = character.experience.saturating_add(experience);
        character.gold = character.gold.saturating_add(gold);
        Ok(())
    })?;
    Ok(character)
}

/// Remove `amount` gold, refusing when the character holds less.
pub fn debit_gold(store: &GameStore, player_id: &str, amount: i64) -> Result<Character, GameError> {
    let (character, ()) = mutate(store, player_id, |character| {
        if character.gold < amount {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: character.gold,
            });
        }
        character.gold -= amount;
        Ok(())
    })?;
    Ok(character)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::storage::GameStoreBuilder;
    use crate::game::types::{CharacterStats, Equipment};
    use tempfile::TempDir;

    fn setup_test_store() -> (TempDir, GameStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStoreBuilder::new(dir.path())
            .without_catalog_seed()
            .open()
            .expect("store");
        (dir, store)
    }

    #[test]
    fn first_get_creates_starter_sheet() {
        let (_dir, store) = setup_test_store();
        let character = get(&store, "p1").unwrap();
        assert_eq!(character.id, "p1");
        assert_eq!(character.level, 12);
        assert_eq!(character.gold, 850);
        assert_eq!(character.equipment.weapon.as_deref(), Some("item_1"));

        let again = get(&store, "p1").unwrap();
        assert_eq!(again, character);
        assert_eq!(store.count(Collection::Characters).unwrap(), 1);
    }

    #[test]
    fn update_touches_only_given_fields() {
        let (_dir, store) = setup_test_store();
        let before = get(&store, "p1").unwrap();
        let updates = CharacterUpdate {
            name: Some("Ilka".to_string()),
            stats: Some(CharacterStats::default()),
            equipment: Some(Equipment::default()),
            ..Default::default()
        };
        let after = update(&store, "p1", &updates).unwrap();

        assert_eq!(after.name, "Ilka");
        assert_eq!(after.stats.strength, 10);
        assert!(after.equipment.weapon.is_none());
        assert_eq!(after.gold, before.gold);
        assert_eq!(after.experience, before.experience);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(get(&store, "p1").unwrap(), after);
    }

    #[test]
    fn update_creates_missing_character_first() {
        let (_dir, store) = setup_test_store();
        let updates = CharacterUpdate {
            gold: Some(5),
            ..Default::default()
        };
        let character = update(&store, "newcomer", &updates).unwrap();
        assert_eq!(character.gold, 5);
        assert_eq!(character.level, 12);
    }

    #[test]
    fn update_does_not_validate_ranges() {
        let (_dir, store) = setup_test_store();
        let updates = CharacterUpdate {
            gold: Some(-40),
            health: Some(500),
            ..Default::default()
        };
        let character = update(&store, "p1", &updates).unwrap();
        assert_eq!(character.gold, -40);
        assert_eq!(character.health, 500);
    }

    #[test]
    fn debit_refuses_overdraw() {
        let (_dir, store) = setup_test_store();
        let err = debit_gold(&store, "p1", 851).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientFunds {
                required: 851,
                available: 850
            }
        ));
        assert_eq!(get(&store, "p1").unwrap().gold, 850);

        let character = debit_gold(&store, "p1", 850).unwrap();
        assert_eq!(character.gold, 0);
    }

    #[test]
    fn grant_adds_experience_and_gold() {
        let (_dir, store) = setup_test_store();
        let character = grant(&store, "p1", 500, 100).unwrap();
        assert_eq!(character.experience, 2900);
        assert_eq!(character.gold, 950);
    }
}
