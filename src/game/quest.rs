//! Per-player quest progress and the reward transaction.
//!
//! A player quest only ever moves from open (`active`, not `completed`) to
//! completed. The flip happens inside [`GameStore::modify`], so when two
//! completions race only one of them sees an open quest and grants rewards.

use log::{info, warn};
use serde::Serialize;

use crate::game::character;
use crate::game::errors::GameError;
use crate::game::inventory;
use crate::game::storage::{Collection, GameStore};
use crate::game::types::{CatalogQuest, PlayerQuest, QuestView};
use crate::logutil::escape_log;
use crate::metrics;

/// Store key of one player's progress on one quest.
///
/// The player id is length-prefixed (`{len}:{player}:{quest}`), so the
/// prefix scan for one player never matches keys of a player whose id
/// merely starts with it.
pub fn quest_key(player_id: &str, quest_id: &str) -> String {
    format!("{}{}", player_prefix(player_id), quest_id)
}

fn player_prefix(player_id: &str) -> String {
    format!("{}:{}:", player_id.len(), player_id)
}

/// What a completion granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRewards {
    pub quest_id: String,
    pub experience: i64,
    pub gold: i64,
    pub item: Option<String>,
    pub message: String,
}

/// The player's quests joined with their catalog definitions.
///
/// A player without the starter set gets it first. Progress records whose
/// quest is missing from the catalog are left out.
pub fn list_for_player(store: &GameStore, player_id: &str) -> Result<Vec<QuestView>, GameError> {
    let prefix = player_prefix(player_id);
    let mut progress: Vec<PlayerQuest> = store.scan_prefix(Collection::PlayerQuests, &prefix)?;
    let starters = PlayerQuest::starter_set(player_id);
    let incomplete = starters
        .iter()
        .any(|starter| !progress.iter().any(|pq| pq.quest_id == starter.quest_id));
    if incomplete {
        // Completes a starter set another first call may be halfway through.
        let mut created = 0;
        for quest in &starters {
            let key = quest_key(player_id, &quest.quest_id);
            if store.insert_if_absent(Collection::PlayerQuests, &key, quest)? {
                created += 1;
            }
        }
        if created > 0 {
            info!("Started {} default quests for {}", created, escape_log(player_id));
        }
        progress = store.scan_prefix(Collection::PlayerQuests, &prefix)?;
    }

    let mut views = Vec::with_capacity(progress.len());
    for pq in progress {
        match store.get_doc::<CatalogQuest>(Collection::Quests, &pq.quest_id)? {
            Some(quest) => views.push(QuestView::join(quest, pq)),
            None => warn!("Player quest {} references unknown quest {}", pq.id, pq.quest_id),
        }
    }
    Ok(views)
}

/// Complete an open quest and pay out its reward.
///
/// Fails with `NotFound` when the quest is not in the catalog, or when the
/// player has no open progress on it (never started or already completed).
/// The reward is granted only by the call that flipped the quest.
pub fn complete(store: &GameStore, player_id: &str, quest_id: &str) -> Result<QuestRewards, GameError> {
    let quest = store.get_quest(quest_id)?;
    let key = quest_key(player_id, quest_id);
    let not_open = || GameError::NotFound(format!("active quest {} for {}", quest_id, player_id));

    store
        .modify(Collection::PlayerQuests, &key, |pq: &mut PlayerQuest| {
            if !pq.is_open() {
                return Err(not_open());
            }
            pq.mark_complete();
            Ok(())
        })?
        .ok_or_else(not_open)?;

    let reward = quest.reward;
    character::grant(store, player_id, reward.experience, reward.gold).map_err(|e| {
        warn!(
            "Quest {} completed for {} but reward not granted: {}",
            quest_id,
            escape_log(player_id),
            e
        );
        e
    })?;
    if let Some(item_id) = &reward.item {
        inventory::add_item(store, player_id, item_id, 1).map_err(|e| {
            warn!(
                "Quest {} completed for {} but item {} not granted: {}",
                quest_id,
                escape_log(player_id),
                item_id,
                e
            );
            e
        })?;
    }

    metrics::inc_quests_completed();
    info!("{} completed {}", escape_log(player_id), quest_id);
    Ok(QuestRewards {
        quest_id: quest.id,
        experience: reward.experience,
        gold: reward.gold,
        item: reward.item,
        message: format!("Quest \"{}\" completed!", quest.title),
    })
}
