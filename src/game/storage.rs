use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::IVec;

use crate::game::catalog::{self, SeedReport, SeedSource};
use crate::game::errors::GameError;
use crate::game::types::{
    CatalogEnemy, CatalogItem, CatalogQuest, Character, Inventory, PlayerQuest,
    CHARACTER_SCHEMA_VERSION, INVENTORY_SCHEMA_VERSION, PLAYER_QUEST_SCHEMA_VERSION,
};
use crate::metrics;

/// Named document collections, one sled tree each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Items,
    Enemies,
    Quests,
    Characters,
    Inventories,
    PlayerQuests,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Items => "items",
            Collection::Enemies => "enemies",
            Collection::Quests => "quests",
            Collection::Characters => "characters",
            Collection::Inventories => "inventories",
            Collection::PlayerQuests => "player_quests",
        }
    }
}

/// A value that can be stored as a document.
pub trait Record: Serialize + DeserializeOwned {
    /// Reject documents written under a different schema.
    fn check_schema(&self) -> Result<(), GameError> {
        Ok(())
    }
}

fn check_version(entity: &'static str, expected: u8, found: u8) -> Result<(), GameError> {
    if found != expected {
        return Err(GameError::SchemaMismatch {
            entity,
            expected,
            found,
        });
    }
    Ok(())
}

impl Record for CatalogItem {}
impl Record for CatalogEnemy {}
impl Record for CatalogQuest {}

impl Record for Character {
    fn check_schema(&self) -> Result<(), GameError> {
        check_version("character", CHARACTER_SCHEMA_VERSION, self.schema_version)
    }
}

impl Record for Inventory {
    fn check_schema(&self) -> Result<(), GameError> {
        check_version("inventory", INVENTORY_SCHEMA_VERSION, self.schema_version)
    }
}

impl Record for PlayerQuest {
    fn check_schema(&self) -> Result<(), GameError> {
        check_version("player quest", PLAYER_QUEST_SCHEMA_VERSION, self.schema_version)
    }
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct GameStoreBuilder {
    path: PathBuf,
    ensure_catalog_seed: bool,
    seed_dir: Option<PathBuf>,
}

impl GameStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ensure_catalog_seed: true,
            seed_dir: None,
        }
    }

    /// Opt out of seeding the catalog during initialization (useful for targeted tests).
    pub fn without_catalog_seed(mut self) -> Self {
        self.ensure_catalog_seed = false;
        self
    }

    /// Seed from JSON files in `dir` instead of the built-in dataset.
    pub fn with_seed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.seed_dir = Some(dir.into());
        self
    }

    pub fn open(self) -> Result<GameStore, GameError> {
        let store = GameStore::open_at(&self.path)?;
        if self.ensure_catalog_seed {
            let source = match self.seed_dir {
                Some(dir) => SeedSource::Directory(dir),
                None => SeedSource::Builtin,
            };
            catalog::ensure_seeded(&store, &source);
        }
        Ok(store)
    }
}

/// Sled-backed document store for catalog data and per-player aggregates.
///
/// The handle is cheap to share by reference across threads; every
/// operation in this crate takes it explicitly.
pub struct GameStore {
    _db: sled::Db,
    items: sled::Tree,
    enemies: sled::Tree,
    quests: sled::Tree,
    characters: sled::Tree,
    inventories: sled::Tree,
    player_quests: sled::Tree,
}

impl GameStore {
    /// Open (or create) the store rooted at `path` and seed the built-in
    /// catalog into any empty catalog collection.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        GameStoreBuilder::new(path.as_ref()).open()
    }

    fn open_at(path: &Path) -> Result<Self, GameError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        let store = Self {
            items: db.open_tree(Collection::Items.name())?,
            enemies: db.open_tree(Collection::Enemies.name())?,
            quests: db.open_tree(Collection::Quests.name())?,
            characters: db.open_tree(Collection::Characters.name())?,
            inventories: db.open_tree(Collection::Inventories.name())?,
            player_quests: db.open_tree(Collection::PlayerQuests.name())?,
            _db: db,
        };
        info!("Opened game store at {}", path.display());
        Ok(store)
    }

    fn tree(&self, collection: Collection) -> &sled::Tree {
        match collection {
            Collection::Items => &self.items,
            Collection::Enemies => &self.enemies,
            Collection::Quests => &self.quests,
            Collection::Characters => &self.characters,
            Collection::Inventories => &self.inventories,
            Collection::PlayerQuests => &self.player_quests,
        }
    }

    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, GameError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: Record>(bytes: &IVec) -> Result<T, GameError> {
        let record: T = bincode::deserialize(bytes)?;
        record.check_schema()?;
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Document primitives
    // ------------------------------------------------------------------

    /// Fetch a document by key.
    pub fn get_doc<T: Record>(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<T>, GameError> {
        match self.tree(collection).get(key.as_bytes())? {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Insert `doc` only if `key` is unused. Returns false when another
    /// writer got there first; the caller should re-read.
    pub fn insert_if_absent<T: Record>(
        &self,
        collection: Collection,
        key: &str,
        doc: &T,
    ) -> Result<bool, GameError> {
        let tree = self.tree(collection);
        let bytes = Self::serialize(doc)?;
        match tree.compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(bytes))? {
            Ok(()) => {
                tree.flush()?;
                Ok(true)
            }
            Err(_) => {
                debug!("{} {} already present, insert skipped", collection.name(), key);
                Ok(false)
            }
        }
    }

    /// Atomically mutate one document.
    ///
    /// `f` runs against the freshly read document and the result is written
    /// back with compare-and-swap; on contention the read and `f` are
    /// repeated. An error from `f` aborts without writing. Returns `None`
    /// when the document does not exist.
    pub fn modify<T, R, F>(
        &self,
        collection: Collection,
        key: &str,
        mut f: F,
    ) -> Result<Option<(T, R)>, GameError>
    where
        T: Record,
        F: FnMut(&mut T) -> Result<R, GameError>,
    {
        let tree = self.tree(collection);
        loop {
            let Some(current) = tree.get(key.as_bytes())? else {
                return Ok(None);
            };
            let mut doc: T = Self::deserialize(&current)?;
            let outcome = f(&mut doc)?;
            let next = Self::serialize(&doc)?;
            match tree.compare_and_swap(key.as_bytes(), Some(&current), Some(next))? {
                Ok(()) => {
                    tree.flush()?;
                    return Ok(Some((doc, outcome)));
                }
                Err(_) => {
                    metrics::inc_contention_retries();
                    debug!("Contention on {} {}, retrying", collection.name(), key);
                }
            }
        }
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: Collection) -> Result<usize, GameError> {
        let tree = self.tree(collection);
        let mut count = 0usize;
        for entry in tree.iter() {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Write many documents in one atomic batch.
    pub fn bulk_insert<T: Record>(
        &self,
        collection: Collection,
        docs: &[(String, T)],
    ) -> Result<usize, GameError> {
        let tree = self.tree(collection);
        let mut batch = sled::Batch::default();
        for (key, doc) in docs {
            batch.insert(key.as_bytes(), Self::serialize(doc)?);
        }
        tree.apply_batch(batch)?;
        tree.flush()?;
        Ok(docs.len())
    }

    /// All documents whose key starts with `prefix`, in key order.
    pub fn scan_prefix<T: Record>(
        &self,
        collection: Collection,
        prefix: &str,
    ) -> Result<Vec<T>, GameError> {
        self.tree(collection)
            .scan_prefix(prefix.as_bytes())
            .map(|entry| {
                entry
                    .map_err(GameError::from)
                    .and_then(|(_key, value)| Self::deserialize(&value))
            })
            .collect()
    }

    /// Every document in a collection, in key order.
    pub fn list<T: Record>(&self, collection: Collection) -> Result<Vec<T>, GameError> {
        self.scan_prefix(collection, "")
    }

    // ------------------------------------------------------------------
    // Catalog lookups
    // ------------------------------------------------------------------

    pub fn get_item(&self, item_id: &str) -> Result<CatalogItem, GameError> {
        self.get_doc(Collection::Items, item_id)?
            .ok_or_else(|| GameError::NotFound(format!("item: {}", item_id)))
    }

    pub fn get_enemy(&self, enemy_id: &str) -> Result<CatalogEnemy, GameError> {
        self.get_doc(Collection::Enemies, enemy_id)?
            .ok_or_else(|| GameError::NotFound(format!("enemy: {}", enemy_id)))
    }

    pub fn get_quest(&self, quest_id: &str) -> Result<CatalogQuest, GameError> {
        self.get_doc(Collection::Quests, quest_id)?
            .ok_or_else(|| GameError::NotFound(format!("quest: {}", quest_id)))
    }

    pub fn list_items(&self) -> Result<Vec<CatalogItem>, GameError> {
        self.list(Collection::Items)
    }

    pub fn list_enemies(&self) -> Result<Vec<CatalogEnemy>, GameError> {
        self.list(Collection::Enemies)
    }

    pub fn list_quests(&self) -> Result<Vec<CatalogQuest>, GameError> {
        self.list(Collection::Quests)
    }

    /// Re-run catalog seeding against this store.
    pub fn ensure_seeded(&self, source: &SeedSource) -> SeedReport {
        catalog::ensure_seeded(self, source)
    }
}
