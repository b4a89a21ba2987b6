use thiserror::Error;

/// Low-level failures raised by the embedded document store.
///
/// These never reach callers of the aggregate operations directly; they are
/// folded into [`GameError::StoreUnavailable`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, seed files, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON seed data.
    #[error("seed data error: {0}")]
    Json(#[from] serde_json::Error),

    /// Seed records that parse but break a catalog rule.
    #[error("invalid seed record: {0}")]
    InvalidSeed(String),
}

/// Errors surfaced by game-state operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// Referenced catalog item, quest, enemy or player quest is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Gold on hand is below the required total.
    #[error("not enough gold: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Removal target is absent or the requested quantity is not held.
    #[error("item not in inventory: {0}")]
    NotInInventory(String),

    /// The item type has no equipment slot.
    #[error("item cannot be equipped: {0}")]
    NotEquippable(String),

    /// Quantities must be at least one.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Underlying store I/O or encoding failure.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

impl From<sled::Error> for GameError {
    fn from(err: sled::Error) -> Self {
        GameError::StoreUnavailable(StoreError::Sled(err))
    }
}

impl From<bincode::Error> for GameError {
    fn from(err: bincode::Error) -> Self {
        GameError::StoreUnavailable(StoreError::Bincode(err))
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        GameError::StoreUnavailable(StoreError::Io(err))
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::StoreUnavailable(StoreError::Json(err))
    }
}

impl GameError {
    /// HTTP status an outer request handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            GameError::NotFound(_) => 404,
            GameError::InsufficientFunds { .. }
            | GameError::NotInInventory(_)
            | GameError::NotEquippable(_)
            | GameError::InvalidQuantity(_) => 400,
            GameError::StoreUnavailable(_) => 503,
            GameError::SchemaMismatch { .. } => 500,
        }
    }

    /// True for failures caused by the request rather than the store.
    pub fn is_rejection(&self) -> bool {
        self.status_code() < 500
    }
}
