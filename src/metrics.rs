//! Process-wide operation counters.
//! Cheap relaxed atomics; read back as a [`Snapshot`] for status output.
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static CHARACTERS_CREATED: AtomicU64 = AtomicU64::new(0);
static INVENTORIES_CREATED: AtomicU64 = AtomicU64::new(0);
static PURCHASES: AtomicU64 = AtomicU64::new(0);
static SALES: AtomicU64 = AtomicU64::new(0);
static ITEMS_USED: AtomicU64 = AtomicU64::new(0);
static EQUIPS: AtomicU64 = AtomicU64::new(0);
static QUESTS_COMPLETED: AtomicU64 = AtomicU64::new(0);
static CONTENTION_RETRIES: AtomicU64 = AtomicU64::new(0);

pub fn inc_characters_created() {
    CHARACTERS_CREATED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_inventories_created() {
    INVENTORIES_CREATED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_purchases() {
    PURCHASES.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_sales() {
    SALES.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_items_used() {
    ITEMS_USED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_equips() {
    EQUIPS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_quests_completed() {
    QUESTS_COMPLETED.fetch_add(1, Ordering::Relaxed);
}
/// A compare-and-swap lost to a concurrent writer and was retried.
pub fn inc_contention_retries() {
    CONTENTION_RETRIES.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub characters_created: u64,
    pub inventories_created: u64,
    pub purchases: u64,
    pub sales: u64,
    pub items_used: u64,
    pub equips: u64,
    pub quests_completed: u64,
    pub contention_retries: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        characters_created: CHARACTERS_CREATED.load(Ordering::Relaxed),
        inventories_created: INVENTORIES_CREATED.load(Ordering::Relaxed),
        purchases: PURCHASES.load(Ordering::Relaxed),
        sales: SALES.load(Ordering::Relaxed),
        items_used: ITEMS_USED.load(Ordering::Relaxed),
        equips: EQUIPS.load(Ordering::Relaxed),
        quests_completed: QUESTS_COMPLETED.load(Ordering::Relaxed),
        contention_retries: CONTENTION_RETRIES.load(Ordering::Relaxed),
    }
}
