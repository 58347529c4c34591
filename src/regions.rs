//! Display regions that a polling session writes into.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::info;

/// Something that can replace the markup of a named region.
pub trait RegionSink: Send + Sync {
    fn set_markup(&self, region_id: &str, markup: &str);
}

/// A single write recorded by [`MemoryRegions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionWrite {
    pub region_id: String,
    pub markup: String,
}

#[derive(Debug, Default)]
struct RegionTable {
    current: HashMap<String, String>,
    writes: Vec<RegionWrite>,
}

/// In-memory regions keyed by id, keeping the full write history.
#[derive(Debug, Default)]
pub struct MemoryRegions {
    table: Mutex<RegionTable>,
}

impl MemoryRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current markup of a region, if it was ever written.
    pub fn markup(&self, region_id: &str) -> Option<String> {
        self.lock().current.get(region_id).cloned()
    }

    /// Every write so far, oldest first.
    pub fn writes(&self) -> Vec<RegionWrite> {
        self.lock().writes.clone()
    }

    pub fn writes_to(&self, region_id: &str) -> usize {
        self.lock()
            .writes
            .iter()
            .filter(|write| write.region_id == region_id)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, RegionTable> {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RegionSink for MemoryRegions {
    fn set_markup(&self, region_id: &str, markup: &str) {
        let mut table = self.lock();
        table
            .current
            .insert(region_id.to_string(), markup.to_string());
        table.writes.push(RegionWrite {
            region_id: region_id.to_string(),
            markup: markup.to_string(),
        });
    }
}

/// Regions rendered as log events, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRegions;

impl RegionSink for LogRegions {
    fn set_markup(&self, region_id: &str, markup: &str) {
        info!(region = %region_id, bytes = markup.len(), markup = %markup, "Region updated");
    }
}
