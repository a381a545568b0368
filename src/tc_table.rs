//! TC (topology control) advertisement table.

use std::collections::{HashMap, HashSet};

use crate::config::TC_TIMEOUT_TICKS;

#[derive(Debug, Clone)]
pub struct TcEntry {
    pub sequence: u32,
    pub timer: i32,
    pub mpr_selectors: HashSet<u32>,
}

#[derive(Debug, Default)]
pub struct TcTable {
    entries: HashMap<u32, TcEntry>,
}

impl TcTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, originator: u32) -> Option<&TcEntry> {
        self.entries.get(&originator)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &TcEntry)> {
        self.entries.iter()
    }

    /// Install or refresh an entry, gated on sequence number. Returns `true`
    /// if the entry was installed (new originator, or a strictly larger
    /// sequence than the one on file); a `false` return means the TC was
    /// dropped as a self-origin or a sequence regression/duplicate and must
    /// not be forwarded.
    pub fn process_tc(&mut self, self_id: u32, originator: u32, sequence: u32, mpr_selectors: &[u32]) -> bool {
        if originator == self_id {
            return false;
        }

        let should_install = match self.entries.get(&originator) {
            None => true,
            Some(entry) => sequence > entry.sequence,
        };

        if should_install {
            self.entries.insert(
                originator,
                TcEntry {
                    sequence,
                    timer: TC_TIMEOUT_TICKS,
                    mpr_selectors: mpr_selectors.iter().copied().collect(),
                },
            );
        }

        should_install
    }

    /// Decrement every entry's timer and remove expired entries. Returns
    /// whether any entry was evicted.
    pub fn tick_timers(&mut self) -> bool {
        for entry in self.entries.values_mut() {
            entry.timer -= 1;
        }
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.timer >= 0);
        self.entries.len() != before
    }
}
