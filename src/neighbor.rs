//! Neighbor table: 1-hop neighbor state and MPR election.

use std::collections::{HashMap, HashSet};

use crate::config::NEIGHBOR_TIMEOUT_TICKS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborStatus {
    Asymmetric,
    Symmetric,
}

#[derive(Debug, Clone)]
pub struct NeighborRecord {
    pub status: NeighborStatus,
    pub timer: i32,
    pub is_mpr: bool,
    pub is_mpr_selector: bool,
    pub two_hop_set: HashSet<u32>,
}

impl NeighborRecord {
    fn new() -> Self {
        Self {
            status: NeighborStatus::Asymmetric,
            timer: NEIGHBOR_TIMEOUT_TICKS,
            is_mpr: false,
            is_mpr_selector: false,
            two_hop_set: HashSet::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct NeighborTable {
    records: HashMap<u32, NeighborRecord>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u32) -> Option<&NeighborRecord> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_mpr_selector(&self, id: u32) -> bool {
        self.records.get(&id).is_some_and(|record| record.is_mpr_selector)
    }

    /// 1-hop neighbors confirmed SYMMETRIC — the direct edges from `self` in
    /// the routing graph.
    pub fn symmetric_ids(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter(|(_, record)| record.status == NeighborStatus::Symmetric)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Neighbors who have selected this node as one of their MPRs — the set
    /// advertised in this node's own TC.
    pub fn mpr_selector_ids(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter(|(_, record)| record.is_mpr_selector)
            .map(|(id, _)| *id)
            .collect()
    }

    /// 1-hop neighbors not yet confirmed SYMMETRIC — this node's own UNIDIR
    /// list in its next HELLO.
    pub fn asymmetric_ids(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter(|(_, record)| record.status == NeighborStatus::Asymmetric)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Neighbors this node has elected as its own MPRs — this node's own MPR
    /// list in its next HELLO.
    pub fn mpr_ids(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter(|(_, record)| record.is_mpr)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Process one HELLO from `sender`: create or refresh its record,
    /// promote it to symmetric on mutual reception, update its MPR-selector
    /// flag and two-hop set. Returns whether topology-affecting state
    /// changed.
    pub fn process_hello(
        &mut self,
        self_id: u32,
        sender: u32,
        unidirectional: &[u32],
        bidirectional: &[u32],
        mpr: &[u32],
    ) -> bool {
        let mut changed = false;

        let record = self.records.entry(sender).or_insert_with(|| {
            changed = true;
            NeighborRecord::new()
        });

        record.timer = NEIGHBOR_TIMEOUT_TICKS;

        let heard_by_sender = unidirectional.contains(&self_id) || bidirectional.contains(&self_id);
        if heard_by_sender && record.status != NeighborStatus::Symmetric {
            record.status = NeighborStatus::Symmetric;
            changed = true;
        }

        if mpr.contains(&self_id) && !record.is_mpr_selector {
            record.is_mpr_selector = true;
            changed = true;
        }

        let new_two_hop: HashSet<u32> = bidirectional.iter().copied().filter(|id| *id != self_id).collect();
        if new_two_hop != record.two_hop_set {
            record.two_hop_set = new_two_hop;
            changed = true;
        }

        changed
    }

    /// Greedy MPR election over the 2-hop neighborhood.
    ///
    /// When `sticky` is false, `is_mpr` flags are cleared before the pass —
    /// the textbook OLSR behavior. When `sticky` is true, flags from a prior
    /// election are left set and only ever added to, never cleared, see
    /// `config::NodeAgentConfig::sticky_mpr_flags`.
    pub fn elect_mprs(&mut self, sticky: bool) {
        if !sticky {
            for record in self.records.values_mut() {
                record.is_mpr = false;
            }
        }

        let one_hop_ids: HashSet<u32> = self.records.keys().copied().collect();
        let mut uncovered: HashSet<u32> = HashSet::new();
        for record in self.records.values() {
            uncovered.extend(record.two_hop_set.iter().copied());
        }
        for id in &one_hop_ids {
            uncovered.remove(id);
        }

        while !uncovered.is_empty() {
            let mut candidate_ids: Vec<u32> = self.records.keys().copied().collect();
            candidate_ids.sort_unstable();

            let mut best: Option<(u32, usize)> = None;
            for id in candidate_ids {
                let overlap = self.records[&id].two_hop_set.intersection(&uncovered).count();
                if overlap == 0 {
                    continue;
                }
                match best {
                    Some((_, best_overlap)) if overlap <= best_overlap => {}
                    _ => best = Some((id, overlap)),
                }
            }

            let Some((winner_id, _)) = best else {
                // Every element of `uncovered` is derived from a 1-hop
                // neighbor's own two-hop set, so this should not happen; bail
                // out rather than loop forever on an inconsistent table.
                break;
            };

            let winner_two_hop = self.records[&winner_id].two_hop_set.clone();
            self.records.get_mut(&winner_id).unwrap().is_mpr = true;
            for id in &winner_two_hop {
                uncovered.remove(id);
            }
        }
    }

    /// Decrement every neighbor timer and evict expired records. Returns
    /// whether any record was evicted.
    pub fn tick_timers(&mut self) -> bool {
        for record in self.records.values_mut() {
            record.timer -= 1;
        }
        let before = self.records.len();
        self.records.retain(|_, record| record.timer >= 0);
        self.records.len() != before
    }
}
