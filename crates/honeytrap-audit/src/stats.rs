//! Aggregate statistics over recorded attacks.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::event::{AttackEvent, AttackKind};

/// Read-only aggregate over the full event list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of events.
    pub total_attacks: usize,
    /// Events per kind.
    pub event_types: BTreeMap<AttackKind, usize>,
    /// Events per target file name.
    pub targeted_files: BTreeMap<String, usize>,
    /// Events carrying a valid timestamp.
    pub recent_attacks_count: usize,
    /// File name with the most events; ties go to the first one seen.
    pub most_targeted_file: Option<String>,
    /// Kind with the most events; ties go to the first one seen.
    pub most_common_event: Option<AttackKind>,
}

impl Stats {
    /// Aggregate `events` in storage order.
    #[must_use]
    pub fn from_events(events: &[AttackEvent]) -> Self {
        let mut kinds = Tally::default();
        let mut files = Tally::default();

        for event in events {
            kinds.add(event.kind);
            files.add(event.target_name.clone());
        }

        Self {
            total_attacks: events.len(),
            most_common_event: kinds.leader(),
            most_targeted_file: files.leader(),
            event_types: kinds.counts.into_iter().collect(),
            targeted_files: files.counts.into_iter().collect(),
            // Timestamps are validated on load, so every stored event counts.
            recent_attacks_count: events.len(),
        }
    }
}

/// Counter that remembers first-seen order for tie breaking.
struct Tally<K> {
    order: Vec<K>,
    counts: HashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            counts: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash + Ord> Tally<K> {
    fn add(&mut self, key: K) {
        let count = self.counts.entry(key.clone()).or_insert_with(|| {
            self.order.push(key);
            0
        });
        *count = count.saturating_add(1);
    }

    fn leader(&self) -> Option<K> {
        let mut best: Option<(&K, usize)> = None;
        for key in &self.order {
            let count = self.counts.get(key).copied().unwrap_or(0);
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((key, count));
            }
        }
        best.map(|(key, _)| key.clone())
    }
}
