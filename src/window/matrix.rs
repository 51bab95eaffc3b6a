use crate::metrics::Distribution;
use std::collections::{BTreeMap, HashMap};

/// Entity → window index → contribution total.
///
/// Entities keep their first-seen order. Windows where an entity was not
/// active are simply absent and read as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionMatrix {
    entities: Vec<(String, BTreeMap<usize, u64>)>,
    index: HashMap<String, usize>,
}

impl ContributionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, entity: &str, window: usize, weight: u64) {
        let slot = match self.index.get(entity) {
            Some(&slot) => slot,
            None => {
                self.entities.push((entity.to_string(), BTreeMap::new()));
                self.index.insert(entity.to_string(), self.entities.len() - 1);
                self.entities.len() - 1
            }
        };
        *self.entities[slot].1.entry(window).or_insert(0) += weight;
    }

    /// Drop every window at or after `windows`, and entities left with none.
    pub(crate) fn truncate_windows(&mut self, windows: usize) {
        for (_, totals) in &mut self.entities {
            totals.retain(|window, _| *window < windows);
        }
        self.entities.retain(|(_, totals)| !totals.is_empty());
        self.index = self
            .entities
            .iter()
            .enumerate()
            .map(|(slot, (entity, _))| (entity.clone(), slot))
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|(entity, _)| entity.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<usize, u64>)> {
        self.entities.iter().map(|(entity, totals)| (entity.as_str(), totals))
    }

    pub fn get(&self, entity: &str, window: usize) -> u64 {
        self.index
            .get(entity)
            .and_then(|&slot| self.entities[slot].1.get(&window))
            .copied()
            .unwrap_or(0)
    }

    /// Every entity total recorded for `window` (including explicit zeros).
    pub fn window_totals(&self, window: usize) -> impl Iterator<Item = (&str, u64)> {
        self.entities.iter().filter_map(move |(entity, totals)| {
            totals.get(&window).map(|total| (entity.as_str(), *total))
        })
    }

    pub fn window_total(&self, window: usize) -> u64 {
        self.window_totals(window).map(|(_, total)| total).sum()
    }

    pub fn distribution(&self, window: usize) -> Distribution {
        Distribution::from_counts(self.window_totals(window).map(|(_, total)| total))
    }
}
