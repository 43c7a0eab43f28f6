use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::plan::{find_day, join_chunks, preamble, segment};
use crate::wire::{DayChunk, PlanSections, Provenance};

/// Source of truth for one generated plan.
///
/// Original day chunks are fixed at construction. Each day number has at most
/// one override slot; writing it again replaces the previous replan
/// (last writer wins). Overrides are behind a lock so replans of different
/// days may commit concurrently through a shared `Arc<PlanStore>`.
#[derive(Debug)]
pub struct PlanStore {
    id: Uuid,
    sections: PlanSections,
    preamble: String,
    days: Vec<DayChunk>,
    overrides: RwLock<HashMap<u32, DayChunk>>,
}

impl PlanStore {
    pub fn new(sections: PlanSections) -> Self {
        let days = segment(&sections.itinerary);
        let preamble = preamble(&sections.itinerary).to_string();
        let id = Uuid::new_v4();
        debug!(%id, days = days.len(), preamble_chars = preamble.len(), "PlanStore::new");
        Self { id, sections, preamble, days, overrides: RwLock::new(HashMap::new()) }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sections(&self) -> &PlanSections {
        &self.sections
    }

    pub fn originals(&self) -> &[DayChunk] {
        &self.days
    }

    /// Distinct day numbers in order of first appearance.
    pub fn day_numbers(&self) -> Vec<u32> {
        let mut out: Vec<u32> = Vec::with_capacity(self.days.len());
        for c in &self.days {
            if !out.contains(&c.day) {
                out.push(c.day);
            }
        }
        out
    }

    pub fn original(&self, day: u32) -> Option<&DayChunk> {
        find_day(&self.days, day)
    }

    /// Override if present, else the original chunk.
    pub fn active(&self, day: u32) -> Option<DayChunk> {
        if let Some(o) = self.overrides.read().get(&day) {
            return Some(o.clone());
        }
        self.original(day).cloned()
    }

    pub fn provenance(&self, day: u32) -> Option<Provenance> {
        if self.overrides.read().contains_key(&day) {
            Some(Provenance::Modified)
        } else if self.original(day).is_some() {
            Some(Provenance::Original)
        } else {
            None
        }
    }

    /// Store `chunk` as the override for its day, returning the one it replaced.
    pub fn set_override(&self, chunk: DayChunk) -> Option<DayChunk> {
        debug!(day = chunk.day, chars = chunk.text.len(), "PlanStore::set_override");
        self.overrides.write().insert(chunk.day, chunk)
    }

    pub fn override_count(&self) -> usize {
        self.overrides.read().len()
    }

    /// Every day chunk in itinerary order, with overrides substituted.
    ///
    /// Only the first chunk of a duplicated day number is substituted, matching
    /// first-match lookups.
    pub fn active_chunks(&self) -> Vec<DayChunk> {
        let overrides = self.overrides.read();
        let mut substituted: Vec<u32> = Vec::new();
        self.days
            .iter()
            .map(|c| match overrides.get(&c.day) {
                Some(o) if !substituted.contains(&c.day) => {
                    substituted.push(c.day);
                    o.clone()
                }
                _ => c.clone(),
            })
            .collect()
    }

    /// The itinerary as it currently reads: preamble, then the active chunks.
    /// Without any day header this is the whole itinerary section. Map,
    /// prompt context and export all read the plan through here.
    pub fn active_itinerary(&self) -> String {
        let days = join_chunks(&self.active_chunks());
        match (self.preamble.is_empty(), days.is_empty()) {
            (true, _) => days,
            (false, true) => self.preamble.clone(),
            (false, false) => format!("{}\n\n{}", self.preamble, days),
        }
    }

    /// Summary plus the active itinerary, handed to packing-list and chat prompts.
    pub fn context(&self) -> String {
        format!("SUMMARY: {}\nITINERARY: {}", self.sections.summary.trim(), self.active_itinerary())
    }
}
