use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::GenerationError;
use crate::generate::{GeneratedPlan, TripRequest};
use crate::ledger::ExpenseLedger;
use crate::store::PlanStore;

pub const GREETING: &str = "I've loaded your new trip plan! Ask me anything about it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// State of one interactive run.
///
/// Everything derived from a plan (replans, packing list, local guide, journal,
/// chat) belongs to that plan and is dropped when a new one is adopted. The
/// expense ledger belongs to the traveller and survives.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    trip: Option<TripRequest>,
    store: Option<Arc<PlanStore>>,
    packing_list: Option<String>,
    local_guide: Option<String>,
    chat: Vec<ChatMessage>,
    journal: BTreeMap<u32, String>,
    ledger: ExpenseLedger,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            trip: None,
            store: None,
            packing_list: None,
            local_guide: None,
            chat: Vec::new(),
            journal: BTreeMap::new(),
            ledger: ExpenseLedger::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replace the current plan. The old store is dropped here; a replan still
    /// holding it commits to that old store and is never seen again.
    pub fn adopt_plan(&mut self, trip: TripRequest, plan: GeneratedPlan) -> Arc<PlanStore> {
        let store = Arc::new(PlanStore::new(plan.sections));
        info!(store = %store.id(), days = store.day_numbers().len(), "session: adopted new plan");
        self.trip = Some(trip);
        self.store = Some(store.clone());
        self.packing_list = None;
        self.local_guide = None;
        self.journal.clear();
        self.chat = vec![ChatMessage { role: Role::Assistant, content: GREETING.to_string() }];
        store
    }

    pub fn trip(&self) -> Option<&TripRequest> {
        self.trip.as_ref()
    }

    pub fn store(&self) -> Option<Arc<PlanStore>> {
        self.store.clone()
    }

    pub fn require_plan(&self) -> Result<(Arc<PlanStore>, &TripRequest), GenerationError> {
        match (&self.store, &self.trip) {
            (Some(s), Some(t)) => Ok((s.clone(), t)),
            _ => Err(GenerationError::PreconditionViolation("no plan has been generated yet".into())),
        }
    }

    /// `SUMMARY: …\nITINERARY: …` for the current plan, built from active chunks.
    pub fn itinerary_context(&self) -> Option<String> {
        self.store.as_ref().map(|s| s.context())
    }

    pub fn packing_list(&self) -> Option<&str> {
        self.packing_list.as_deref()
    }

    pub fn set_packing_list(&mut self, list: String) {
        self.packing_list = Some(list);
    }

    pub fn local_guide(&self) -> Option<&str> {
        self.local_guide.as_deref()
    }

    pub fn set_local_guide(&mut self, guide: String) {
        self.local_guide = Some(guide);
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn push_chat(&mut self, role: Role, content: impl Into<String>) {
        self.chat.push(ChatMessage { role, content: content.into() });
    }

    /// Set the note for `day`; blank text removes it.
    pub fn set_note(&mut self, day: u32, text: &str) -> Result<(), GenerationError> {
        match self.store.as_ref().map(|s| s.original(day).is_some()) {
            None => return Err(GenerationError::PreconditionViolation("no plan has been generated yet".into())),
            Some(false) => return Err(GenerationError::PreconditionViolation(format!("the plan has no Day {day}"))),
            Some(true) => {}
        }
        let text = text.trim();
        if text.is_empty() {
            self.journal.remove(&day);
        } else {
            self.journal.insert(day, text.to_string());
        }
        Ok(())
    }

    pub fn note(&self, day: u32) -> Option<&str> {
        self.journal.get(&day).map(String::as_str)
    }

    pub fn journal(&self) -> &BTreeMap<u32, String> {
        &self.journal
    }

    pub fn ledger(&self) -> &ExpenseLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ExpenseLedger {
        &mut self.ledger
    }
}
