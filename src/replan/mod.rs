use std::time::Duration;
use tracing::{info, warn};

use crate::errors::GenerationError;
use crate::generate::call_service;
use crate::plan::{find_day, relabel, segment};
use crate::prompt;
use crate::provider::Provider;
use crate::store::PlanStore;
use crate::wire::{day_header, DayChunk, ReplanReason};

/// Regenerate one day and record it as that day's override.
///
/// The prompt is built from the day's *active* chunk, so replans can be chained.
/// The store is only written after a well-formed answer arrives; on any error
/// it is left exactly as it was.
pub async fn replan(
    store: &PlanStore,
    provider: &dyn Provider,
    day: u32,
    reason: ReplanReason,
    destination: &str,
    language: &str,
    timeout: Duration,
) -> Result<DayChunk, GenerationError> {
    let current = store
        .active(day)
        .ok_or_else(|| GenerationError::PreconditionViolation(format!("there is no itinerary content for Day {day}")))?;

    info!(day, %reason, "replan: requesting");
    let prompt = prompt::replan_prompt(day, &current.text, reason, destination, language);
    let answer = call_service(provider, &prompt, timeout).await?;

    let chunk = normalize(day, &answer)?;
    store.set_override(chunk.clone());
    info!(day, chars = chunk.text.len(), "replan: stored override");
    Ok(chunk)
}

/// Shape a replan answer into one chunk for `day`.
///
/// Chatter before the first day header is dropped. If the answer holds a chunk
/// for `day` that chunk wins; an answer with no header at all gets one.
pub fn normalize(day: u32, answer: &str) -> Result<DayChunk, GenerationError> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::MalformedStructure(format!("empty replan for Day {day}")));
    }

    let chunks = segment(trimmed);
    if let Some(c) = find_day(&chunks, day) {
        return Ok(c.clone());
    }
    if let Some(first) = chunks.first() {
        warn!(day, got = first.day, "replan: answer is headed with another day, relabelling");
        return Ok(DayChunk { day, text: relabel(&first.text, day) });
    }

    warn!(day, "replan: answer has no day header, adding one");
    Ok(DayChunk { day, text: format!("{}\n{}", day_header(day), trimmed) })
}
