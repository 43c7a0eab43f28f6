use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::generate::call_service;
use crate::prompt;
use crate::provider::Provider;
use crate::session::{Role, Session};

fn non_empty(answer: String, what: &str) -> Result<String, GenerationError> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::MalformedStructure(format!("empty {what}")));
    }
    Ok(trimmed.to_string())
}

pub async fn packing_list(provider: &dyn Provider, context: &str, timeout: Duration) -> Result<String, GenerationError> {
    let answer = call_service(provider, &prompt::packing_prompt(context), timeout).await?;
    non_empty(answer, "packing list")
}

/// Two calls: the destination's local language first, then the guide with
/// basic phrases in that language.
pub async fn local_guide(
    provider: &dyn Provider,
    destination: &str,
    language: &str,
    timeout: Duration,
) -> Result<String, GenerationError> {
    let local = call_service(provider, &prompt::local_language_prompt(destination), timeout).await?;
    let local = non_empty(local, "local language answer")?;
    debug!(%destination, local_language = %local, "local_guide: language resolved");
    let guide = call_service(provider, &prompt::local_guide_prompt(destination, language, &local), timeout).await?;
    non_empty(guide, "local guide")
}

/// One self-contained chat turn. Nothing from earlier turns is sent.
pub async fn chat_turn(
    provider: &dyn Provider,
    context: Option<&str>,
    question: &str,
    timeout: Duration,
) -> Result<String, GenerationError> {
    let answer = call_service(provider, &prompt::chat_prompt(context, question), timeout).await?;
    Ok(answer.trim().to_string())
}

/// Packing list for the current plan, generated once and cached until the next plan.
pub async fn session_packing_list(
    session: &mut Session,
    provider: &dyn Provider,
    timeout: Duration,
) -> Result<String, GenerationError> {
    if let Some(cached) = session.packing_list() {
        return Ok(cached.to_string());
    }
    let context = session
        .itinerary_context()
        .ok_or_else(|| GenerationError::PreconditionViolation("no plan has been generated yet".into()))?;
    let list = packing_list(provider, &context, timeout).await?;
    info!(chars = list.len(), "assist: packing list ready");
    session.set_packing_list(list.clone());
    Ok(list)
}

pub async fn session_local_guide(
    session: &mut Session,
    provider: &dyn Provider,
    timeout: Duration,
) -> Result<String, GenerationError> {
    if let Some(cached) = session.local_guide() {
        return Ok(cached.to_string());
    }
    let (destination, language) = {
        let (_, trip) = session.require_plan()?;
        (trip.destination.clone(), trip.language.clone())
    };
    let guide = local_guide(provider, &destination, &language, timeout).await?;
    info!(chars = guide.len(), "assist: local guide ready");
    session.set_local_guide(guide.clone());
    Ok(guide)
}

/// Ask a question about the current plan, recording both sides in the transcript.
/// A failed turn is recorded as an assistant message too.
pub async fn ask(
    session: &mut Session,
    provider: &dyn Provider,
    question: &str,
    timeout: Duration,
) -> Result<String, GenerationError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(GenerationError::PreconditionViolation("ask needs a question".into()));
    }
    session.push_chat(Role::User, question);
    let context = session.itinerary_context();
    match chat_turn(provider, context.as_deref(), question, timeout).await {
        Ok(answer) => {
            session.push_chat(Role::Assistant, answer.clone());
            Ok(answer)
        }
        Err(e) => {
            warn!(error = %e, "assist: chat turn failed");
            session.push_chat(Role::Assistant, format!("An error occurred: {e}"));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GeneratedPlan, TripRequest};
    use crate::provider::ScriptedProvider;
    use crate::session::GREETING;
    use crate::wire::{BudgetTier, DayChunk, PlanSections};
    use chrono::NaiveDate;

    const T: Duration = Duration::from_secs(5);

    fn session() -> Session {
        let mut s = Session::new();
        let trip = TripRequest {
            origin: "Delhi".into(),
            destination: "Goa".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            travelers: 2,
            budget: BudgetTier::MidRange,
            interests: Default::default(),
            language: "English".into(),
        };
        let plan = GeneratedPlan {
            raw: String::new(),
            sections: PlanSections {
                summary: "Beach week".into(),
                itinerary: "**Day 1** trek\n\n**Day 2** beach".into(),
                ..Default::default()
            },
        };
        s.adopt_plan(trip, plan);
        s
    }

    #[tokio::test]
    async fn packing_list_uses_active_itinerary_and_is_cached() {
        let mut s = session();
        s.store().unwrap().set_override(DayChunk { day: 2, text: "**Day 2** spa".into() });
        let p = ScriptedProvider::answering(["  Hiking shoes\n"]);
        assert_eq!(session_packing_list(&mut s, &p, T).await.unwrap(), "Hiking shoes");
        assert_eq!(session_packing_list(&mut s, &p, T).await.unwrap(), "Hiking shoes");
        assert_eq!(p.call_count(), 1);
        let prompt = &p.prompts()[0];
        assert!(prompt.contains("SUMMARY: Beach week"));
        assert!(prompt.contains("**Day 2** spa"));
        assert!(!prompt.contains("**Day 2** beach"));
    }

    #[tokio::test]
    async fn local_guide_asks_language_first() {
        let mut s = session();
        let p = ScriptedProvider::answering([" Konkani \n", "Try fish curry."]);
        let guide = session_local_guide(&mut s, &p, T).await.unwrap();
        assert_eq!(guide, "Try fish curry.");
        let prompts = p.prompts();
        assert!(prompts[0].contains("primary local language spoken in Goa"));
        assert!(prompts[1].contains("Basic Phrases in Konkani"));
        assert_eq!(s.local_guide(), Some("Try fish curry."));
    }

    #[tokio::test]
    async fn chat_is_stateless_and_records_turns() {
        let mut s = session();
        let p = ScriptedProvider::answering(["Yes, bring an umbrella.", "About 30 minutes."]);
        ask(&mut s, &p, "Will it rain?", T).await.unwrap();
        ask(&mut s, &p, "How far is the fort?", T).await.unwrap();
        let prompts = p.prompts();
        assert!(prompts[1].contains("How far is the fort?"));
        assert!(!prompts[1].contains("Will it rain?"));
        assert!(prompts[1].contains("ITINERARY: **Day 1** trek"));
        assert_eq!(s.chat().len(), 5);
        assert_eq!(s.chat()[0].content, GREETING);
    }

    #[tokio::test]
    async fn failed_chat_turn_is_recorded() {
        let mut s = session();
        let p = ScriptedProvider::new(vec![Err("503 unavailable".to_string())]);
        let err = ask(&mut s, &p, "Hello?", T).await.unwrap_err();
        assert!(matches!(err, GenerationError::ServiceFailure(_)));
        let last = s.chat().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.starts_with("An error occurred: "));
    }

    #[tokio::test]
    async fn chat_without_plan_sends_bare_question() {
        let mut s = Session::new();
        let p = ScriptedProvider::answering(["Hi!"]);
        ask(&mut s, &p, "hello", T).await.unwrap();
        assert_eq!(p.prompts()[0], "hello");
    }

    #[tokio::test]
    async fn packing_list_without_plan_is_rejected() {
        let mut s = Session::new();
        let p = ScriptedProvider::answering(["x"]);
        let err = session_packing_list(&mut s, &p, T).await.unwrap_err();
        assert!(matches!(err, GenerationError::PreconditionViolation(_)));
        assert_eq!(p.call_count(), 0);
    }
}
