use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::plan;
use crate::prompt;
use crate::provider::Provider;
use crate::wire::{BudgetTier, PlanSections};

/// Everything the traveller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: u32,
    pub budget: BudgetTier,
    pub interests: BTreeSet<String>,
    pub language: String,
}

impl TripRequest {
    /// Inclusive day count; zero or negative when the end precedes the start.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Checks run before anything is sent to the text service.
    pub fn validate(&self) -> Result<u32, GenerationError> {
        if self.destination.trim().is_empty() {
            return Err(GenerationError::PreconditionViolation("destination must not be empty".into()));
        }
        if self.travelers == 0 {
            return Err(GenerationError::PreconditionViolation("at least one traveler is required".into()));
        }
        let days = self.duration_days();
        if days <= 0 {
            return Err(GenerationError::PreconditionViolation(
                "the trip must be at least 1 day long (end date is before start date)".into(),
            ));
        }
        u32::try_from(days)
            .map_err(|_| GenerationError::PreconditionViolation(format!("a {days}-day trip is too long")))
    }
}

/// A plan response that passed the section contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPlan {
    pub raw: String,
    pub sections: PlanSections,
}

/// One guarded call to the text service: single attempt, bounded by `timeout`.
pub async fn call_service(provider: &dyn Provider, prompt: &str, timeout: Duration) -> Result<String, GenerationError> {
    debug!(prompt_chars = prompt.len(), ?timeout, "call_service: sending");
    match tokio::time::timeout(timeout, provider.generate(prompt)).await {
        Err(_) => {
            warn!(?timeout, "call_service: timed out");
            Err(GenerationError::Timeout(timeout))
        }
        Ok(Err(e)) => {
            warn!(error = %e, "call_service: provider failed");
            Err(GenerationError::ServiceFailure(format!("{e:#}")))
        }
        Ok(Ok(text)) => {
            debug!(chars = text.len(), "call_service: answered");
            Ok(text)
        }
    }
}

/// Generate a full plan and validate it against the five-section contract.
///
/// A response that arrives but does not parse is reported as
/// [`GenerationError::MalformedStructure`]; no retry is attempted.
pub async fn generate_plan(
    provider: &dyn Provider,
    trip: &TripRequest,
    timeout: Duration,
) -> Result<GeneratedPlan, GenerationError> {
    let days = trip.validate()?;
    info!(origin = %trip.origin, destination = %trip.destination, days, "generate_plan: requesting");

    let raw = call_service(provider, &prompt::plan_prompt(trip, days), timeout).await?;
    let sections = plan::parse(&raw).map_err(|e| {
        warn!(error = %e, "generate_plan: response failed the section contract");
        GenerationError::from(e)
    })?;

    Ok(GeneratedPlan { raw, sections })
}
