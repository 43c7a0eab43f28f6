use crate::generate::TripRequest;
use crate::wire::{ReplanReason, TAG_ACCOMMODATION, TAG_BUDGET, TAG_ITINERARY, TAG_SUMMARY, TAG_TRANSPORT};

fn format_rules() -> &'static str {
r#"Location format (MANDATORY):
- Every specific point of interest (monument, restaurant, market, park, hotel) MUST be written as:
  **Name of Place** (day: X, lat: XX.XXXX, lon: YY.YYYY)
  Example: The plan is to visit **Baga Beach** (day: 1, lat: 15.5560, lon: 73.7517).
- Use decimal degrees. Do not bold anything else followed by parentheses."#
}

/// Full plan request. The model must answer with the five sentinel tags in order.
pub fn plan_prompt(trip: &TripRequest, duration_days: u32) -> String {
    let interests = if trip.interests.is_empty() {
        "a bit of everything".to_string()
    } else {
        trip.interests.iter().cloned().collect::<Vec<_>>().join(", ")
    };

    format!(
r#"You are an expert travel planner named TravelBuddy. Your response must be in {language}.
Create a complete travel plan for a trip from {origin} to {destination}, starting on {start} and ending on {end}.
This is a {duration}-day trip for {travelers} people with a {budget} budget, focusing on {interests}.

Your response MUST use the following tags, each exactly once and in this order:

{t_summary}
A brief, engaging summary.

{t_budget}
A Markdown table for the budget.

{t_itinerary}
A detailed day-by-day plan. Start every day with a bolded header such as **Day 1: Arrival**,
numbered 1 to {duration}.

{t_accommodation}
List 2-3 accommodation options, using the arrival day (day: 1) in the location format.
Example: Stay at **Taj Fort Aguada Resort & Spa** (day: 1, lat: 15.4957, lon: 73.7667).

{t_transport}
Provide brief advice.

{rules}"#,
        language = trip.language,
        origin = trip.origin,
        destination = trip.destination,
        start = trip.start_date.format("%B %d, %Y"),
        end = trip.end_date.format("%B %d, %Y"),
        duration = duration_days,
        travelers = trip.travelers,
        budget = trip.budget.label(),
        interests = interests,
        t_summary = TAG_SUMMARY,
        t_budget = TAG_BUDGET,
        t_itinerary = TAG_ITINERARY,
        t_accommodation = TAG_ACCOMMODATION,
        t_transport = TAG_TRANSPORT,
        rules = format_rules(),
    )
}

fn reason_instruction(reason: ReplanReason, destination: &str) -> String {
    match reason {
        ReplanReason::Rainy => format!(
            "It is now raining. Write a 'rainy day' version of this plan for {destination}. \
             Focus on good indoor activities (museums, cafes, indoor markets, cultural centers) \
             that are close to the original locations."
        ),
        ReplanReason::LowEnergy => format!(
            "The traveller is tired and wants a low-energy, relaxed version of this plan for {destination}. \
             Replace high-energy activities with restful ones (a gentle walk in a park, a scenic cafe, \
             a spa, or a shorter sightseeing trip)."
        ),
    }
}

/// Single-day rewrite. The answer must keep the day header and the location format.
pub fn replan_prompt(day: u32, day_text: &str, reason: ReplanReason, destination: &str, language: &str) -> String {
    format!(
r#"You are a dynamic travel planner. The traveller's original plan for Day {day} is:
---
{day_text}
---

The situation has changed: {instruction}

Write the new plan for this single day only. Respond in {language}.
Begin with the bolded day title (e.g. **Day {day}: ...**) and keep the same Markdown style.

{rules}
Use day: {day} for every location."#,
        instruction = reason_instruction(reason, destination),
        rules = format_rules(),
    )
}

pub fn packing_prompt(context: &str) -> String {
    format!(
r#"Based on the following travel itinerary:
---
{context}
---
Generate a detailed packing list. Group items by category (Clothing, Toiletries, Electronics, Documents, ...).
Tailor it to the plan: if it mentions trekking add hiking shoes, if it mentions the beach add swimwear."#
    )
}

pub fn local_language_prompt(destination: &str) -> String {
    format!(
        "What is the primary local language spoken in {destination}? \
         Answer only with the name of the language (e.g. 'Hindi', 'Marathi', 'Bengali')."
    )
}

pub fn local_guide_prompt(destination: &str, language: &str, local_language: &str) -> String {
    format!(
r#"You are a friendly local guide for a tourist visiting {destination}.
Write a concise 'Know Before You Go' guide in {language}, formatted with Markdown, with these sections:

1. **Must-Try Local Foods:** 3-5 specific dishes (not restaurants).
2. **Cultural Etiquette:** tipping, greetings, dress code for temples.
3. **Common Scams to Watch Out For:** 2-3 common local scams, briefly.
4. **Basic Phrases in {local_language}:** 5-7 phrases such as 'Hello' and 'Thank you', with phonetic pronunciation for a {language} speaker."#
    )
}

/// One self-contained chat turn: the current itinerary travels with every question.
pub fn chat_prompt(context: Option<&str>, question: &str) -> String {
    match context {
        Some(ctx) => format!(
r#"HERE IS THE USER'S ITINERARY FOR CONTEXT:
---
{ctx}
---
NOW, PLEASE ANSWER THE USER'S QUESTION: "{question}""#
        ),
        None => question.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::BudgetTier;
    use chrono::NaiveDate;

    fn trip() -> TripRequest {
        TripRequest {
            origin: "Delhi".into(),
            destination: "Goa".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
            travelers: 2,
            budget: BudgetTier::MidRange,
            interests: ["Food".to_string(), "Wellness".to_string()].into_iter().collect(),
            language: "English".into(),
        }
    }

    #[test]
    fn plan_prompt_lists_tags_in_order() {
        let p = plan_prompt(&trip(), 3);
        let positions: Vec<usize> = [TAG_SUMMARY, TAG_BUDGET, TAG_ITINERARY, TAG_ACCOMMODATION, TAG_TRANSPORT]
            .iter()
            .map(|t| p.find(t).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(p.contains("3-day trip for 2 people with a Mid-Range budget"));
        assert!(p.contains("November 01, 2026"));
        assert!(p.contains("Food, Wellness"));
    }

    #[test]
    fn replan_prompt_depends_on_reason() {
        let rainy = replan_prompt(2, "**Day 2** beach", ReplanReason::Rainy, "Goa", "English");
        let tired = replan_prompt(2, "**Day 2** beach", ReplanReason::LowEnergy, "Goa", "English");
        assert!(rainy.contains("indoor"));
        assert!(tired.contains("restful"));
        assert!(rainy.contains("**Day 2** beach"));
        assert!(rainy.contains("day: 2"));
    }

    #[test]
    fn chat_without_plan_is_just_the_question() {
        assert_eq!(chat_prompt(None, "Is it hot?"), "Is it hot?");
        assert!(chat_prompt(Some("ITINERARY: x"), "Is it hot?").contains("ITINERARY: x"));
    }
}
