//! Text protocol between the planner and the model.
//!
//! Plan responses are split by five literal sentinel tags, always in this order:
//!
//! ```text
//! [TRIP_SUMMARY] ... [BUDGET_ALLOCATION] ... [DAY_BY_DAY_ITINERARY] ...
//! [ACCOMMODATION_SUGGESTIONS] ... [TRANSPORTATION_TIPS] ...
//! ```
//!
//! Points of interest are embedded as `**<Place Name>** (day: N, lat: X, lon: Y)`
//! and every itinerary day starts with a bolded `**Day N ...**` header.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TAG_SUMMARY: &str = "[TRIP_SUMMARY]";
pub const TAG_BUDGET: &str = "[BUDGET_ALLOCATION]";
pub const TAG_ITINERARY: &str = "[DAY_BY_DAY_ITINERARY]";
pub const TAG_ACCOMMODATION: &str = "[ACCOMMODATION_SUGGESTIONS]";
pub const TAG_TRANSPORT: &str = "[TRANSPORTATION_TIPS]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Summary,
    Budget,
    Itinerary,
    Accommodation,
    Transport,
}

impl Section {
    /// Fixed order of the sections in a plan response and in exports.
    pub const ALL: [Section; 5] = [
        Section::Summary,
        Section::Budget,
        Section::Itinerary,
        Section::Accommodation,
        Section::Transport,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Section::Summary => TAG_SUMMARY,
            Section::Budget => TAG_BUDGET,
            Section::Itinerary => TAG_ITINERARY,
            Section::Accommodation => TAG_ACCOMMODATION,
            Section::Transport => TAG_TRANSPORT,
        }
    }
}

/// A geocoded place mentioned in generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    pub day: u32,
    pub lat: f64,
    pub lon: f64,
}

/// The five sections of one plan, each a raw slice of the response between its tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSections {
    pub summary: String,
    pub budget: String,
    pub itinerary: String,
    pub accommodation: String,
    pub transport: String,
}

impl PlanSections {
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Summary => &self.summary,
            Section::Budget => &self.budget,
            Section::Itinerary => &self.itinerary,
            Section::Accommodation => &self.accommodation,
            Section::Transport => &self.transport,
        }
    }

    /// Re-insert the sentinel tags in front of each section.
    pub fn to_tagged_text(&self) -> String {
        let mut out = String::new();
        for section in Section::ALL {
            out.push_str(section.tag());
            out.push_str(self.get(section));
        }
        out
    }
}

/// The text of exactly one itinerary day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayChunk {
    pub day: u32,
    pub text: String,
}

/// Canonical header used when a replacement chunk arrives without one.
pub fn day_header(day: u32) -> String {
    format!("**Day {day}**")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Original,
    Modified,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Original => f.write_str("original"),
            Provenance::Modified => f.write_str("modified"),
        }
    }
}

/// Situation that triggers a single-day replan.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplanReason {
    Rainy,
    #[value(alias = "low_energy", alias = "tired")]
    LowEnergy,
}

impl fmt::Display for ReplanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplanReason::Rainy => f.write_str("rainy"),
            ReplanReason::LowEnergy => f.write_str("low-energy"),
        }
    }
}

impl FromStr for ReplanReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rainy" | "rain" => Ok(ReplanReason::Rainy),
            "low-energy" | "low_energy" | "lowenergy" | "tired" => Ok(ReplanReason::LowEnergy),
            other => Err(format!("unknown replan reason '{other}' (expected rainy or low-energy)")),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetTier {
    Budget,
    #[value(alias = "mid", alias = "midrange")]
    MidRange,
    Luxury,
}

impl BudgetTier {
    pub fn label(self) -> &'static str {
        match self {
            BudgetTier::Budget => "Budget",
            BudgetTier::MidRange => "Mid-Range",
            BudgetTier::Luxury => "Luxury",
        }
    }
}
