use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::wire::BudgetTier;

pub mod command;

pub use command::Command;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "google")]
    Gemini,
    #[value(alias = "open-ai", alias = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

/// File format written by the `export` command.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    #[value(alias = "txt")]
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "travelbuddy", version, about = "LLM trip planner with per-day replans, map markers and exports")]
pub struct Args {
    /// Config file (.toml or .yaml); defaults to ./travelbuddy.toml or ./travelbuddy.yaml
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub root: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long = "from", default_value = "Delhi")]
    pub origin: String,

    #[arg(long = "to", default_value = "Goa")]
    pub destination: String,

    /// First day of the trip (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the trip (YYYY-MM-DD), defaults to start + 5 days
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub travelers: u32,

    #[arg(long, value_enum, default_value_t = BudgetTier::MidRange)]
    pub budget: BudgetTier,

    #[arg(long = "interest", default_values = ["Wellness", "Food"])]
    pub interests: Vec<String>,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, default_value_t = false)]
    pub save_transcripts: bool,

    /// Write the itinerary document here right after generation
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Print the plan and exit instead of opening the interactive shell
    #[arg(long, default_value_t = false)]
    pub once: bool,

    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}
