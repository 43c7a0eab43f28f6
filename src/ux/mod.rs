use colored::Colorize;
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

use crate::generate::TripRequest;
use crate::ledger::ExpenseLedger;
use crate::session::Session;
use crate::store::PlanStore;
use crate::view::{all_day_views, DayView, Lodging, MapDataset};
use crate::wire::Provenance;

/// Spinner shown while a text-service call is in flight.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn heading(title: &str) {
    println!("\n{}", format!("=== {title} ===").bold());
}

pub fn show_text(title: &str, body: &str) {
    heading(title);
    println!("{}\n", body.trim());
}

fn provenance_tag(p: Provenance) -> colored::ColoredString {
    match p {
        Provenance::Original => "[ORIGINAL]".green().bold(),
        Provenance::Modified => "[MODIFIED]".yellow().bold(),
    }
}

pub fn show_plan(store: &PlanStore, trip: &TripRequest) {
    let s = store.sections();
    heading(&format!("Trip to {}", trip.destination));
    println!(
        "{} -> {}  {} to {}  ({} travellers, {})",
        trip.origin,
        trip.destination,
        trip.start_date,
        trip.end_date,
        trip.travelers,
        trip.budget.label()
    );
    println!("{}", s.summary.trim().bold());
    show_text("Budget Allocation", &s.budget);

    heading("Day-by-Day Itinerary");
    let days = all_day_views(store);
    if days.is_empty() {
        println!("{}", s.itinerary.trim());
    }
    for d in &days {
        show_day(d, None);
    }
    show_text("Accommodation Suggestions", &s.accommodation);
    show_text("Transportation Tips", &s.transport);
}

pub fn show_day(view: &DayView, note: Option<&str>) {
    println!("{} {}", provenance_tag(view.provenance), format!("Day {}", view.day).bold());
    println!("{}", view.text);
    if !view.points.is_empty() {
        let names: Vec<&str> = view.points.iter().map(|p| p.name.as_str()).collect();
        println!("{} {}", "places:".dimmed(), names.join(", "));
    }
    if let Some(n) = note {
        println!("{} {}", "note:".cyan().bold(), n);
    }
    println!();
}

pub fn show_map(map: &MapDataset) {
    heading("Map");
    match map.center {
        Some((lat, lon)) => println!("centre: {lat:.4}, {lon:.4}"),
        None => println!("centre: {}", "(destination not in the city table)".dimmed()),
    }
    if map.points.is_empty() {
        println!("(no locations found in the plan)");
        return;
    }
    for day in map.days() {
        println!("{}", format!("Day {day}").bold());
        for p in map.points.iter().filter(|p| p.day == day) {
            println!("  {}  ({:.4}, {:.4})", p.name, p.lat, p.lon);
        }
    }
    println!();
}

pub fn show_lodging(lodging: &[Lodging], raw: &str) {
    heading("Where to stay");
    if lodging.is_empty() {
        println!("{}\n", raw.trim());
        return;
    }
    for l in lodging {
        println!("{}", l.point.name.bold());
        println!("  {}", l.booking_url.underline());
    }
    println!();
}

pub fn show_expenses(ledger: &ExpenseLedger) {
    heading("Expenses");
    if ledger.is_empty() {
        println!("(no expenses yet)\n");
        return;
    }
    for e in ledger.recent() {
        println!("  {:>10.2}  {}", e.amount, e.item);
    }
    println!("  {:>10.2}  {}\n", ledger.total(), "total".bold());
}

pub fn show_chat_reply(session: &Session) {
    if let Some(m) = session.chat().last() {
        println!("{} {}\n", "TravelBuddy:".cyan().bold(), m.content);
    }
}

pub fn exported(path: &Path, bytes: usize) {
    println!(
        "{} {} ({})",
        "Saved".green().bold(),
        path.display(),
        format_size(bytes, DECIMAL)
    );
}

pub fn error(msg: impl std::fmt::Display) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

/// `None` on end of input.
pub fn read_line(prompt: &str) -> Option<String> {
    print!("{} ", prompt.bold());
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().lock().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()),
    }
}
