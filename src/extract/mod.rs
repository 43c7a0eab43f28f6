use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::wire::PointOfInterest;

/// `**Name** (details)`. The name may not contain `*` and must end on a word character.
fn candidate_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"(?i)\*\*([\w\s,'’&.-]*\w)\*\*\s*\((.*?)\)").expect("valid regex"))
}

fn day_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"(?i)\bday\s*:\s*(\d+)").expect("valid regex"))
}

fn lat_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"(?i)\blat\s*:\s*([+\d.-]+)").expect("valid regex"))
}

fn lon_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"(?i)\blon\s*:\s*([+\d.-]+)").expect("valid regex"))
}

/// Extract every well-formed point of interest from `text`, in order of appearance.
///
/// Candidates missing any of `day`, `lat`, `lon`, or carrying values that do not
/// parse, are skipped silently. So are `day: 0` and coordinates off the globe
/// (latitude outside [-90, 90], longitude outside [-180, 180]). Text without
/// any markup yields an empty list.
pub fn extract(text: &str) -> Vec<PointOfInterest> {
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for caps in candidate_rx().captures_iter(text) {
        let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let details = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        match parse_details(details) {
            Some((day, lat, lon)) if !name.is_empty() => out.push(PointOfInterest {
                name: name.to_string(),
                day,
                lat,
                lon,
            }),
            _ => skipped += 1,
        }
    }

    debug!(points = out.len(), skipped, "extract: done");
    out
}

fn parse_details(details: &str) -> Option<(u32, f64, f64)> {
    let day: u32 = field(day_rx(), details)?.parse().ok()?;
    let lat: f64 = field(lat_rx(), details)?.parse().ok()?;
    let lon: f64 = field(lon_rx(), details)?.parse().ok()?;

    if day == 0 || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some((day, lat, lon))
}

fn field<'a>(rx: &Regex, details: &'a str) -> Option<&'a str> {
    rx.captures(details).and_then(|c| c.get(1)).map(|m| m.as_str())
}
