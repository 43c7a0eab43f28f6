use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::wire::DayChunk;

/// Start of a day: a bolded `Day` followed by digits, e.g. `**Day 3: Old Goa**`.
fn header_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"(?i)\*\*\s*day\s*(\d+)").expect("valid regex"))
}

/// Split an itinerary into one chunk per day header.
///
/// Text before the first header is preamble and dropped. Chunks are trimmed and
/// empty ones discarded. Duplicate day numbers are all kept, in order.
pub fn segment(itinerary: &str) -> Vec<DayChunk> {
    let starts: Vec<(usize, u32)> = header_rx()
        .captures_iter(itinerary)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let day = c.get(1)?.as_str().parse::<u32>().ok()?;
            Some((whole.start(), day))
        })
        .collect();

    let mut chunks = Vec::with_capacity(starts.len());
    for (i, &(start, day)) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map(|s| s.0).unwrap_or(itinerary.len());
        let text = itinerary[start..end].trim();
        if text.is_empty() {
            continue;
        }
        chunks.push(DayChunk { day, text: text.to_string() });
    }

    let mut seen = HashSet::new();
    for c in &chunks {
        if !seen.insert(c.day) {
            warn!(day = c.day, "segment: duplicate day header, lookups use the first one");
        }
    }
    debug!(days = chunks.len(), "segment: done");
    chunks
}

/// Text before the first day header, trimmed. The whole itinerary when it has
/// no header at all.
pub fn preamble(itinerary: &str) -> &str {
    match header_rx().find(itinerary) {
        Some(m) => itinerary[..m.start()].trim(),
        None => itinerary.trim(),
    }
}

/// Rewrite the number of the first day header in `text`.
pub fn relabel(text: &str, day: u32) -> String {
    match header_rx().captures(text).and_then(|c| c.get(1)) {
        Some(num) => format!("{}{}{}", &text[..num.start()], day, &text[num.end()..]),
        None => text.to_string(),
    }
}

/// First chunk carrying `day`.
pub fn find_day(chunks: &[DayChunk], day: u32) -> Option<&DayChunk> {
    chunks.iter().find(|c| c.day == day)
}

pub fn join_chunks<'a, I>(chunks: I) -> String
where
    I: IntoIterator<Item = &'a DayChunk>,
{
    chunks
        .into_iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squash(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    const ITINERARY: &str = "\nHere is the plan.\n\n**Day 1: Arrival**\nCheck in.\n\n**Day 2 - Beaches**\nSwim at **Baga Beach** (day: 2, lat: 15.5560, lon: 73.7517).\n\n**day 3**\nFly home.\n";

    #[test]
    fn one_chunk_per_header() {
        let chunks = segment(ITINERARY);
        assert_eq!(chunks.iter().map(|c| c.day).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(chunks[0].text.starts_with("**Day 1: Arrival**"));
        assert!(chunks.iter().all(|c| !c.text.trim().is_empty()));
    }

    #[test]
    fn concatenation_equals_itinerary_minus_preamble() {
        let chunks = segment(ITINERARY);
        let body = &ITINERARY[ITINERARY.find("**Day 1").unwrap()..];
        assert_eq!(squash(&join_chunks(&chunks)), squash(body));
    }

    #[test]
    fn no_headers_yields_nothing() {
        assert!(segment("Just wander around.").is_empty());
        assert!(segment("").is_empty());
    }

    #[test]
    fn duplicates_are_kept_and_lookup_takes_first() {
        let chunks = segment("**Day 2** first\n**Day 2** second");
        assert_eq!(chunks.len(), 2);
        assert_eq!(find_day(&chunks, 2).unwrap().text, "**Day 2** first");
        assert!(find_day(&chunks, 5).is_none());
    }

    #[test]
    fn relabel_rewrites_first_header_only() {
        assert_eq!(relabel("**Day 4: Spa** then **Day 5**", 3), "**Day 3: Spa** then **Day 5**");
        assert_eq!(relabel("no header", 3), "no header");
    }

    #[test]
    fn preamble_is_text_before_first_header() {
        assert_eq!(preamble(ITINERARY), "Here is the plan.");
        assert_eq!(preamble("**Day 1** go"), "");
        assert_eq!(preamble("  ### Day 1\nBeach.  "), "### Day 1\nBeach.");
    }

    #[test]
    fn header_with_inner_space() {
        let chunks = segment("** Day 4 ** museums");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].day, 4);
    }
}
