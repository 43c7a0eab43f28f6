use crate::errors::ParseError;
use crate::wire::{PlanSections, Section};

pub mod segment;

pub use segment::{find_day, join_chunks, preamble, relabel, segment};

/// Split a full plan response into its five sections.
///
/// Every sentinel tag must appear exactly once and in the fixed order; anything
/// else fails the whole parse, no partial sections are returned. Text before
/// `[TRIP_SUMMARY]` is discarded. Section bodies are returned untrimmed so that
/// re-inserting the tags reproduces the input.
pub fn parse(raw: &str) -> Result<PlanSections, ParseError> {
    // (tag start, body start) per section
    let mut bounds: Vec<(usize, usize)> = Vec::with_capacity(Section::ALL.len());

    for section in Section::ALL {
        let tag = section.tag();
        let mut hits = raw.match_indices(tag).map(|(pos, _)| pos);
        let pos = hits
            .next()
            .ok_or_else(|| ParseError::MalformedStructure(format!("missing {tag}")))?;
        if hits.next().is_some() {
            return Err(ParseError::MalformedStructure(format!("{tag} appears more than once")));
        }
        if let Some(&(_, prev_body)) = bounds.last() {
            if pos < prev_body {
                return Err(ParseError::MalformedStructure(format!("{tag} is out of order")));
            }
        }
        bounds.push((pos, pos + tag.len()));
    }

    let body = |i: usize| -> String {
        let start = bounds[i].1;
        let end = bounds.get(i + 1).map(|b| b.0).unwrap_or(raw.len());
        raw[start..end].to_string()
    };

    Ok(PlanSections {
        summary: body(0),
        budget: body(1),
        itinerary: body(2),
        accommodation: body(3),
        transport: body(4),
    })
}
