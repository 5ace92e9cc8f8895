//! Segment extraction
//!
//! Locates every occurrence of a segment in a message and pulls the value
//! addressed by a [`Location`] out of each one.

use crate::syntax::Separators;
use crate::{Error, Result};
use hl7_ir::{Location, Outcome};
use regex::Regex;
use tracing::{debug, trace};

/// Line-anchored matcher for one segment name under one set of separators
///
/// Segments may be terminated by `\n`, `\r\n` or `\r`; spaces or tabs
/// before the segment name are skipped.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    separators: Separators,
    regex: Regex,
}

impl SegmentMatcher {
    /// Build a matcher for lines starting with `segment` followed by the field separator.
    pub fn new(segment: &str, separators: Separators) -> Result<Self> {
        let pattern = format!(
            r"(?mR)^[ \t]*({}{}[^\r\n]*)",
            regex::escape(segment),
            regex::escape(&separators.field.to_string())
        );
        let regex = Regex::new(&pattern).map_err(|e| Error::pattern(&pattern, e.to_string()))?;
        Ok(Self { separators, regex })
    }

    pub fn separators(&self) -> Separators {
        self.separators
    }

    /// Segment occurrences in order of appearance in the message text
    pub fn occurrences<'m>(&self, message: &'m str) -> Vec<&'m str> {
        self.regex
            .captures_iter(message)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// Extract `location` from every occurrence in `message`.
    ///
    /// A message without the segment yields a single [`Outcome::SegmentAbsent`].
    pub fn extract(&self, location: &Location, message: &str) -> Vec<Outcome> {
        let occurrences = self.occurrences(message);
        trace!(
            location = %location,
            occurrences = occurrences.len(),
            "Matched segment occurrences"
        );

        if occurrences.is_empty() {
            return vec![Outcome::SegmentAbsent];
        }

        occurrences
            .into_iter()
            .map(|segment| value_at(location, self.separators, segment))
            .collect()
    }
}

fn value_at(location: &Location, separators: Separators, segment: &str) -> Outcome {
    let field = segment.split(separators.field).nth(location.field_index());
    let raw = match location.component_index() {
        None => field,
        Some(component) => field.and_then(|f| f.split(separators.component).nth(component)),
    };
    Outcome::from_raw(raw)
}

/// Extract one location from one message.
///
/// A message too short to declare its separators fails with
/// [`Error::MalformedMessage`] reported at index 0.
pub fn extract(location: &Location, message: &str) -> Result<Vec<Outcome>> {
    let separators =
        Separators::from_message(message).ok_or_else(|| Error::malformed_message(0, message))?;
    let matcher = SegmentMatcher::new(location.segment(), separators)?;
    Ok(matcher.extract(location, message))
}

/// Extract one location from every message, preserving message order.
///
/// Fails on the first message too short to declare its separators.
pub fn parse_messages<S: AsRef<str>>(
    location: &Location,
    messages: &[S],
) -> Result<Vec<Vec<Outcome>>> {
    let mut matcher: Option<SegmentMatcher> = None;
    let mut results = Vec::with_capacity(messages.len());

    for (index, message) in messages.iter().enumerate() {
        let message = message.as_ref();
        let separators = Separators::from_message(message)
            .ok_or_else(|| Error::malformed_message(index, message))?;

        // Messages in one batch almost always share separators; reuse the compiled pattern
        let current = match matcher.take() {
            Some(existing) if existing.separators() == separators => existing,
            _ => SegmentMatcher::new(location.segment(), separators)?,
        };

        results.push(current.extract(location, message));
        matcher = Some(current);
    }

    debug!(
        location = %location,
        messages = results.len(),
        "Parsed location across messages"
    );
    Ok(results)
}
