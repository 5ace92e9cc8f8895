//! Message batch splitting
//!
//! Raw exports rarely hold one message per file. These helpers cut a text
//! blob into individual messages, either at header segments or out of
//! XML-style wrapper elements such as `<OriginalHL7>...</OriginalHL7>`.

use crate::{Error, Result};
use hl7_ir::HEADER_SEGMENT;
use regex::Regex;
use tracing::debug;

/// Split text holding several messages into one string per message.
///
/// A message starts at every line whose first non-blank text is the header
/// segment name followed by at least one more character on the same line;
/// anything before the first header is discarded. Leading
/// indentation of the header line and trailing whitespace are trimmed so
/// every message starts with its delimiter declaration.
pub fn split_messages(text: &str) -> Result<Vec<String>> {
    let pattern = format!(r"(?mR)^[ \t]*({})[^\r\n]", regex::escape(HEADER_SEGMENT));
    let header = Regex::new(&pattern).map_err(|e| Error::pattern(&pattern, e.to_string()))?;

    let starts: Vec<usize> = header
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.start())
        .collect();

    let messages: Vec<String> = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim_end().to_string()
        })
        .collect();

    debug!(messages = messages.len(), "Split message batch");
    Ok(messages)
}

/// Extract message bodies wrapped in `<tag>...</tag>` elements.
///
/// Tag matching is case-insensitive and bodies may span lines; surrounding
/// whitespace is trimmed from each body.
pub fn extract_wrapped(text: &str, tag: &str) -> Result<Vec<String>> {
    let tag = regex::escape(tag);
    let pattern = format!(r"(?si)<{tag}>(.*?)</{tag}>");
    let element = Regex::new(&pattern).map_err(|e| Error::pattern(&pattern, e.to_string()))?;

    let messages: Vec<String> = element
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|body| !body.is_empty())
        .collect();

    debug!(messages = messages.len(), "Extracted wrapped messages");
    Ok(messages)
}
