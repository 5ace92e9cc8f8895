//! Message identity
//!
//! Each message is named by the values of one or more identity locations.
//! Every identity location must yield exactly one present value per
//! message, and the resulting composite keys must be pairwise distinct.

use crate::{Error, Result};
use hl7_adapter_v2::parse_messages;
use hl7_ir::{LocationSpecs, MessageId, Outcome};
use std::collections::BTreeMap;
use tracing::debug;

/// Build one [`MessageId`] per message, in message order.
///
/// Fails with [`Error::AmbiguousIdentityField`] when a location matches
/// several segments in some message, [`Error::MissingIdentityValue`] when a
/// location has no value (segment absent, field absent or empty), and
/// [`Error::DuplicateMessageIdentity`] when two messages share a key.
pub fn build_message_ids<S: AsRef<str>>(
    identity: &LocationSpecs,
    messages: &[S],
    separator: &str,
) -> Result<Vec<MessageId>> {
    let mut columns: Vec<Vec<String>> = Vec::with_capacity(identity.len());
    let mut ambiguous = Vec::new();
    let mut missing = Vec::new();

    for spec in identity {
        let results = parse_messages(&spec.location, messages)?;

        let mut values = Vec::with_capacity(results.len());
        let mut is_ambiguous = false;
        let mut is_missing = false;
        for outcomes in results {
            let mut outcomes = outcomes.into_iter();
            match (outcomes.next(), outcomes.next()) {
                (Some(Outcome::Present(value)), None) => values.push(value),
                (Some(_), Some(_)) => is_ambiguous = true,
                _ => is_missing = true,
            }
        }

        let text = spec.location.text().to_string();
        if is_ambiguous {
            ambiguous.push(text);
        } else if is_missing {
            missing.push(text);
        }
        columns.push(values);
    }

    if !ambiguous.is_empty() {
        return Err(Error::AmbiguousIdentityField {
            locations: ambiguous,
        });
    }
    if !missing.is_empty() {
        return Err(Error::MissingIdentityValue { locations: missing });
    }

    let ids: Vec<MessageId> = (0..messages.len())
        .map(|message| {
            let parts = columns.iter().map(|values| values[message].clone()).collect();
            MessageId::new(parts, separator)
        })
        .collect();

    let duplicates = duplicate_keys(&ids);
    if !duplicates.is_empty() {
        return Err(Error::DuplicateMessageIdentity {
            identities: duplicates,
        });
    }

    debug!(
        messages = ids.len(),
        locations = identity.len(),
        "Built message identities"
    );
    Ok(ids)
}

fn duplicate_keys(ids: &[MessageId]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id.key()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key.to_string())
        .collect()
}
