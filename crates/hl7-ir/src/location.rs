//! Location grammar
//!
//! A location addresses a field, or a component of a field, inside every
//! occurrence of one segment type: `DG1.6` is field 6 of each `DG1` segment,
//! `DG1.3.1` is the first component of that segment's field 3.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the message header segment.
///
/// The header's own field separator occupies field index zero, so its
/// field numbers are shifted by one relative to every other segment.
pub const HEADER_SEGMENT: &str = "MSH";

/// A parsed `(segment, field, component)` address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location {
    /// Literal text the location was parsed from
    text: String,

    /// Segment name, case-sensitive
    segment: String,

    /// Index into the segment split on the field separator
    field_index: usize,

    /// Zero-based index into the field split on the component separator
    component_index: Option<usize>,
}

impl Location {
    /// Parse `SEG.N` or `SEG.N.M`.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split('.').collect();
        if !(2..=3).contains(&tokens.len()) {
            return Err(Error::malformed_location(
                text,
                format!(
                    "expected '<segment>.<field>' or '<segment>.<field>.<component>', found {} part(s)",
                    tokens.len()
                ),
            ));
        }

        let segment = tokens[0];
        if segment.is_empty() {
            return Err(Error::malformed_location(text, "segment name is empty"));
        }

        let mut field_index = parse_index(text, tokens[1], "field")?;
        if segment == HEADER_SEGMENT {
            field_index = field_index.checked_sub(1).ok_or_else(|| {
                Error::malformed_location(text, "header segment fields are numbered from 1")
            })?;
        }

        let component_index = tokens
            .get(2)
            .map(|token| {
                parse_index(text, token, "component")?
                    .checked_sub(1)
                    .ok_or_else(|| Error::malformed_location(text, "components are numbered from 1"))
            })
            .transpose()?;

        Ok(Self {
            text: text.to_string(),
            segment: segment.to_string(),
            field_index,
            component_index,
        })
    }

    /// Literal location text, e.g. `DG1.3.1`
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Addressed segment name
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Index into the segment's field split (segment name at index 0)
    pub fn field_index(&self) -> usize {
        self.field_index
    }

    /// Zero-based component index, present only for depth-3 locations
    pub fn component_index(&self) -> Option<usize> {
        self.component_index
    }

    /// Addressing depth: 2 for `SEG.N`, 3 for `SEG.N.M`
    pub fn depth(&self) -> u8 {
        if self.component_index.is_some() { 3 } else { 2 }
    }
}

fn parse_index(text: &str, token: &str, part: &str) -> Result<usize> {
    token.parse::<usize>().map_err(|_| {
        Error::malformed_location(
            text,
            format!("{part} '{token}' is not a non-negative integer"),
        )
    })
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Location {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.text
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A location paired with the column name it is reported under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSpec {
    pub location: Location,
    pub column: String,
}

impl LocationSpec {
    /// Report a location under its own text.
    pub fn new(location: Location) -> Self {
        let column = location.text().to_string();
        Self { location, column }
    }

    /// Report a location under a caller-chosen column name.
    pub fn renamed(location: Location, column: impl Into<String>) -> Self {
        Self {
            location,
            column: column.into(),
        }
    }
}

/// Ordered association of locations to output column names
///
/// Order is significant: it fixes the composite identity key layout and
/// the column order of the final table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationSpecs {
    specs: Vec<LocationSpec>,
}

impl LocationSpecs {
    /// Create an empty specification
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse bare location strings; each column keeps the location text.
    pub fn from_locations<I, S>(locations: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let specs = locations
            .into_iter()
            .map(|text| Location::parse(text.as_ref()).map(LocationSpec::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { specs })
    }

    /// Parse `(location, column name)` pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let specs = pairs
            .into_iter()
            .map(|(text, column)| {
                Location::parse(text.as_ref()).map(|location| LocationSpec::renamed(location, column))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { specs })
    }

    /// Iterate specifications in order
    pub fn iter(&self) -> std::slice::Iter<'_, LocationSpec> {
        self.specs.iter()
    }

    /// Number of locations
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no location was supplied
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Output column names, in order
    pub fn columns(&self) -> Vec<String> {
        self.specs.iter().map(|spec| spec.column.clone()).collect()
    }

    /// Distinct segment names, in order of first appearance
    pub fn segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = Vec::new();
        for spec in &self.specs {
            let segment = spec.location.segment();
            if !segments.contains(&segment) {
                segments.push(segment);
            }
        }
        segments
    }
}

impl<'a> IntoIterator for &'a LocationSpecs {
    type Item = &'a LocationSpec;
    type IntoIter = std::slice::Iter<'a, LocationSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

impl FromIterator<LocationSpec> for LocationSpecs {
    fn from_iter<T: IntoIterator<Item = LocationSpec>>(iter: T) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}
