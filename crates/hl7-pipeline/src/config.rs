//! Pipeline configuration
//!
//! [`PipelineConfig`] holds the output layout knobs. [`TidyConfig`] is the
//! YAML form used by the command line, where identity and report locations
//! are given either as a list or as a `location: column name` mapping:
//!
//! ```yaml
//! identity:
//!   MSH.7: msg_date_time
//!   PID.3.1: facility_code
//! report:
//!   - DG1.3.1
//!   - DG1.6
//! segment_column: seg
//! ```

use crate::pipeline::Pipeline;
use crate::{Error, Result};
use hl7_ir::LocationSpecs;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Default name of the segment index column
pub const DEFAULT_SEGMENT_COLUMN: &str = "seg";
/// Default separator between identity values in the composite key
pub const DEFAULT_IDENTITY_SEPARATOR: &str = ",";

/// Configuration for the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Name of the segment index column in the final table
    pub segment_column: String,
    /// Separator used to join identity values into the composite key
    pub identity_separator: String,
    /// Added to every reported segment index (1 gives 1-based numbering)
    pub segment_index_base: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segment_column: DEFAULT_SEGMENT_COLUMN.to_string(),
            identity_separator: DEFAULT_IDENTITY_SEPARATOR.to_string(),
            segment_index_base: 0,
        }
    }
}

/// Locations as written in a config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LocationsFile {
    /// Bare locations, reported under their own text
    List(Vec<String>),
    /// Location -> column name, in file order
    Map(IndexMap<String, String>),
}

impl LocationsFile {
    /// Parse into ordered location specifications
    pub fn to_specs(&self) -> hl7_ir::Result<LocationSpecs> {
        match self {
            LocationsFile::List(locations) => LocationSpecs::from_locations(locations),
            LocationsFile::Map(mapping) => {
                LocationSpecs::from_pairs(mapping.iter().map(|(k, v)| (k, v.clone())))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TidyConfigFile {
    identity: LocationsFile,
    report: LocationsFile,
    #[serde(default)]
    segment_column: Option<String>,
    #[serde(default)]
    identity_separator: Option<String>,
    #[serde(default)]
    segment_index_base: Option<usize>,
}

/// A complete tidy run description: locations plus pipeline settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidyConfig {
    pub identity: LocationSpecs,
    pub report: LocationSpecs,
    pub pipeline: PipelineConfig,
}

impl TidyConfig {
    /// Parse a YAML document; `source` names it in error messages.
    pub fn from_yaml_str(yaml: &str, source: &str) -> Result<Self> {
        let file: TidyConfigFile =
            serde_yaml::from_str(yaml).map_err(|e| Error::config(source, e.to_string()))?;

        let identity = file
            .identity
            .to_specs()
            .map_err(|e| Error::config(source, e.to_string()))?;
        let report = file
            .report
            .to_specs()
            .map_err(|e| Error::config(source, e.to_string()))?;

        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            segment_column: file.segment_column.unwrap_or(defaults.segment_column),
            identity_separator: file
                .identity_separator
                .unwrap_or(defaults.identity_separator),
            segment_index_base: file
                .segment_index_base
                .unwrap_or(defaults.segment_index_base),
        };

        debug!(
            source,
            identity = identity.len(),
            report = report.len(),
            "Loaded tidy configuration"
        );
        Ok(Self {
            identity,
            report,
            pipeline,
        })
    }

    /// Read and parse a YAML config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::io("read config", &display, e.to_string()))?;
        Self::from_yaml_str(&yaml, &display)
    }

    /// Pipeline configured with these settings
    pub fn build_pipeline(&self) -> Pipeline {
        Pipeline::new(self.pipeline.clone())
    }
}
