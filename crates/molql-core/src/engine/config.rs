use crate::core::element::loci::DEFAULT_REMAP_INTERVAL_CUTOFF;
use crate::core::element::query::DEFAULT_QUERY_RANGE_CUTOFF;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;
pub const DEFAULT_SCRIPT_RANGE_CUTOFF: usize = 12;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Tunables of query compilation and selection encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct QueryConfig {
    /// Deepest expression nesting accepted by the parser and compiler.
    pub max_nesting_depth: usize,
    /// Run length above which a Query stores indices as a range.
    pub query_range_cutoff: usize,
    /// Run length above which a script expression uses `in-range`.
    pub script_range_cutoff: usize,
    /// Run length above which `remap` builds an interval directly.
    pub remap_interval_cutoff: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            query_range_cutoff: DEFAULT_QUERY_RANGE_CUTOFF,
            script_range_cutoff: DEFAULT_SCRIPT_RANGE_CUTOFF,
            remap_interval_cutoff: DEFAULT_REMAP_INTERVAL_CUTOFF,
        }
    }
}

impl QueryConfig {
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder::new()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[derive(Default)]
pub struct QueryConfigBuilder {
    max_nesting_depth: Option<usize>,
    query_range_cutoff: Option<usize>,
    script_range_cutoff: Option<usize>,
    remap_interval_cutoff: Option<usize>,
}

impl QueryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = Some(depth);
        self
    }
    pub fn query_range_cutoff(mut self, cutoff: usize) -> Self {
        self.query_range_cutoff = Some(cutoff);
        self
    }
    pub fn script_range_cutoff(mut self, cutoff: usize) -> Self {
        self.script_range_cutoff = Some(cutoff);
        self
    }
    pub fn remap_interval_cutoff(mut self, cutoff: usize) -> Self {
        self.remap_interval_cutoff = Some(cutoff);
        self
    }

    pub fn build(self) -> Result<QueryConfig, ConfigError> {
        let defaults = QueryConfig::default();
        let config = QueryConfig {
            max_nesting_depth: self.max_nesting_depth.unwrap_or(defaults.max_nesting_depth),
            query_range_cutoff: self.query_range_cutoff.unwrap_or(defaults.query_range_cutoff),
            script_range_cutoff: self
                .script_range_cutoff
                .unwrap_or(defaults.script_range_cutoff),
            remap_interval_cutoff: self
                .remap_interval_cutoff
                .unwrap_or(defaults.remap_interval_cutoff),
        };
        if config.max_nesting_depth == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_nesting_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if config.query_range_cutoff == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "query_range_cutoff",
                reason: "must be at least 1".to_string(),
            });
        }
        if config.script_range_cutoff == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "script_range_cutoff",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(config)
    }
}
