//! Engine configuration.
//!
//! Mirrors the matching checkpoint a venue operator edits: a merge
//! threshold, the priority-track load planner switch and its knobs, and
//! optional per-SAC load caps. Every field has a default, so a partial
//! (or empty) JSON object is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::validation::{validate_config, ValidationError};

/// Track merger scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Stop merging once disparity is at or below this value.
    pub disparity_threshold: f64,
    /// A merge is committed only when its score exceeds this value.
    pub min_merge_score: f64,
    /// Weight of disparity improvement; semantic closeness gets the rest.
    pub disparity_weight: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            disparity_threshold: 1.0,
            min_merge_score: 0.1,
            disparity_weight: 0.5,
        }
    }
}

impl MergeConfig {
    /// Sets the disparity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.disparity_threshold = threshold;
        self
    }

    /// Sets the minimum merge score.
    pub fn with_min_merge_score(mut self, score: f64) -> Self {
        self.min_merge_score = score;
        self
    }

    /// Sets the disparity weight.
    pub fn with_disparity_weight(mut self, weight: f64) -> Self {
        self.disparity_weight = weight;
        self
    }
}

/// Priority-track load planner parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityTrackLoadConfig {
    /// Use the load planner instead of single-track assignment + merging.
    pub enabled: bool,
    /// Absolute floor of the small-track threshold.
    pub small_track_min_papers: u32,
    /// Fraction of the median track size below which a track is small.
    pub small_track_percent_of_median: f64,
    /// Sweep cap.
    pub max_iterations: usize,
}

impl Default for PriorityTrackLoadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            small_track_min_papers: 10,
            small_track_percent_of_median: 0.2,
            max_iterations: 10_000,
        }
    }
}

impl PriorityTrackLoadConfig {
    /// Enables the planner.
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Sets the small-track floor.
    pub fn with_small_track_min_papers(mut self, papers: u32) -> Self {
        self.small_track_min_papers = papers;
        self
    }

    /// Sets the small-track fraction of the median.
    pub fn with_small_track_percent_of_median(mut self, alpha: f64) -> Self {
        self.small_track_percent_of_median = alpha;
        self
    }

    /// Sets the sweep cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Track merger parameters.
    pub merge: MergeConfig,
    /// Load planner parameters.
    pub priority_track_loads: PriorityTrackLoadConfig,
    /// Per-SAC caps overriding each SAC's own `max_load`.
    pub sac_max_loads: Option<BTreeMap<String, u32>>,
}

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this schema.
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document parsed but holds out-of-range values.
    #[error("invalid engine config: {} problem(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        validate_config(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Sets the merge parameters.
    pub fn with_merge(mut self, merge: MergeConfig) -> Self {
        self.merge = merge;
        self
    }

    /// Sets the load planner parameters.
    pub fn with_priority_track_loads(mut self, ptl: PriorityTrackLoadConfig) -> Self {
        self.priority_track_loads = ptl;
        self
    }

    /// Sets per-SAC cap overrides.
    pub fn with_sac_max_loads(mut self, caps: BTreeMap<String, u32>) -> Self {
        self.sac_max_loads = Some(caps);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.merge.disparity_threshold - 1.0).abs() < 1e-10);
        assert!((config.merge.min_merge_score - 0.1).abs() < 1e-10);
        assert!(!config.priority_track_loads.enabled);
        assert_eq!(config.priority_track_loads.small_track_min_papers, 10);
        assert_eq!(config.priority_track_loads.max_iterations, 10_000);
        assert!(config.sac_max_loads.is_none());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "merge": { "disparity_threshold": 0.25 },
            "priority_track_loads": { "enabled": true, "small_track_min_papers": 5 },
            "sac_max_loads": { "s1": 40 }
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert!((config.merge.disparity_threshold - 0.25).abs() < 1e-10);
        assert!((config.merge.disparity_weight - 0.5).abs() < 1e-10);
        assert!(config.priority_track_loads.enabled);
        assert_eq!(config.priority_track_loads.small_track_min_papers, 5);
        assert!((config.priority_track_loads.small_track_percent_of_median - 0.2).abs() < 1e-10);
        assert_eq!(config.sac_max_loads.unwrap()["s1"], 40);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let json = r#"{ "priority_track_loads": { "small_track_percent_of_median": 1.5, "max_iterations": 0 } }"#;
        match EngineConfig::from_json(json) {
            Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }
}
