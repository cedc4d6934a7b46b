//! Detector configuration.
//!
//! [`DetectorConfig`] gathers the tunables of every stage. All sections
//! default to the standard thresholds, so a JSON override only needs to name
//! the fields it changes:
//!
//! ```json
//! { "selection": { "nms": { "max_detections": 4 } }, "parallel_proposals": false }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::{FeatureAnalyzer, Scorer};
use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::errors::{DiagramError, DiagramResult};
use crate::pipeline::export::DiagramExporter;
use crate::processors::Preprocessor;
use crate::proposals::{
    BandMerger, Deduplicator, EdgeProposer, InkClusterProposer, LayoutBandProposer,
};
use crate::selection::Selector;

/// Configuration of the whole detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Grayscale, thresholding and edge detection.
    pub preprocess: Preprocessor,
    /// Edge-map candidate generator.
    pub edges: EdgeProposer,
    /// Ink-cluster candidate generator.
    pub ink: InkClusterProposer,
    /// Layout-band candidate generator.
    pub layout: LayoutBandProposer,
    /// Merging of adjacent layout bands.
    pub merge: BandMerger,
    /// Cross-generator deduplication.
    pub dedup: Deduplicator,
    /// Feature extraction and rejection rules.
    pub analysis: FeatureAnalyzer,
    /// Ranking score weights.
    pub scoring: Scorer,
    /// NMS, refinement and pruning.
    pub selection: Selector,
    /// Crop padding and file naming.
    pub export: DiagramExporter,
    /// Run the three candidate generators concurrently.
    pub parallel_proposals: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            preprocess: Preprocessor::default(),
            edges: EdgeProposer::default(),
            ink: InkClusterProposer::default(),
            layout: LayoutBandProposer::default(),
            merge: BandMerger::default(),
            dedup: Deduplicator::default(),
            analysis: FeatureAnalyzer::default(),
            scoring: Scorer::default(),
            selection: Selector::default(),
            export: DiagramExporter::default(),
            parallel_proposals: true,
        }
    }
}

impl DetectorConfig {
    /// Parses a configuration from JSON; missing fields keep their defaults.
    pub fn from_json_str(content: &str) -> DiagramResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> DiagramResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DiagramError::from(ConfigError::InvalidConfig {
                message: format!("failed to read config file {}: {}", path.display(), e),
            })
        })?;
        Self::from_json_str(&content)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> DiagramResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ConfigValidator for DetectorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.preprocess.validate()?;
        self.edges.validate()?;
        self.ink.validate()?;
        self.layout.validate()?;
        self.merge.validate()?;
        self.dedup.validate()?;
        self.analysis.validate()?;
        self.scoring.validate()?;
        self.selection.validate()?;
        self.export.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
        assert_eq!(DetectorConfig::get_defaults(), DetectorConfig::default());
    }

    #[test]
    fn test_partial_json_override() {
        let config = DetectorConfig::from_json_str(
            r#"{ "selection": { "nms": { "max_detections": 4 } }, "parallel_proposals": false }"#,
        )
        .unwrap();
        assert_eq!(config.selection.nms.max_detections, 4);
        assert_eq!(config.selection.nms.iou_threshold, 0.55);
        assert!(!config.parallel_proposals);
        assert_eq!(config.dedup, Deduplicator::default());
    }

    #[test]
    fn test_json_round_trip_of_defaults() {
        let json = DetectorConfig::default().to_json_string().unwrap();
        let parsed = DetectorConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, DetectorConfig::default());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let config =
            DetectorConfig::from_json_str(r#"{ "selection": { "nms": { "max_detections": 0 } } }"#)
                .unwrap();
        assert!(config.validate().is_err());

        let config = DetectorConfig::from_json_str(r#"{ "dedup": { "iou_threshold": 1.5 } }"#)
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        let err = DetectorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, DiagramError::Serialization(_)));
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = DetectorConfig::from_json_file("/nonexistent/diagram-config.json").unwrap_err();
        assert!(matches!(err, DiagramError::Config(_)));
    }
}
