//! Engine configuration, partial updates, and validation.
//!
//! The source of truth for defaults. Updates arrive as a [`ConfigUpdate`]
//! and are applied all-or-nothing: the candidate config is validated before
//! any field of the live config changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use strata_core::{ImportanceWeights, PreservationCriteria};

/// Fraction of low-importance items past which compaction is recommended.
/// Fixed by design, not configurable.
pub const LOW_IMPORTANCE_FRACTION: f64 = 0.6;

/// Importance at or above which an item is always preserved.
pub const HIGH_IMPORTANCE_THRESHOLD: f64 = 0.8;

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactorConfig {
    /// Context budget in token estimates.
    pub max_context_tokens: u64,
    /// Budget utilization fraction past which compaction triggers.
    pub compaction_trigger_threshold: f64,
    /// Importance below which an item counts as low-importance.
    pub min_importance_threshold: f64,
    /// How many most-recent items are always preserved.
    pub preserve_recent_count: usize,
    /// Descriptive target ratio. Recorded in result metadata, never
    /// consulted by the selector.
    pub target_compression_ratio: f64,
    /// Scoring feature weights.
    pub importance_weights: ImportanceWeights,
    /// Deadline for the external summarization call.
    #[serde(with = "duration_secs")]
    pub summarize_timeout: Duration,
    /// Ring-buffer capacity for retained compaction results.
    pub history_capacity: usize,
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 1_000_000,
            compaction_trigger_threshold: 0.95,
            min_importance_threshold: 0.3,
            preserve_recent_count: 5,
            target_compression_ratio: 0.3,
            importance_weights: ImportanceWeights::default(),
            summarize_timeout: Duration::from_secs(30),
            history_capacity: 50,
        }
    }
}

impl CompactorConfig {
    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_context_tokens == 0 {
            return Err(ConfigError::InvalidTokenBudget);
        }
        check_fraction("compaction_trigger_threshold", self.compaction_trigger_threshold)?;
        if self.compaction_trigger_threshold <= 0.0 {
            // The trigger threshold is (0, 1]: a zero threshold would compact
            // on every call.
            return Err(ConfigError::InvalidThreshold {
                name: "compaction_trigger_threshold",
                value: self.compaction_trigger_threshold,
            });
        }
        check_fraction("min_importance_threshold", self.min_importance_threshold)?;
        check_fraction("target_compression_ratio", self.target_compression_ratio)?;
        check_weight("recency", self.importance_weights.recency)?;
        check_weight("user_interaction", self.importance_weights.user_interaction)?;
        check_weight("code_relevance", self.importance_weights.code_relevance)?;
        check_weight("error_information", self.importance_weights.error_information)?;
        Ok(())
    }

    /// Apply a partial update, all-or-nothing.
    ///
    /// The update is merged into a candidate copy which is validated before
    /// replacing the live config, so a rejected update leaves `self`
    /// untouched.
    pub fn apply(&mut self, update: &ConfigUpdate) -> Result<(), ConfigError> {
        let mut candidate = self.clone();
        if let Some(ratio) = update.target_compression_ratio {
            candidate.target_compression_ratio = ratio;
        }
        if let Some(count) = update.preserve_recent_count {
            candidate.preserve_recent_count = count;
        }
        if let Some(threshold) = update.min_importance_threshold {
            candidate.min_importance_threshold = threshold;
        }
        if let Some(ref weights) = update.importance_weights {
            weights.merge_into(&mut candidate.importance_weights);
        }
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Snapshot of the selection criteria for result metadata.
    #[must_use]
    pub fn criteria(&self) -> PreservationCriteria {
        PreservationCriteria {
            preserve_recent_count: self.preserve_recent_count,
            min_importance_threshold: self.min_importance_threshold,
            importance_weights: self.importance_weights,
            target_compression_ratio: self.target_compression_ratio,
        }
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold { name, value });
    }
    Ok(())
}

fn check_weight(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidWeight { name, value });
    }
    Ok(())
}

/// Partial config update applied by `ContextCompactor::configure`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    /// New descriptive target ratio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_compression_ratio: Option<f64>,
    /// New recent-item preservation count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_recent_count: Option<usize>,
    /// New low-importance threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_importance_threshold: Option<f64>,
    /// Per-key weight merge; unnamed weights keep their current value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance_weights: Option<WeightUpdate>,
}

/// Partial weight update — only named keys change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightUpdate {
    /// New recency weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<f64>,
    /// New user-interaction weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_interaction: Option<f64>,
    /// New code-relevance weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_relevance: Option<f64>,
    /// New error-information weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_information: Option<f64>,
}

impl WeightUpdate {
    fn merge_into(&self, weights: &mut ImportanceWeights) {
        if let Some(v) = self.recency {
            weights.recency = v;
        }
        if let Some(v) = self.user_interaction {
            weights.user_interaction = v;
        }
        if let Some(v) = self.code_relevance {
            weights.code_relevance = v;
        }
        if let Some(v) = self.error_information {
            weights.error_information = v;
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A threshold or ratio fell outside its valid range.
    #[error("invalid threshold {name}: {value} (must be within [0, 1])")]
    InvalidThreshold {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A scoring weight fell outside `[0, 1]`.
    #[error("invalid importance weight {name}: {value} (must be within [0, 1])")]
    InvalidWeight {
        /// Weight key.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The token budget must be positive.
    #[error("max_context_tokens must be greater than zero")]
    InvalidTokenBudget,
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CompactorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_token_budget() {
        let config = CompactorConfig {
            max_context_tokens: 0,
            ..CompactorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTokenBudget)));
    }

    #[test]
    fn rejects_zero_trigger_threshold() {
        let config = CompactorConfig {
            compaction_trigger_threshold: 0.0,
            ..CompactorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_threshold_update() {
        let mut config = CompactorConfig::default();
        let update = ConfigUpdate {
            min_importance_threshold: Some(1.5),
            ..ConfigUpdate::default()
        };
        let err = config.apply(&update).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold { name, .. } if name == "min_importance_threshold"));
        // Live config untouched.
        assert!((config.min_importance_threshold - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_negative_weight() {
        let mut config = CompactorConfig::default();
        let update = ConfigUpdate {
            importance_weights: Some(WeightUpdate {
                recency: Some(-0.1),
                ..WeightUpdate::default()
            }),
            ..ConfigUpdate::default()
        };
        assert!(config.apply(&update).is_err());
        assert_eq!(config.importance_weights, ImportanceWeights::default());
    }

    #[test]
    fn rejected_update_is_all_or_nothing() {
        let mut config = CompactorConfig::default();
        // Valid count paired with an invalid threshold: nothing may change.
        let update = ConfigUpdate {
            preserve_recent_count: Some(9),
            min_importance_threshold: Some(2.0),
            ..ConfigUpdate::default()
        };
        assert!(config.apply(&update).is_err());
        assert_eq!(config.preserve_recent_count, 5);
    }

    #[test]
    fn partial_weight_merge_keeps_unnamed_keys() {
        let mut config = CompactorConfig::default();
        let update = ConfigUpdate {
            importance_weights: Some(WeightUpdate {
                recency: Some(0.5),
                ..WeightUpdate::default()
            }),
            ..ConfigUpdate::default()
        };
        config.apply(&update).unwrap();
        assert!((config.importance_weights.recency - 0.5).abs() < f64::EPSILON);
        assert!((config.importance_weights.user_interaction - 0.4).abs() < f64::EPSILON);
        assert!((config.importance_weights.code_relevance - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn applies_all_named_fields() {
        let mut config = CompactorConfig::default();
        let update = ConfigUpdate {
            target_compression_ratio: Some(0.5),
            preserve_recent_count: Some(8),
            min_importance_threshold: Some(0.4),
            importance_weights: None,
        };
        config.apply(&update).unwrap();
        assert!((config.target_compression_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.preserve_recent_count, 8);
        assert!((config.min_importance_threshold - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn criteria_snapshot_reflects_config() {
        let config = CompactorConfig::default();
        let criteria = config.criteria();
        assert_eq!(criteria.preserve_recent_count, 5);
        assert!((criteria.target_compression_ratio - 0.3).abs() < f64::EPSILON);
    }
}
