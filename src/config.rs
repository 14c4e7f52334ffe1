//! Analysis and simulation configuration
//!
//! Every weight, threshold and propagation bound the engine uses lives here.
//! Defaults are the documented design defaults; a YAML document may override
//! any subset of them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Weights and thresholds for the truth analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Components scoring at or above this are critical
    pub criticality_threshold: f64,
    /// Weight of the inverse supplier count
    pub supplier_weight: f64,
    /// Weight of the complexity tier ordinal
    pub complexity_weight: f64,
    /// Weight of the bottleneck flag
    pub bottleneck_weight: f64,
    /// Weight of the dependent product count
    pub product_weight: f64,
    /// Dependent product count at which the product factor saturates
    pub product_saturation: usize,
    /// Component categories treated as bottlenecks (case-insensitive)
    pub bottleneck_categories: Vec<String>,
    /// Countries at or above this share are flagged as high risk
    pub geo_high_risk_threshold: f64,
    /// Resilience penalty weight for critical component density
    pub resilience_critical_weight: f64,
    /// Resilience penalty weight for the top country share
    pub resilience_geo_weight: f64,
    /// Resilience penalty weight for tariff-exposed density
    pub resilience_tariff_weight: f64,
    /// Country and region risk scores above this are high
    pub high_risk_cutoff: f64,
    /// Country and region risk scores above this are medium
    pub medium_risk_cutoff: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            criticality_threshold: 0.7,
            supplier_weight: 0.4,
            complexity_weight: 0.2,
            bottleneck_weight: 0.2,
            product_weight: 0.2,
            product_saturation: 5,
            bottleneck_categories: Vec::new(),
            geo_high_risk_threshold: 0.15,
            resilience_critical_weight: 0.3,
            resilience_geo_weight: 0.2,
            resilience_tariff_weight: 0.2,
            high_risk_cutoff: 70.0,
            medium_risk_cutoff: 40.0,
        }
    }
}

impl AnalysisConfig {
    pub fn is_bottleneck_category(&self, category: &str) -> bool {
        self.bottleneck_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        unit_interval("criticality_threshold", self.criticality_threshold)?;
        unit_interval("geo_high_risk_threshold", self.geo_high_risk_threshold)?;

        let criticality_weights = [
            ("supplier_weight", self.supplier_weight),
            ("complexity_weight", self.complexity_weight),
            ("bottleneck_weight", self.bottleneck_weight),
            ("product_weight", self.product_weight),
        ];
        for (name, w) in criticality_weights {
            unit_interval(name, w)?;
        }
        let total: f64 = criticality_weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 || total > 1.0 + 1e-9 {
            return Err(ConfigError::Invalid(format!(
                "criticality weights must sum to (0, 1], got {total}"
            )));
        }
        if self.product_saturation == 0 {
            return Err(ConfigError::Invalid(
                "product_saturation must be at least 1".to_string(),
            ));
        }

        // The resilience score stays monotone in the single-supplier density
        // only while sum(w / (1 - w)) <= 1.
        let mut monotonicity = 0.0;
        for (name, w) in [
            ("resilience_critical_weight", self.resilience_critical_weight),
            ("resilience_geo_weight", self.resilience_geo_weight),
            ("resilience_tariff_weight", self.resilience_tariff_weight),
        ] {
            if !(0.0..1.0).contains(&w) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1), got {w}"
                )));
            }
            monotonicity += w / (1.0 - w);
        }
        if monotonicity > 1.0 + 1e-9 {
            return Err(ConfigError::Invalid(format!(
                "resilience weights too large: sum of w/(1-w) is {monotonicity:.3}, must be <= 1"
            )));
        }

        if !(0.0..=100.0).contains(&self.medium_risk_cutoff)
            || !(0.0..=100.0).contains(&self.high_risk_cutoff)
            || self.medium_risk_cutoff >= self.high_risk_cutoff
        {
            return Err(ConfigError::Invalid(format!(
                "risk cutoffs must satisfy 0 <= medium < high <= 100, got {} / {}",
                self.medium_risk_cutoff, self.high_risk_cutoff
            )));
        }
        Ok(())
    }
}

/// Propagation bounds and estimate coefficients for the impact simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Attenuation per hop
    pub decay: f64,
    /// Severities below this stop propagating
    pub floor: f64,
    /// Maximum cascade depth in hops
    pub max_depth: usize,
    /// Fraction of a tariff increase passed through to price
    pub tariff_pass_through: f64,
    /// Lead time assumed for nodes without one
    pub default_lead_time_days: f64,
    /// Estimate multiplier when a critical component lies on the path
    pub critical_path_multiplier: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            decay: 0.7,
            floor: 0.05,
            max_depth: 4,
            tariff_pass_through: 0.4,
            default_lead_time_days: 30.0,
            critical_path_multiplier: 1.5,
        }
    }
}

impl ImpactConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "decay must be within (0, 1], got {}",
                self.decay
            )));
        }
        if !(0.0..1.0).contains(&self.floor) {
            return Err(ConfigError::Invalid(format!(
                "floor must be within [0, 1), got {}",
                self.floor
            )));
        }
        unit_interval("tariff_pass_through", self.tariff_pass_through)?;
        if self.default_lead_time_days < 0.0 {
            return Err(ConfigError::Invalid(
                "default_lead_time_days must not be negative".to_string(),
            ));
        }
        if self.critical_path_multiplier < 1.0 {
            return Err(ConfigError::Invalid(
                "critical_path_multiplier must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProphetConfig {
    pub analysis: AnalysisConfig,
    pub impact: ImpactConfig,
}

impl ProphetConfig {
    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: ProphetConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.analysis.validate()?;
        self.impact.validate()
    }
}

fn unit_interval(name: &str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProphetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.criticality_threshold, 0.7);
        assert_eq!(config.impact.decay, 0.7);
        assert_eq!(config.impact.max_depth, 4);
        assert_eq!(config.impact.floor, 0.05);
    }

    #[test]
    fn test_yaml_overrides_subset() {
        let yaml = r#"
analysis:
  criticality_threshold: 0.6
  bottleneck_categories: [semiconductor, rare_earth]
impact:
  max_depth: 6
"#;
        let config = ProphetConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.analysis.criticality_threshold, 0.6);
        assert!(config.analysis.is_bottleneck_category("Semiconductor"));
        assert_eq!(config.analysis.supplier_weight, 0.4);
        assert_eq!(config.impact.max_depth, 6);
        assert_eq!(config.impact.decay, 0.7);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ProphetConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ProphetConfig::default());
    }

    #[test]
    fn test_malformed_yaml() {
        let err = ProphetConfig::from_yaml_str("analysis: [not, a, map]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_resilience_weights_must_keep_monotonicity() {
        let config = AnalysisConfig {
            resilience_critical_weight: 0.5,
            resilience_geo_weight: 0.4,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("resilience weights"));
    }

    #[test]
    fn test_criticality_weights_bounded() {
        let config = AnalysisConfig {
            supplier_weight: 0.9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_impact_bounds() {
        let config = ImpactConfig {
            decay: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ImpactConfig {
            floor: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ImpactConfig {
            tariff_pass_through: 5.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
