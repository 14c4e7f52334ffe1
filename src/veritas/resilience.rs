//! Resilience score
//!
//! `100 * (1 - d_single) * (1 - w_crit * d_crit) * (1 - w_geo * g_top) * (1 - w_tariff * d_tariff)`
//!
//! Densities are fractions of the components in scope. `d_single` counts
//! components with one supplier or none; `g_top` is the top country share.

use crate::config::AnalysisConfig;
use serde::{Deserialize, Serialize};

/// Inputs of the resilience score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResilienceInputs {
    pub components: usize,
    /// Components with at most one supplier
    pub single_sourced: usize,
    pub critical: usize,
    pub tariff_exposed: usize,
    pub top_country_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resilience {
    /// Score in [0, 100]
    pub score: f64,
    pub single_density: f64,
    pub critical_density: f64,
    pub tariff_density: f64,
    pub top_country_share: f64,
}

impl Default for Resilience {
    fn default() -> Self {
        Self {
            score: 100.0,
            single_density: 0.0,
            critical_density: 0.0,
            tariff_density: 0.0,
            top_country_share: 0.0,
        }
    }
}

pub fn resilience(inputs: &ResilienceInputs, config: &AnalysisConfig) -> Resilience {
    if inputs.components == 0 {
        return Resilience::default();
    }

    let n = inputs.components as f64;
    let density = |count: usize| (count as f64 / n).clamp(0.0, 1.0);
    let single_density = density(inputs.single_sourced);
    let critical_density = density(inputs.critical);
    let tariff_density = density(inputs.tariff_exposed);
    let top_country_share = inputs.top_country_share.clamp(0.0, 1.0);

    let score = 100.0
        * (1.0 - single_density)
        * (1.0 - config.resilience_critical_weight * critical_density)
        * (1.0 - config.resilience_geo_weight * top_country_share)
        * (1.0 - config.resilience_tariff_weight * tariff_density);

    Resilience {
        score: score.clamp(0.0, 100.0),
        single_density,
        critical_density,
        tariff_density,
        top_country_share,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_empty_scope_is_fully_resilient() {
        let r = resilience(&ResilienceInputs::default(), &AnalysisConfig::default());
        assert_eq!(r.score, 100.0);
    }

    #[test]
    fn test_known_value() {
        let inputs = ResilienceInputs {
            components: 10,
            single_sourced: 2,
            critical: 5,
            tariff_exposed: 0,
            top_country_share: 0.5,
        };
        let r = resilience(&inputs, &AnalysisConfig::default());
        // 100 * 0.8 * (1 - 0.3 * 0.5) * (1 - 0.2 * 0.5) * 1.0
        assert!((r.score - 61.2).abs() < EPS);
    }

    #[test]
    fn test_all_single_sourced_scores_zero() {
        let inputs = ResilienceInputs {
            components: 3,
            single_sourced: 3,
            ..Default::default()
        };
        assert_eq!(resilience(&inputs, &AnalysisConfig::default()).score, 0.0);
    }

    #[test]
    fn test_decreasing_in_each_density() {
        let config = AnalysisConfig::default();
        let base = ResilienceInputs {
            components: 10,
            single_sourced: 1,
            critical: 1,
            tariff_exposed: 1,
            top_country_share: 0.3,
        };
        let b = resilience(&base, &config).score;

        let worse = [
            ResilienceInputs {
                single_sourced: 2,
                ..base
            },
            ResilienceInputs { critical: 2, ..base },
            ResilienceInputs {
                tariff_exposed: 2,
                ..base
            },
            ResilienceInputs {
                top_country_share: 0.6,
                ..base
            },
        ];
        for inputs in worse {
            assert!(resilience(&inputs, &config).score < b);
        }
    }

    #[test]
    fn test_adding_single_sourced_component_never_raises_score() {
        let config = AnalysisConfig::default();
        // The new component may or may not be critical, tariff exposed or located
        // in the top country; none of that may outweigh the added single source.
        for n in 1..10usize {
            for s in 0..=n {
                for c in [0, n / 2, n] {
                    for t in [0, n / 3, n] {
                        for top in 0..=n {
                            let before = ResilienceInputs {
                                components: n,
                                single_sourced: s,
                                critical: c,
                                tariff_exposed: t,
                                top_country_share: top as f64 / n as f64,
                            };
                            let b = resilience(&before, &config).score;
                            for (dc, dt, dtop) in [
                                (0, 0, 0),
                                (1, 0, 0),
                                (0, 1, 0),
                                (0, 0, 1),
                                (1, 1, 1),
                            ] {
                                let after = ResilienceInputs {
                                    components: n + 1,
                                    single_sourced: s + 1,
                                    critical: c + dc,
                                    tariff_exposed: t + dt,
                                    top_country_share: (top + dtop) as f64 / (n + 1) as f64,
                                };
                                let a = resilience(&after, &config).score;
                                assert!(a <= b + EPS, "n={n} s={s} c={c} t={t}: {a} > {b}");
                            }
                        }
                    }
                }
            }
        }
    }
}
