//! Recommendation generator
//!
//! Maps each finding category present in a report to one mitigation template,
//! filled in with the findings' counts and subjects. Categories without a
//! finding never produce a recommendation.

use super::impact::ImpactResult;
use crate::graph::NodeId;
use crate::veritas::{Finding, FindingKind, RiskLevel, VeritasReport};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Subjects named in a rationale before it is abbreviated
const NAMED_SUBJECTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecommendationCategory {
    DiversifySuppliers,
    ReduceGeographicConcentration,
    HedgeTariffExposure,
    AddMonitoring,
    CloseDataGaps,
}

impl RecommendationCategory {
    /// Category addressing a finding kind, if any
    pub fn for_finding(kind: FindingKind) -> Option<Self> {
        match kind {
            FindingKind::SinglePoint => Some(RecommendationCategory::DiversifySuppliers),
            FindingKind::GeoConcentration => {
                Some(RecommendationCategory::ReduceGeographicConcentration)
            }
            FindingKind::TariffVulnerable => Some(RecommendationCategory::HedgeTariffExposure),
            FindingKind::CriticalComponent => Some(RecommendationCategory::AddMonitoring),
            FindingKind::DataGap => Some(RecommendationCategory::CloseDataGaps),
            FindingKind::GraphInconsistency => None,
        }
    }

    fn actions(&self) -> &'static [&'static str] {
        match self {
            RecommendationCategory::DiversifySuppliers => &[
                "Qualify at least one alternative supplier per component",
                "Negotiate capacity reservations with the current supplier",
                "Build safety stock to cover the qualification lead time",
            ],
            RecommendationCategory::ReduceGeographicConcentration => &[
                "Shift part of the volume to suppliers in other regions",
                "Prefer dual-region sourcing for new designs",
            ],
            RecommendationCategory::HedgeTariffExposure => &[
                "Evaluate tariff engineering and alternative origins",
                "Review duty drawback and exemption programs",
                "Price tariff pass-through into affected products",
            ],
            RecommendationCategory::AddMonitoring => &[
                "Track supplier health and lead times for critical components",
                "Set alerts on geopolitical and trade events in manufacturing countries",
            ],
            RecommendationCategory::CloseDataGaps => &[
                "Complete supplier and usage records for the listed components",
            ],
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecommendationCategory::DiversifySuppliers => "diversify suppliers",
            RecommendationCategory::ReduceGeographicConcentration => {
                "reduce geographic concentration"
            }
            RecommendationCategory::HedgeTariffExposure => "hedge tariff exposure",
            RecommendationCategory::AddMonitoring => "add monitoring",
            RecommendationCategory::CloseDataGaps => "close data gaps",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl From<RiskLevel> for Priority {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Priority::Low,
            RiskLevel::Medium => Priority::Medium,
            RiskLevel::High => Priority::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub rationale: String,
    /// Every node named by the underlying findings, primary subjects first
    pub subjects: Vec<NodeId>,
    pub actions: Vec<String>,
    pub finding_count: usize,
    /// Highest severity among the underlying findings
    pub severity: f64,
    /// Highest simulated severity on any subject, when an impact was supplied
    pub predicted_impact: Option<f64>,
}

fn list(ids: &[&NodeId]) -> String {
    let rest = ids.len().saturating_sub(NAMED_SUBJECTS);
    let more = format!("{} more", rest);
    let mut names: Vec<&str> = ids.iter().take(NAMED_SUBJECTS).map(|id| id.as_str()).collect();
    if rest > 0 {
        names.push(more.as_str());
    }
    names.join(", ")
}

fn rationale(category: RecommendationCategory, findings: &[&Finding]) -> String {
    let primary: Vec<&NodeId> = findings.iter().filter_map(|f| f.subject()).collect();
    let n = findings.len();
    match category {
        RecommendationCategory::DiversifySuppliers => format!(
            "{} component(s) depend on a single supplier: {}",
            n,
            list(&primary)
        ),
        RecommendationCategory::ReduceGeographicConcentration => format!(
            "Manufacturing is concentrated in {} countr{}: {}",
            n,
            if n == 1 { "y" } else { "ies" },
            list(&primary)
        ),
        RecommendationCategory::HedgeTariffExposure => format!(
            "{} component(s) are subject to active tariffs: {}",
            n,
            list(&primary)
        ),
        RecommendationCategory::AddMonitoring => format!(
            "{} critical component(s) need continuous monitoring: {}",
            n,
            list(&primary)
        ),
        RecommendationCategory::CloseDataGaps => format!(
            "{} component(s) lack supplier or usage data: {}",
            n,
            list(&primary)
        ),
    }
}

/// Generate recommendations for a report, optionally ranked by a simulation.
///
/// Without an impact result the order is priority, then finding severity.
/// With one, the predicted impact on each recommendation's subjects ranks
/// first.
pub fn recommend(report: &VeritasReport, impact: Option<&ImpactResult>) -> Vec<Recommendation> {
    let mut grouped: Vec<(RecommendationCategory, Vec<&Finding>)> = Vec::new();
    for finding in &report.findings {
        let Some(category) = RecommendationCategory::for_finding(finding.kind) else {
            continue;
        };
        match grouped.iter().position(|(c, _)| *c == category) {
            Some(i) => grouped[i].1.push(finding),
            None => grouped.push((category, vec![finding])),
        }
    }

    let mut recommendations: Vec<Recommendation> = grouped
        .into_iter()
        .map(|(category, findings)| {
            let severity = findings.iter().map(|f| f.severity).fold(0.0, f64::max);
            let mut priority = Priority::from(RiskLevel::from_severity(severity));
            if category == RecommendationCategory::DiversifySuppliers && findings.len() > 5 {
                priority = Priority::High;
            }

            let mut subjects: Vec<NodeId> = Vec::new();
            for id in findings.iter().filter_map(|f| f.subject()) {
                if !subjects.contains(id) {
                    subjects.push(id.clone());
                }
            }
            for id in findings.iter().flat_map(|f| f.subjects.iter()) {
                if !subjects.contains(id) {
                    subjects.push(id.clone());
                }
            }

            let predicted_impact = impact.map(|result| {
                subjects
                    .iter()
                    .map(|id| result.severity_of(id))
                    .fold(0.0, f64::max)
            });

            Recommendation {
                category,
                priority,
                rationale: rationale(category, &findings),
                subjects,
                actions: category.actions().iter().map(|a| a.to_string()).collect(),
                finding_count: findings.len(),
                severity,
                predicted_impact,
            }
        })
        .collect();

    recommendations.sort_by(|a, b| {
        let by_impact = match (a.predicted_impact, b.predicted_impact) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        };
        by_impact
            .then(b.priority.cmp(&a.priority))
            .then(b.severity.partial_cmp(&a.severity).unwrap_or(Ordering::Equal))
            .then(a.category.cmp(&b.category))
    });

    debug!("Generated {} recommendations", recommendations.len());
    recommendations
}
