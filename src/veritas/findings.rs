//! Structural risk findings

use crate::graph::{EdgeId, EdgeType, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FindingKind {
    SinglePoint,
    CriticalComponent,
    GeoConcentration,
    TariffVulnerable,
    /// Component missing suppliers or dependent products
    DataGap,
    /// Edge whose endpoints are missing or do not fit its relation
    GraphInconsistency,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingKind::SinglePoint => "single point of failure",
            FindingKind::CriticalComponent => "critical component",
            FindingKind::GeoConcentration => "geographic concentration",
            FindingKind::TariffVulnerable => "tariff vulnerability",
            FindingKind::DataGap => "data gap",
            FindingKind::GraphInconsistency => "graph inconsistency",
        };
        write!(f, "{}", name)
    }
}

/// Three-step qualitative scale shared by findings, country risk and impact levels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Level of a severity in [0, 1]
    pub fn from_severity(severity: f64) -> Self {
        if severity >= 0.7 {
            RiskLevel::High
        } else if severity >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Level of a 0-100 score against explicit cutoffs (strictly above)
    pub fn from_score(score: f64, medium: f64, high: f64) -> Self {
        if score > high {
            RiskLevel::High
        } else if score > medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// What a finding is based on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Evidence {
    SoleSupplier {
        supplier: NodeId,
        products: Vec<NodeId>,
    },
    Criticality {
        score: f64,
        supplier_count: usize,
        product_count: usize,
    },
    CountryShare {
        share: f64,
        components: f64,
    },
    Tariff {
        rule: NodeId,
        rate: f64,
        products: Vec<NodeId>,
    },
    MissingLinks {
        suppliers: bool,
        products: bool,
    },
    Inconsistency {
        edge: EdgeId,
        edge_type: EdgeType,
        source_type: Option<NodeType>,
        target_type: Option<NodeType>,
    },
}

/// A structural risk fact about the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Primary subject first
    pub subjects: Vec<NodeId>,
    /// Severity in [0, 1]
    pub severity: f64,
    pub level: RiskLevel,
    pub evidence: Evidence,
    pub message: String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        subjects: Vec<NodeId>,
        severity: f64,
        evidence: Evidence,
        message: impl Into<String>,
    ) -> Self {
        let severity = severity.clamp(0.0, 1.0);
        Self {
            kind,
            subjects,
            severity,
            level: RiskLevel::from_severity(severity),
            evidence,
            message: message.into(),
        }
    }

    pub fn subject(&self) -> Option<&NodeId> {
        self.subjects.first()
    }

    pub fn concerns(&self, node: &NodeId) -> bool {
        self.subjects.contains(node)
    }
}

/// Most severe first; ties broken by kind and primary subject
pub(crate) fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        b.severity
            .partial_cmp(&a.severity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.kind.cmp(&b.kind))
            .then(a.subject().cmp(&b.subject()))
    });
}
