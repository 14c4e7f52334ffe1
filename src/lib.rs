//! Nova Prophet
//!
//! Truth analysis and disruption simulation over an in-memory supply-chain
//! graph of countries, companies, products, components, materials, tariff
//! rules and disruption events.
//!
//! # Architecture
//!
//! - [`graph`]: typed property graph with adjacency lists and type indices
//! - [`algo`]: adapter onto the `prophet-graph-algorithms` CSR view
//! - [`veritas`]: structural findings (criticality, single points of failure,
//!   geographic concentration, tariff exposure, resilience) plus country,
//!   supplier and category risk profiles
//! - [`prophet`]: scenario modeling, impact propagation, recommendations,
//!   alternative sourcing
//! - [`config`]: named weights and thresholds, loadable from YAML
//!
//! Every operation takes the graph by shared reference and never mutates it,
//! so one `GraphStore` can serve any number of concurrent analyses.
//!
//! ## Example Usage
//!
//! ```rust
//! use nova_prophet::config::{AnalysisConfig, ImpactConfig};
//! use nova_prophet::graph::{Component, EdgeType, GraphStore, Node, NodeId, Product};
//! use nova_prophet::prophet::{build_scenario, simulate, DisruptionLevel, ScenarioRequest};
//! use nova_prophet::veritas::{analyze, FindingKind, Scope};
//!
//! let mut graph = GraphStore::new();
//! graph.add_node(Node::company("s1", "Foundry")).unwrap();
//! graph.add_node(Node::component("c1", "SoC", Component::default())).unwrap();
//! graph.add_node(Node::product("p1", "Phone", Product::default())).unwrap();
//! graph.create_edge("s1", "c1", EdgeType::Supplies).unwrap();
//! graph.create_edge("c1", "p1", EdgeType::UsedIn).unwrap();
//!
//! let report = analyze(&graph, &Scope::All, &AnalysisConfig::default()).unwrap();
//! assert!(report.has_finding(FindingKind::SinglePoint));
//!
//! let scenario = build_scenario(
//!     &graph,
//!     ScenarioRequest::SupplierDisruption {
//!         supplier: NodeId::new("s1"),
//!         level: DisruptionLevel::Complete,
//!         duration_months: 3.0,
//!     },
//! )
//! .unwrap();
//! let impact = simulate(&graph, &scenario, &report, &ImpactConfig::default()).unwrap();
//! assert_eq!(impact.affected_products.len(), 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod graph;
pub mod prophet;
pub mod veritas;

// Re-export main types for convenience
pub use graph::{
    Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStore, Node, NodeId, NodeKind,
    NodeType, PropertyMap, PropertyValue,
};

pub use config::{AnalysisConfig, ConfigError, ConfigResult, ImpactConfig, ProphetConfig};

pub use veritas::{
    analyze, analyze_many, Finding, FindingKind, RiskLevel, Scope, VeritasError, VeritasReport,
    VeritasResult,
};

pub use prophet::{
    build_scenario, find_alternative_sources, recommend, scenario_from_event, simulate,
    simulate_combined, AlternativeSources, AlternativesError, ImpactError,
    ImpactResult, Recommendation, Scenario, ScenarioError, ScenarioRequest, ScenarioResult,
    SimulationResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
