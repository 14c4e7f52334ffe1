//! Edge implementation for the supply-chain graph
//!
//! Edges are directed and typed; several edges of different types may connect
//! the same pair of nodes.

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// A directed, typed relation between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    pub edge_type: EdgeType,

    /// Fraction of the target's supply carried by this edge, in [0, 1]
    pub share: Option<f64>,

    pub lead_time_days: Option<f64>,

    /// Residual attributes (contract ids, tariff codes, ...)
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, edge_type: EdgeType) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type,
            share: None,
            lead_time_days: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_share(mut self, share: f64) -> Self {
        self.share = Some(share);
        self
    }

    pub fn with_lead_time(mut self, days: f64) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn is(&self, edge_type: EdgeType) -> bool {
        self.edge_type == edge_type
    }

    /// Check if this edge goes FROM a specific node
    pub fn starts_from(&self, node: &NodeId) -> bool {
        &self.source == node
    }

    /// Check if this edge goes TO a specific node
    pub fn ends_at(&self, node: &NodeId) -> bool {
        &self.target == node
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_edge() {
        let edge = Edge::new(
            EdgeId::new(1),
            NodeId::new("sup_tsmc"),
            NodeId::new("comp_soc"),
            EdgeType::Supplies,
        )
        .with_share(0.6)
        .with_lead_time(45.0);

        assert!(edge.starts_from(&NodeId::new("sup_tsmc")));
        assert!(edge.ends_at(&NodeId::new("comp_soc")));
        assert!(edge.is(EdgeType::Supplies));
        assert_eq!(edge.share, Some(0.6));
        assert_eq!(edge.lead_time_days, Some(45.0));
    }

    #[test]
    fn test_edge_properties() {
        let mut edge = Edge::new(
            EdgeId::new(2),
            NodeId::new("comp_soc"),
            NodeId::new("tariff_301"),
            EdgeType::SubjectToTariff,
        );
        edge.set_property("hts_code", "8542.31");
        assert_eq!(edge.get_property("hts_code").unwrap().as_string(), Some("8542.31"));
    }

    #[test]
    fn test_parallel_edges_are_distinct() {
        let a = NodeId::new("comp_a");
        let b = NodeId::new("country_tw");
        let e1 = Edge::new(EdgeId::new(1), a.clone(), b.clone(), EdgeType::ManufacturedIn);
        let e2 = Edge::new(EdgeId::new(2), a, b, EdgeType::Affects);
        assert_ne!(e1, e2);
    }
}
