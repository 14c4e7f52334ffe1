//! Core type definitions for the supply-chain graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node (the ingestion key, e.g. "comp_c1", "country_taiwan")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        EdgeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        EdgeId(id)
    }
}

/// Type tag of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum NodeType {
    Country,
    Company,
    Product,
    Component,
    Material,
    TariffRule,
    DisruptionEvent,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Country,
        NodeType::Company,
        NodeType::Product,
        NodeType::Component,
        NodeType::Material,
        NodeType::TariffRule,
        NodeType::DisruptionEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Country => "country",
            NodeType::Company => "company",
            NodeType::Product => "product",
            NodeType::Component => "component",
            NodeType::Material => "material",
            NodeType::TariffRule => "tariff_rule",
            NodeType::DisruptionEvent => "disruption_event",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Relationship type of a directed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum EdgeType {
    /// supplier (company or material) -> component
    Supplies,
    /// component -> product, component -> component, material -> component
    UsedIn,
    /// component or product -> country
    ManufacturedIn,
    /// product -> company, subsidiary -> parent company
    OwnedBy,
    /// component -> tariff rule
    SubjectToTariff,
    /// disruption event -> any node
    Affects,
}

impl EdgeType {
    pub const ALL: [EdgeType; 6] = [
        EdgeType::Supplies,
        EdgeType::UsedIn,
        EdgeType::ManufacturedIn,
        EdgeType::OwnedBy,
        EdgeType::SubjectToTariff,
        EdgeType::Affects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Supplies => "supplies",
            EdgeType::UsedIn => "usedIn",
            EdgeType::ManufacturedIn => "manufacturedIn",
            EdgeType::OwnedBy => "ownedBy",
            EdgeType::SubjectToTariff => "subjectToTariff",
            EdgeType::Affects => "affects",
        }
    }

    /// Whether a node of type `source` may start an edge of this type
    pub fn accepts_source(&self, source: NodeType) -> bool {
        match self {
            EdgeType::Supplies => matches!(source, NodeType::Company | NodeType::Material),
            EdgeType::UsedIn => matches!(source, NodeType::Component | NodeType::Material),
            EdgeType::ManufacturedIn => matches!(source, NodeType::Component | NodeType::Product),
            EdgeType::OwnedBy => matches!(source, NodeType::Product | NodeType::Company),
            EdgeType::SubjectToTariff => matches!(
                source,
                NodeType::Component | NodeType::Material | NodeType::Product
            ),
            EdgeType::Affects => source == NodeType::DisruptionEvent,
        }
    }

    /// Whether a node of type `target` may end an edge of this type
    pub fn accepts_target(&self, target: NodeType) -> bool {
        match self {
            EdgeType::Supplies => target == NodeType::Component,
            EdgeType::UsedIn => matches!(target, NodeType::Product | NodeType::Component),
            EdgeType::ManufacturedIn => target == NodeType::Country,
            EdgeType::OwnedBy => target == NodeType::Company,
            EdgeType::SubjectToTariff => target == NodeType::TariffRule,
            EdgeType::Affects => true,
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
