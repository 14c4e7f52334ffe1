//! Supply-chain graph model
//!
//! Typed nodes (countries, companies, products, components, materials, tariff
//! rules, disruption events) joined by directed, typed edges, held in an
//! in-memory store with adjacency lists and type indices.

pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::{
    Company, ComplexityTier, Component, Country, DisruptionEvent, EventType, Material, Node,
    NodeKind, Product, SeverityTier, TariffRule,
};
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStatistics, GraphStore};
pub use types::{EdgeId, EdgeType, NodeId, NodeType};
