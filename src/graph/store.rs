//! In-memory supply-chain graph storage
//!
//! Nodes are kept in insertion order so every analysis over the store is
//! deterministic. Edges live in an arena indexed by `EdgeId`, with adjacency
//! lists per node and type indices for fast lookups:
//! - nodes: NodeId -> Node (insertion ordered)
//! - edges: EdgeId -> Edge
//! - outgoing / incoming: NodeId -> Vec<EdgeId>
//! - type_index: NodeType -> Vec<NodeId>
//! - edge_type_index: EdgeType -> Vec<EdgeId>
//!
//! The analysis modules only ever take `&GraphStore`.

use super::edge::Edge;
use super::node::Node;
use super::types::{EdgeId, EdgeType, NodeId, NodeType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Errors that can occur while assembling a graph
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Node {0} already exists")]
    NodeAlreadyExists(NodeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Invalid edge: {edge_type} cannot connect {source_type} to {target_type}")]
    EndpointTypeMismatch {
        edge_type: EdgeType,
        source_type: NodeType,
        target_type: NodeType,
    },

    #[error("Invalid edge share {0}: must be within [0, 1]")]
    InvalidShare(f64),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory supply-chain graph
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: IndexMap<NodeId, Node>,

    edges: Vec<Edge>,

    /// Outgoing edges for each node (adjacency list)
    outgoing: HashMap<NodeId, Vec<EdgeId>>,

    /// Incoming edges for each node (adjacency list)
    incoming: HashMap<NodeId, Vec<EdgeId>>,

    type_index: HashMap<NodeType, Vec<NodeId>>,

    edge_type_index: HashMap<EdgeType, Vec<EdgeId>>,
}

/// Counts per node and edge type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_type: IndexMap<NodeType, usize>,
    pub edges_by_type: IndexMap<EdgeType, usize>,
    /// Edges whose source or target is not in the store
    pub dangling_edges: usize,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; ids are unique across all node types
    pub fn add_node(&mut self, node: Node) -> GraphResult<NodeId> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::NodeAlreadyExists(node.id));
        }
        let id = node.id.clone();
        self.type_index
            .entry(node.node_type())
            .or_default()
            .push(id.clone());
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Create an edge between two existing nodes whose types fit the relation
    pub fn create_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        edge_type: EdgeType,
    ) -> GraphResult<EdgeId> {
        let source = source.into();
        let target = target.into();

        let source_type = self
            .get_node(&source)
            .map(Node::node_type)
            .ok_or_else(|| GraphError::InvalidEdgeSource(source.clone()))?;
        let target_type = self
            .get_node(&target)
            .map(Node::node_type)
            .ok_or_else(|| GraphError::InvalidEdgeTarget(target.clone()))?;

        if !edge_type.accepts_source(source_type) || !edge_type.accepts_target(target_type) {
            return Err(GraphError::EndpointTypeMismatch {
                edge_type,
                source_type,
                target_type,
            });
        }

        Ok(self.insert_edge(source, target, edge_type))
    }

    /// Create an edge carrying the share of the target's supply it represents
    pub fn create_edge_with_share(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        edge_type: EdgeType,
        share: f64,
    ) -> GraphResult<EdgeId> {
        if !(0.0..=1.0).contains(&share) {
            return Err(GraphError::InvalidShare(share));
        }
        let id = self.create_edge(source, target, edge_type)?;
        if let Some(edge) = self.get_edge_mut(id) {
            edge.share = Some(share);
        }
        Ok(id)
    }

    /// Insert an edge without validating its endpoints.
    ///
    /// Ingestion uses this to load raw relations as-is; dangling or mistyped
    /// edges are reported later by the consistency check instead of being
    /// rejected here.
    pub fn insert_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        edge_type: EdgeType,
    ) -> EdgeId {
        let id = EdgeId::new(self.edges.len() as u64);
        let edge = Edge::new(id, source.into(), target.into(), edge_type);

        self.outgoing.entry(edge.source.clone()).or_default().push(id);
        self.incoming.entry(edge.target.clone()).or_default().push(id);
        self.edge_type_index.entry(edge_type).or_default().push(id);

        self.edges.push(edge);
        id
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a node, failing with `NodeNotFound`
    pub fn node(&self, id: &NodeId) -> GraphResult<&Node> {
        self.get_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.as_u64() as usize)
    }

    pub fn get_edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.as_u64() as usize)
    }

    /// Get all outgoing edges from a node
    pub fn outgoing_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.outgoing
            .get(node_id)
            .map(|edge_ids| {
                edge_ids
                    .iter()
                    .filter_map(|&id| self.get_edge(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get all incoming edges to a node
    pub fn incoming_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.incoming
            .get(node_id)
            .map(|edge_ids| {
                edge_ids
                    .iter()
                    .filter_map(|&id| self.get_edge(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn outgoing_of_type(&self, node_id: &NodeId, edge_type: EdgeType) -> Vec<&Edge> {
        let mut edges = self.outgoing_edges(node_id);
        edges.retain(|e| e.edge_type == edge_type);
        edges
    }

    pub fn incoming_of_type(&self, node_id: &NodeId, edge_type: EdgeType) -> Vec<&Edge> {
        let mut edges = self.incoming_edges(node_id);
        edges.retain(|e| e.edge_type == edge_type);
        edges
    }

    /// Get all nodes of a type, in insertion order
    pub fn nodes_of_type(&self, node_type: NodeType) -> Vec<&Node> {
        self.type_index
            .get(&node_type)
            .map(|ids| ids.iter().filter_map(|id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    pub fn edges_of_type(&self, edge_type: EdgeType) -> Vec<&Edge> {
        self.edge_type_index
            .get(&edge_type)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Dense position of a node in insertion order
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    /// Distinct suppliers of a component (sources of `supplies` edges that exist)
    pub fn suppliers_of(&self, component: &NodeId) -> Vec<&NodeId> {
        let mut seen = HashSet::new();
        self.incoming_of_type(component, EdgeType::Supplies)
            .into_iter()
            .map(|e| &e.source)
            .filter(|s| self.has_node(s) && seen.insert(*s))
            .collect()
    }

    /// Distinct countries a component or product is manufactured in
    pub fn countries_of(&self, node: &NodeId) -> Vec<&NodeId> {
        let mut seen = HashSet::new();
        self.outgoing_of_type(node, EdgeType::ManufacturedIn)
            .into_iter()
            .map(|e| &e.target)
            .filter(|c| {
                self.get_node(c).is_some_and(|n| n.is(NodeType::Country)) && seen.insert(*c)
            })
            .collect()
    }

    /// Products that depend on a component, directly or through sub-assemblies.
    ///
    /// Follows `usedIn` edges forward; cycles are tolerated. Results are in
    /// discovery order.
    pub fn dependent_products(&self, component: &NodeId) -> Vec<NodeId> {
        let mut visited: HashSet<&NodeId> = HashSet::new();
        let mut queue: VecDeque<&NodeId> = VecDeque::new();
        let mut products = Vec::new();

        visited.insert(component);
        queue.push_back(component);

        while let Some(current) = queue.pop_front() {
            for edge in self.outgoing_of_type(current, EdgeType::UsedIn) {
                if !visited.insert(&edge.target) {
                    continue;
                }
                match self.get_node(&edge.target).map(Node::node_type) {
                    Some(NodeType::Product) => products.push(edge.target.clone()),
                    Some(NodeType::Component) => queue.push_back(&edge.target),
                    _ => {}
                }
            }
        }

        products
    }

    /// Companies that own a product, following subsidiary links up to the root parent
    pub fn owners_of(&self, product: &NodeId) -> Vec<NodeId> {
        let mut visited: HashSet<&NodeId> = HashSet::new();
        let mut queue: VecDeque<&NodeId> = VecDeque::new();
        let mut owners = Vec::new();

        queue.push_back(product);
        visited.insert(product);
        while let Some(current) = queue.pop_front() {
            for edge in self.outgoing_of_type(current, EdgeType::OwnedBy) {
                if visited.insert(&edge.target) && self.has_node(&edge.target) {
                    owners.push(edge.target.clone());
                    queue.push_back(&edge.target);
                }
            }
        }
        owners
    }

    pub fn statistics(&self) -> GraphStatistics {
        let mut nodes_by_type = IndexMap::new();
        for node_type in NodeType::ALL {
            let count = self.type_index.get(&node_type).map_or(0, Vec::len);
            if count > 0 {
                nodes_by_type.insert(node_type, count);
            }
        }

        let mut edges_by_type = IndexMap::new();
        for edge_type in EdgeType::ALL {
            let count = self.edge_type_index.get(&edge_type).map_or(0, Vec::len);
            if count > 0 {
                edges_by_type.insert(edge_type, count);
            }
        }

        let dangling_edges = self
            .edges
            .iter()
            .filter(|e| !self.has_node(&e.source) || !self.has_node(&e.target))
            .count();

        GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            nodes_by_type,
            edges_by_type,
            dangling_edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::{Component, Country, Product};

    fn sample() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(Node::company("sup_a", "Supplier A")).unwrap();
        store.add_node(Node::company("sup_b", "Supplier B")).unwrap();
        store
            .add_node(Node::component("comp_die", "Die", Component::default()))
            .unwrap();
        store
            .add_node(Node::component("comp_module", "Module", Component::default()))
            .unwrap();
        store
            .add_node(Node::product("prod_phone", "Phone", Product::default()))
            .unwrap();
        store
            .add_node(Node::country("country_tw", "Taiwan", Country::default()))
            .unwrap();

        store.create_edge("sup_a", "comp_die", EdgeType::Supplies).unwrap();
        store.create_edge("sup_b", "comp_die", EdgeType::Supplies).unwrap();
        store.create_edge("sup_a", "comp_die", EdgeType::Supplies).unwrap();
        store.create_edge("comp_die", "comp_module", EdgeType::UsedIn).unwrap();
        store.create_edge("comp_module", "prod_phone", EdgeType::UsedIn).unwrap();
        store
            .create_edge("comp_die", "country_tw", EdgeType::ManufacturedIn)
            .unwrap();
        store
    }

    #[test]
    fn test_add_and_get_node() {
        let store = sample();
        assert_eq!(store.node_count(), 6);
        let node = store.get_node(&NodeId::new("comp_die")).unwrap();
        assert_eq!(node.name, "Die");
        assert_eq!(store.index_of(&NodeId::new("comp_die")), Some(2));
        assert_eq!(store.node_at(2).unwrap().id, NodeId::new("comp_die"));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut store = sample();
        let err = store.add_node(Node::company("sup_a", "Again")).unwrap_err();
        assert_eq!(err, GraphError::NodeAlreadyExists(NodeId::new("sup_a")));
    }

    #[test]
    fn test_create_edge_validates_endpoints() {
        let mut store = sample();

        let err = store
            .create_edge("ghost", "comp_die", EdgeType::Supplies)
            .unwrap_err();
        assert_eq!(err, GraphError::InvalidEdgeSource(NodeId::new("ghost")));

        let err = store
            .create_edge("sup_a", "ghost", EdgeType::Supplies)
            .unwrap_err();
        assert_eq!(err, GraphError::InvalidEdgeTarget(NodeId::new("ghost")));

        let err = store
            .create_edge("country_tw", "comp_die", EdgeType::Supplies)
            .unwrap_err();
        assert!(matches!(err, GraphError::EndpointTypeMismatch { .. }));

        let err = store
            .create_edge_with_share("sup_a", "comp_module", EdgeType::Supplies, 1.5)
            .unwrap_err();
        assert_eq!(err, GraphError::InvalidShare(1.5));
    }

    #[test]
    fn test_suppliers_are_distinct() {
        let store = sample();
        let suppliers = store.suppliers_of(&NodeId::new("comp_die"));
        assert_eq!(suppliers.len(), 2);
        assert_eq!(suppliers[0].as_str(), "sup_a");
    }

    #[test]
    fn test_dependent_products_through_subassembly() {
        let store = sample();
        let products = store.dependent_products(&NodeId::new("comp_die"));
        assert_eq!(products, vec![NodeId::new("prod_phone")]);
    }

    #[test]
    fn test_dependent_products_tolerates_cycles() {
        let mut store = sample();
        store.create_edge("comp_module", "comp_die", EdgeType::UsedIn).unwrap();
        let products = store.dependent_products(&NodeId::new("comp_die"));
        assert_eq!(products.len(), 1);
    }

    #[test]
    fn test_countries_of() {
        let store = sample();
        let countries = store.countries_of(&NodeId::new("comp_die"));
        assert_eq!(countries, vec![&NodeId::new("country_tw")]);
        assert!(store.countries_of(&NodeId::new("comp_module")).is_empty());
    }

    #[test]
    fn test_insert_edge_allows_dangling() {
        let mut store = sample();
        store.insert_edge("sup_a", "missing_comp", EdgeType::Supplies);
        let stats = store.statistics();
        assert_eq!(stats.dangling_edges, 1);
        assert_eq!(stats.edges_by_type[&EdgeType::Supplies], 4);
        assert_eq!(stats.nodes_by_type[&NodeType::Company], 2);
    }

    #[test]
    fn test_owners_follow_subsidiaries() {
        let mut store = sample();
        store.add_node(Node::company("parent", "Parent Co")).unwrap();
        store.create_edge("prod_phone", "sup_b", EdgeType::OwnedBy).unwrap();
        store.create_edge("sup_b", "parent", EdgeType::OwnedBy).unwrap();

        let owners = store.owners_of(&NodeId::new("prod_phone"));
        assert_eq!(owners, vec![NodeId::new("sup_b"), NodeId::new("parent")]);
    }

    #[test]
    fn test_typed_edge_queries() {
        let store = sample();
        let die = NodeId::new("comp_die");
        assert_eq!(store.incoming_of_type(&die, EdgeType::Supplies).len(), 3);
        assert_eq!(store.outgoing_of_type(&die, EdgeType::UsedIn).len(), 1);
        assert_eq!(store.outgoing_edges(&die).len(), 2);
        assert_eq!(store.nodes_of_type(NodeType::Component).len(), 2);
        assert_eq!(store.edges_of_type(EdgeType::ManufacturedIn).len(), 1);
    }
}
