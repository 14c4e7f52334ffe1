//! Graph consistency check
//!
//! Edges loaded without validation may point at missing nodes or join node
//! types their relation does not allow. Such edges are reported, never fatal.

use crate::graph::{EdgeId, EdgeType, GraphStore, Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InconsistencyKind {
    MissingSource,
    MissingTarget,
    EndpointTypeMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub edge: EdgeId,
    pub edge_type: EdgeType,
    pub source: NodeId,
    pub target: NodeId,
    pub source_type: Option<NodeType>,
    pub target_type: Option<NodeType>,
    pub kind: InconsistencyKind,
}

pub fn check_consistency(graph: &GraphStore) -> Vec<Inconsistency> {
    let mut issues = Vec::new();

    for edge in graph.all_edges() {
        let source_type = graph.get_node(&edge.source).map(Node::node_type);
        let target_type = graph.get_node(&edge.target).map(Node::node_type);

        let kind = match (source_type, target_type) {
            (None, _) => Some(InconsistencyKind::MissingSource),
            (_, None) => Some(InconsistencyKind::MissingTarget),
            (Some(s), Some(t))
                if !edge.edge_type.accepts_source(s) || !edge.edge_type.accepts_target(t) =>
            {
                Some(InconsistencyKind::EndpointTypeMismatch)
            }
            _ => None,
        };

        if let Some(kind) = kind {
            debug!(
                edge = %edge.id,
                edge_type = %edge.edge_type,
                source = %edge.source,
                target = %edge.target,
                ?kind,
                "Inconsistent edge"
            );
            issues.push(Inconsistency {
                edge: edge.id,
                edge_type: edge.edge_type,
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_type,
                target_type,
                kind,
            });
        }
    }

    if !issues.is_empty() {
        warn!("Graph has {} inconsistent edges", issues.len());
    }
    issues
}
