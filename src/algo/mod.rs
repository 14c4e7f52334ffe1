//! Graph algorithms module
//!
//! Propagation and reachability are implemented in the
//! `prophet-graph-algorithms` crate over a dense CSR view. This module provides
//! the adapter layer: it projects the store onto a subset of edge types and
//! translates between string node ids and dense algorithm ids.

use crate::graph::{Edge, EdgeType, GraphStore, NodeId};
use prophet_graph_algorithms::{GraphView, NodeId as AlgoNodeId};
use serde::{Deserialize, Serialize};

// Re-export algorithms
pub use prophet_graph_algorithms::{
    propagate, reachable_within, Direction, PropagationConfig, PropagationResult, Reached,
};

/// Build a GraphView from the store for algorithm execution.
///
/// Every node of the store is present; algorithm ids are the store's insertion
/// index. Only edges whose type is listed in `edge_types` and whose endpoints
/// both exist are projected. When `weight` is given it is evaluated per edge.
pub fn build_view(
    store: &GraphStore,
    edge_types: &[EdgeType],
    weight: Option<&dyn Fn(&Edge) -> f64>,
) -> GraphView {
    let node_count = store.node_count();
    let index_to_node: Vec<AlgoNodeId> = (0..node_count as AlgoNodeId).collect();
    let mut outgoing: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];

    for edge in store.all_edges() {
        if !edge_types.contains(&edge.edge_type) {
            continue;
        }
        let (Some(u), Some(v)) = (store.index_of(&edge.source), store.index_of(&edge.target))
        else {
            continue;
        };
        let w = weight.map_or(1.0, |f| f(edge));
        outgoing[u].push((v, w));
    }

    GraphView::from_adjacency(index_to_node, outgoing, weight.is_some())
}

/// A reached node expressed in store ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityTrace {
    pub node: NodeId,
    pub severity: f64,
    pub hop: usize,
    pub via: Option<NodeId>,
}

/// A projection of the store bound to the store it came from
pub struct StoreView<'a> {
    store: &'a GraphStore,
    view: GraphView,
}

impl<'a> StoreView<'a> {
    pub fn new(store: &'a GraphStore, edge_types: &[EdgeType]) -> Self {
        Self {
            store,
            view: build_view(store, edge_types, None),
        }
    }

    pub fn weighted(
        store: &'a GraphStore,
        edge_types: &[EdgeType],
        weight: &dyn Fn(&Edge) -> f64,
    ) -> Self {
        Self {
            store,
            view: build_view(store, edge_types, Some(weight)),
        }
    }

    pub fn view(&self) -> &GraphView {
        &self.view
    }

    fn algo_ids(&self, ids: &[NodeId]) -> Vec<AlgoNodeId> {
        ids.iter()
            .filter_map(|id| self.store.index_of(id))
            .map(|idx| idx as AlgoNodeId)
            .collect()
    }

    fn store_id(&self, algo_id: AlgoNodeId) -> Option<NodeId> {
        self.store
            .node_at(algo_id as usize)
            .map(|node| node.id.clone())
    }

    /// Nodes reachable from `sources` with their hop distance
    pub fn reachable(
        &self,
        sources: &[NodeId],
        direction: Direction,
        max_depth: Option<usize>,
    ) -> Vec<(NodeId, usize)> {
        let sources = self.algo_ids(sources);
        reachable_within(&self.view, &sources, direction, max_depth)
            .into_iter()
            .filter_map(|(id, hop)| self.store_id(id).map(|node| (node, hop)))
            .collect()
    }

    /// Propagate seed severities downstream; highest severity first
    pub fn propagate(
        &self,
        seeds: &[(NodeId, f64)],
        config: &PropagationConfig,
    ) -> (Vec<SeverityTrace>, usize) {
        let seeds: Vec<(AlgoNodeId, f64)> = seeds
            .iter()
            .filter_map(|(id, severity)| {
                self.store
                    .index_of(id)
                    .map(|idx| (idx as AlgoNodeId, *severity))
            })
            .collect();

        let result = propagate(&self.view, &seeds, config);
        let traces = result
            .reached
            .into_iter()
            .filter_map(|r| {
                Some(SeverityTrace {
                    node: self.store_id(r.node)?,
                    severity: r.severity,
                    hop: r.hop,
                    via: r.via.and_then(|v| self.store_id(v)),
                })
            })
            .collect();
        (traces, result.depth_reached)
    }
}
