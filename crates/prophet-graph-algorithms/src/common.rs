//! Shared utilities for graph algorithms
//!
//! Provides a read-only, dense view of the dependency topology for algorithm execution.

use std::collections::HashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,

    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,

    /// Edge weights aligned with `out_targets`. Propagation reads them as attenuation factors.
    pub weights: Option<Vec<f64>>,
}

impl GraphView {
    /// An empty view with no nodes
    pub fn empty() -> Self {
        GraphView {
            node_count: 0,
            index_to_node: Vec::new(),
            node_to_index: HashMap::new(),
            out_offsets: vec![0],
            out_targets: Vec::new(),
            in_offsets: vec![0],
            in_sources: Vec::new(),
            weights: None,
        }
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Get weights for outgoing edges of a node
    pub fn weights(&self, idx: usize) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| {
            let start = self.out_offsets[idx];
            let end = self.out_offsets[idx + 1];
            &w[start..end]
        })
    }

    /// Build a view from per-node adjacency lists.
    ///
    /// `outgoing[i]` holds `(target_index, weight)` pairs for node `i`; the incoming
    /// side is derived. Weights are kept only when `weighted` is set.
    pub fn from_adjacency(
        index_to_node: Vec<NodeId>,
        outgoing: Vec<Vec<(usize, f64)>>,
        weighted: bool,
    ) -> Self {
        let node_count = index_to_node.len();
        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut flat_weights = if weighted { Some(Vec::new()) } else { None };
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];

        out_offsets.push(0);
        for (u, neighbors) in outgoing.into_iter().enumerate() {
            for (v, w) in neighbors {
                out_targets.push(v);
                incoming[v].push(u);
                if let Some(ref mut w_flat) = flat_weights {
                    w_flat.push(w);
                }
            }
            out_offsets.push(out_targets.len());
        }
        // Nodes without an adjacency row still need an offset entry
        while out_offsets.len() < node_count + 1 {
            out_offsets.push(out_targets.len());
        }

        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();
        in_offsets.push(0);
        for sources in incoming {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
            weights: flat_weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_adjacency_builds_both_directions() {
        // 10 -> 20 -> 30, 10 -> 30
        let view = GraphView::from_adjacency(
            vec![10, 20, 30],
            vec![vec![(1, 0.5), (2, 1.0)], vec![(2, 0.25)], vec![]],
            true,
        );

        assert_eq!(view.node_count, 3);
        assert_eq!(view.successors(0), &[1, 2]);
        assert_eq!(view.predecessors(2), &[0, 1]);
        assert_eq!(view.out_degree(2), 0);
        assert_eq!(view.in_degree(1), 1);
        assert_eq!(view.weights(0), Some(&[0.5, 1.0][..]));
        assert_eq!(view.node_to_index.get(&30), Some(&2));
    }

    #[test]
    fn test_unweighted_view_has_no_weights() {
        let view = GraphView::from_adjacency(vec![1, 2], vec![vec![(1, 0.3)]], false);
        assert!(view.weights(0).is_none());
        assert_eq!(view.successors(1).len(), 0);
    }

    #[test]
    fn test_short_adjacency_pads_offsets() {
        let view = GraphView::from_adjacency(vec![1, 2, 3], vec![vec![(2, 1.0)]], false);
        assert_eq!(view.out_offsets.len(), 4);
        assert!(view.successors(2).is_empty());
    }

    #[test]
    fn test_empty_view() {
        let view = GraphView::empty();
        assert_eq!(view.node_count, 0);
        assert!(view.node_to_index.is_empty());
    }
}
