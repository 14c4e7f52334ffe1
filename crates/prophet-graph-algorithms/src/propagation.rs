//! Bounded severity propagation
//!
//! Pushes a disruption severity outward from a seed set. Every hop multiplies the
//! severity by `decay` and by the edge weight (clamped to [0, 1]); a node keeps the
//! maximum severity over all paths that reach it. A branch stops when its severity
//! drops below `floor` or when `max_depth` hops have been taken, so the walk
//! terminates on cyclic and densely connected graphs.

use super::common::{GraphView, NodeId};
use rustc_hash::FxHashMap;

/// Propagation bounds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropagationConfig {
    /// Attenuation per hop, in (0, 1]
    pub decay: f64,
    /// Severities below this value are not propagated further
    pub floor: f64,
    /// Maximum number of hops from any seed
    pub max_depth: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            decay: 0.7,
            floor: 0.05,
            max_depth: 4,
        }
    }
}

/// A node reached by the propagation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reached {
    pub node: NodeId,
    /// Worst-case severity over all paths
    pub severity: f64,
    /// Hop count of the path that produced `severity` (0 for seeds)
    pub hop: usize,
    /// Predecessor on that path, `None` for seeds
    pub via: Option<NodeId>,
}

/// Result of a propagation run
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropagationResult {
    /// Reached nodes, highest severity first
    pub reached: Vec<Reached>,
    /// Largest hop count recorded
    pub depth_reached: usize,
}

impl PropagationResult {
    pub fn get(&self, node: NodeId) -> Option<&Reached> {
        self.reached.iter().find(|r| r.node == node)
    }
}

#[derive(Clone, Copy)]
struct Trace {
    severity: f64,
    hop: usize,
    via: Option<usize>,
}

/// Propagate seed severities through the view.
///
/// Works level by level: the frontier at hop `h` holds, for each node, the best
/// severity of any path of exactly `h` hops. A frontier entry that does not beat
/// the node's best severity from an earlier hop is dropped, since the earlier
/// entry dominates it (higher severity, more remaining depth).
pub fn propagate(
    view: &GraphView,
    seeds: &[(NodeId, f64)],
    config: &PropagationConfig,
) -> PropagationResult {
    let decay = config.decay.clamp(0.0, 1.0);
    let mut best: FxHashMap<usize, Trace> = FxHashMap::default();
    let mut frontier: FxHashMap<usize, f64> = FxHashMap::default();

    for &(node, severity) in seeds {
        let Some(&idx) = view.node_to_index.get(&node) else {
            continue;
        };
        let severity = severity.clamp(0.0, 1.0);
        if severity <= 0.0 {
            continue;
        }
        let entry = best.entry(idx).or_insert(Trace {
            severity: 0.0,
            hop: 0,
            via: None,
        });
        if severity > entry.severity {
            entry.severity = severity;
            frontier.insert(idx, severity);
        }
    }

    let mut hop = 0;
    while hop < config.max_depth && !frontier.is_empty() {
        let mut next: FxHashMap<usize, (f64, usize)> = FxHashMap::default();

        for (&u, &severity) in &frontier {
            if severity < config.floor {
                continue;
            }
            let weights = view.weights(u);
            for (i, &v) in view.successors(u).iter().enumerate() {
                let weight = weights.map_or(1.0, |w| w[i]).clamp(0.0, 1.0);
                let propagated = severity * decay * weight;
                if propagated < config.floor {
                    continue;
                }
                let slot = next.entry(v).or_insert((0.0, u));
                if propagated > slot.0 {
                    *slot = (propagated, u);
                }
            }
        }

        hop += 1;
        frontier.clear();
        for (v, (severity, via)) in next {
            let improved = best.get(&v).map_or(true, |t| severity > t.severity);
            if improved {
                best.insert(
                    v,
                    Trace {
                        severity,
                        hop,
                        via: Some(via),
                    },
                );
                frontier.insert(v, severity);
            }
        }
    }

    let mut reached: Vec<Reached> = best
        .into_iter()
        .map(|(idx, trace)| Reached {
            node: view.index_to_node[idx],
            severity: trace.severity,
            hop: trace.hop,
            via: trace.via.map(|p| view.index_to_node[p]),
        })
        .collect();
    reached.sort_by(|a, b| {
        b.severity
            .partial_cmp(&a.severity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.node.cmp(&b.node))
    });
    let depth_reached = reached.iter().map(|r| r.hop).max().unwrap_or(0);

    PropagationResult {
        reached,
        depth_reached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    /// supplier(0) -> component(1) -> product(2) -> bundle(3) -> kit(4) -> pallet(5)
    fn long_chain() -> GraphView {
        GraphView::from_adjacency(
            vec![0, 1, 2, 3, 4, 5],
            vec![
                vec![(1, 1.0)],
                vec![(2, 1.0)],
                vec![(3, 1.0)],
                vec![(4, 1.0)],
                vec![(5, 1.0)],
                vec![],
            ],
            true,
        )
    }

    #[test]
    fn test_decay_per_hop() {
        let view = long_chain();
        let result = propagate(&view, &[(1, 1.0)], &PropagationConfig::default());

        assert!((result.get(1).unwrap().severity - 1.0).abs() < EPS);
        assert_eq!(result.get(1).unwrap().hop, 0);
        assert!((result.get(2).unwrap().severity - 0.7).abs() < EPS);
        assert!((result.get(3).unwrap().severity - 0.49).abs() < EPS);
        assert_eq!(result.get(3).unwrap().via, Some(2));
        assert!(result.get(0).is_none(), "upstream supplier must not be reached");
    }

    #[test]
    fn test_max_depth_bounds_walk() {
        let view = long_chain();
        let config = PropagationConfig {
            decay: 1.0,
            floor: 0.0,
            max_depth: 2,
        };
        let result = propagate(&view, &[(0, 1.0)], &config);

        assert_eq!(result.depth_reached, 2);
        assert!(result.get(2).is_some());
        assert!(result.get(3).is_none());
    }

    #[test]
    fn test_floor_cuts_branch() {
        let view = long_chain();
        let config = PropagationConfig {
            decay: 0.5,
            floor: 0.2,
            max_depth: 10,
        };
        // 1.0 -> 0.5 -> 0.25 -> 0.125 (dropped)
        let result = propagate(&view, &[(0, 1.0)], &config);
        assert!(result.get(2).is_some());
        assert!(result.get(3).is_none());
        assert_eq!(result.depth_reached, 2);
    }

    #[test]
    fn test_max_over_paths_not_sum() {
        // Two paths into 3: 0 -> 1 -> 3 (weight 1.0) and 0 -> 2 -> 3 (weight 0.5)
        let view = GraphView::from_adjacency(
            vec![0, 1, 2, 3],
            vec![vec![(1, 1.0), (2, 1.0)], vec![(3, 1.0)], vec![(3, 0.5)], vec![]],
            true,
        );
        let result = propagate(&view, &[(0, 1.0)], &PropagationConfig::default());
        let shared = result.get(3).unwrap();
        assert!((shared.severity - 0.49).abs() < EPS);
        assert_eq!(shared.via, Some(1));
    }

    #[test]
    fn test_edge_weight_attenuates() {
        let view = GraphView::from_adjacency(vec![7, 8], vec![vec![(1, 0.5)], vec![]], true);
        let result = propagate(&view, &[(7, 1.0)], &PropagationConfig::default());
        assert!((result.get(8).unwrap().severity - 0.35).abs() < EPS);
    }

    #[test]
    fn test_cycle_terminates_and_keeps_best() {
        // 0 <-> 1
        let view = GraphView::from_adjacency(
            vec![0, 1],
            vec![vec![(1, 1.0)], vec![(0, 1.0)]],
            false,
        );
        let config = PropagationConfig {
            decay: 0.9,
            floor: 0.0,
            max_depth: 50,
        };
        let result = propagate(&view, &[(0, 1.0)], &config);
        assert_eq!(result.reached.len(), 2);
        assert!((result.get(0).unwrap().severity - 1.0).abs() < EPS);
        assert_eq!(result.get(0).unwrap().hop, 0);
        assert_eq!(result.depth_reached, 1);
    }

    #[test]
    fn test_severity_non_increasing_along_recorded_paths() {
        let view = GraphView::from_adjacency(
            vec![0, 1, 2, 3, 4],
            vec![
                vec![(1, 0.9), (2, 1.0)],
                vec![(3, 1.0), (4, 0.3)],
                vec![(3, 0.6)],
                vec![(4, 1.0)],
                vec![(0, 1.0)],
            ],
            true,
        );
        let config = PropagationConfig::default();
        let result = propagate(&view, &[(0, 1.0), (2, 0.4)], &config);

        for reached in &result.reached {
            if let Some(parent) = reached.via {
                let parent = result.get(parent).unwrap();
                assert!(reached.severity <= parent.severity * config.decay + EPS);
                assert!(reached.hop >= 1);
            }
        }
    }

    #[test]
    fn test_empty_seeds() {
        let view = long_chain();
        let result = propagate(&view, &[], &PropagationConfig::default());
        assert!(result.reached.is_empty());
        assert_eq!(result.depth_reached, 0);
    }

    #[test]
    fn test_seed_below_floor_is_recorded_but_not_spread() {
        let view = long_chain();
        let result = propagate(&view, &[(1, 0.03)], &PropagationConfig::default());
        assert_eq!(result.reached.len(), 1);
        assert_eq!(result.reached[0].node, 1);
    }
}
