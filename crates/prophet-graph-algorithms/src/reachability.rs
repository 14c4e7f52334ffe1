//! Bounded breadth-first reachability
//!
//! Used to walk dependency chains downstream (component -> product) and
//! upstream (product -> component tiers).

use super::common::{GraphView, NodeId};
use std::collections::{HashMap, VecDeque};

/// Traversal direction over the view's edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Follow edges source -> target
    Downstream,
    /// Follow edges target -> source
    Upstream,
}

/// Breadth-first search from a set of sources.
///
/// Returns every reachable node (sources excluded) with its hop distance,
/// ordered by distance and then by discovery order. `max_depth = None` walks
/// the whole reachable set; cycles are cut by the visited set.
pub fn reachable_within(
    view: &GraphView,
    sources: &[NodeId],
    direction: Direction,
    max_depth: Option<usize>,
) -> Vec<(NodeId, usize)> {
    let mut queue = VecDeque::new();
    let mut visited: HashMap<usize, usize> = HashMap::new(); // index -> hop
    let mut order = Vec::new();

    for source in sources {
        if let Some(&idx) = view.node_to_index.get(source) {
            if visited.insert(idx, 0).is_none() {
                queue.push_back(idx);
            }
        }
    }

    while let Some(current_idx) = queue.pop_front() {
        let hop = visited[&current_idx];
        if max_depth.map_or(false, |limit| hop >= limit) {
            continue;
        }

        let neighbors = match direction {
            Direction::Downstream => view.successors(current_idx),
            Direction::Upstream => view.predecessors(current_idx),
        };

        for &next_idx in neighbors {
            if !visited.contains_key(&next_idx) {
                visited.insert(next_idx, hop + 1);
                order.push((view.index_to_node[next_idx], hop + 1));
                queue.push_back(next_idx);
            }
        }
    }

    order
}
