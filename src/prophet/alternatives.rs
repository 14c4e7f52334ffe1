//! Alternative sourcing for a component
//!
//! Candidates are other components whose names share at least one word with
//! the component's name. Similarity is the shared word count over the larger
//! of the two word sets.

use crate::graph::{GraphStore, NodeId, NodeType};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AlternativesError {
    #[error("Unknown component: {0}")]
    UnknownComponent(NodeId),
}

pub type AlternativesResult<T> = Result<T, AlternativesError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSupplier {
    pub supplier: NodeId,
    pub name: String,
    pub headquarters: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeComponent {
    pub component: NodeId,
    pub name: String,
    /// Shared name words over the larger word set, in (0, 1]
    pub similarity: f64,
    pub suppliers: Vec<NodeId>,
    pub countries: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSources {
    pub component: NodeId,
    pub name: String,
    pub category: Option<String>,
    pub current_suppliers: Vec<CurrentSupplier>,
    pub current_countries: Vec<NodeId>,
    /// Most similar first
    pub alternatives: Vec<AlternativeComponent>,
}

fn words(name: &str) -> IndexSet<String> {
    name.split_whitespace().map(str::to_lowercase).collect()
}

fn owned(ids: Vec<&NodeId>) -> Vec<NodeId> {
    ids.into_iter().cloned().collect()
}

/// Current supply of a component and up to `max_alternatives` substitutes
pub fn find_alternative_sources(
    graph: &GraphStore,
    component: &NodeId,
    max_alternatives: usize,
) -> AlternativesResult<AlternativeSources> {
    let node = graph
        .get_node(component)
        .filter(|n| n.is(NodeType::Component))
        .ok_or_else(|| AlternativesError::UnknownComponent(component.clone()))?;

    let current_suppliers = graph
        .suppliers_of(component)
        .into_iter()
        .filter_map(|id| graph.get_node(id))
        .map(|supplier| CurrentSupplier {
            supplier: supplier.id.clone(),
            name: supplier.name.clone(),
            headquarters: supplier.as_company().and_then(|c| c.headquarters.clone()),
        })
        .collect();

    let own = words(&node.name);
    let mut alternatives: Vec<AlternativeComponent> = graph
        .nodes_of_type(NodeType::Component)
        .into_iter()
        .filter(|c| c.id != node.id && c.name != node.name)
        .filter_map(|candidate| {
            let theirs = words(&candidate.name);
            let common = own.intersection(&theirs).count();
            if common == 0 {
                return None;
            }
            Some(AlternativeComponent {
                component: candidate.id.clone(),
                name: candidate.name.clone(),
                similarity: common as f64 / own.len().max(theirs.len()) as f64,
                suppliers: owned(graph.suppliers_of(&candidate.id)),
                countries: owned(graph.countries_of(&candidate.id)),
            })
        })
        .collect();

    alternatives.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    alternatives.truncate(max_alternatives);
    debug!(component = %component, found = alternatives.len(), "Alternative components ranked");

    info!(
        "Alternative sources for {}: {} candidates",
        node.name,
        alternatives.len()
    );

    Ok(AlternativeSources {
        component: node.id.clone(),
        name: node.name.clone(),
        category: node.category().map(str::to_string),
        current_suppliers,
        current_countries: owned(graph.countries_of(component)),
        alternatives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Company, Component, Country, EdgeType, Node, NodeKind};

    const EPS: f64 = 1e-9;

    fn graph() -> GraphStore {
        let mut g = GraphStore::new();
        g.add_node(Node::country("tw", "Taiwan", Country::default())).unwrap();
        g.add_node(Node::country("kr", "South Korea", Country::default())).unwrap();
        g.add_node(Node::new(
            "fab",
            "Fab",
            NodeKind::Company(Company {
                headquarters: Some(NodeId::new("tw")),
            }),
        ))
        .unwrap();
        g.add_node(Node::company("memco", "MemCo")).unwrap();

        for (id, name) in [
            ("dram", "DRAM Memory Module"),
            ("lpddr", "LPDDR Memory Module"),
            ("flash", "Flash Memory"),
            ("dram_copy", "DRAM Memory Module"),
            ("lens", "Camera Lens"),
        ] {
            g.add_node(Node::component(id, name, Component::default())).unwrap();
        }

        g.create_edge("fab", "dram", EdgeType::Supplies).unwrap();
        g.create_edge("dram", "tw", EdgeType::ManufacturedIn).unwrap();
        g.create_edge("memco", "lpddr", EdgeType::Supplies).unwrap();
        g.create_edge("lpddr", "kr", EdgeType::ManufacturedIn).unwrap();
        g
    }

    #[test]
    fn test_alternatives_ranked_by_name_similarity() {
        let g = graph();
        let result = find_alternative_sources(&g, &NodeId::new("dram"), 5).unwrap();

        assert_eq!(result.current_suppliers.len(), 1);
        assert_eq!(result.current_suppliers[0].supplier, NodeId::new("fab"));
        assert_eq!(result.current_suppliers[0].headquarters, Some(NodeId::new("tw")));
        assert_eq!(result.current_countries, vec![NodeId::new("tw")]);

        // Same-name components and unrelated names are excluded
        let ids: Vec<&str> = result
            .alternatives
            .iter()
            .map(|a| a.component.as_str())
            .collect();
        assert_eq!(ids, vec!["lpddr", "flash"]);

        let lpddr = &result.alternatives[0];
        assert!((lpddr.similarity - 2.0 / 3.0).abs() < EPS);
        assert_eq!(lpddr.suppliers, vec![NodeId::new("memco")]);
        assert_eq!(lpddr.countries, vec![NodeId::new("kr")]);
        assert!((result.alternatives[1].similarity - 1.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_max_alternatives_truncates() {
        let g = graph();
        let result = find_alternative_sources(&g, &NodeId::new("dram"), 1).unwrap();
        assert_eq!(result.alternatives.len(), 1);
        assert_eq!(result.alternatives[0].component, NodeId::new("lpddr"));
    }

    #[test]
    fn test_no_candidates() {
        let g = graph();
        let result = find_alternative_sources(&g, &NodeId::new("lens"), 5).unwrap();
        assert!(result.alternatives.is_empty());
        assert!(result.current_suppliers.is_empty());
    }

    #[test]
    fn test_unknown_component() {
        let g = graph();
        for id in ["missing", "fab"] {
            let err = find_alternative_sources(&g, &NodeId::new(id), 5).unwrap_err();
            assert!(matches!(err, AlternativesError::UnknownComponent(_)));
        }
    }
}
