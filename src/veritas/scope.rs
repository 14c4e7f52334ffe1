//! Analysis scope resolution
//!
//! A company scope covers every product the company owns, directly or through
//! subsidiaries, and every component tier those products are built from.

use super::{VeritasError, VeritasResult};
use crate::algo::{Direction, StoreView};
use crate::graph::{EdgeType, GraphStore, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Subgraph an analysis call is restricted to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Scope {
    #[default]
    All,
    Company(NodeId),
}

impl Scope {
    pub fn company(id: impl Into<NodeId>) -> Self {
        Scope::Company(id.into())
    }
}

/// Components and products in scope, in graph insertion order
#[derive(Debug, Clone, Default)]
pub struct ScopeSet {
    pub components: Vec<NodeId>,
    pub products: Vec<NodeId>,
    product_set: HashSet<NodeId>,
}

impl ScopeSet {
    fn new(components: Vec<NodeId>, products: Vec<NodeId>) -> Self {
        let product_set = products.iter().cloned().collect();
        Self {
            components,
            products,
            product_set,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains_product(&self, id: &NodeId) -> bool {
        self.product_set.contains(id)
    }

    /// Products a component feeds that are in scope
    pub fn products_fed_by(&self, graph: &GraphStore, component: &NodeId) -> Vec<NodeId> {
        graph
            .dependent_products(component)
            .into_iter()
            .filter(|p| self.contains_product(p))
            .collect()
    }
}

pub fn resolve(graph: &GraphStore, scope: &Scope) -> VeritasResult<ScopeSet> {
    match scope {
        Scope::All => Ok(ScopeSet::new(
            ids_of(graph, NodeType::Component),
            ids_of(graph, NodeType::Product),
        )),
        Scope::Company(company) => {
            let is_company = graph
                .get_node(company)
                .is_some_and(|n| n.is(NodeType::Company));
            if !is_company {
                return Err(VeritasError::UnknownScope(company.clone()));
            }

            // ownedBy points product -> company and subsidiary -> parent
            let ownership = StoreView::new(graph, &[EdgeType::OwnedBy]);
            let owned: HashSet<NodeId> = ownership
                .reachable(std::slice::from_ref(company), Direction::Upstream, None)
                .into_iter()
                .map(|(id, _)| id)
                .collect();
            let products = in_order(graph, NodeType::Product, &owned);

            // usedIn points component -> product, so component tiers are upstream
            let bill_of_materials = StoreView::new(graph, &[EdgeType::UsedIn]);
            let upstream: HashSet<NodeId> = bill_of_materials
                .reachable(&products, Direction::Upstream, None)
                .into_iter()
                .map(|(id, _)| id)
                .collect();
            let components = in_order(graph, NodeType::Component, &upstream);

            debug!(
                company = %company,
                products = products.len(),
                components = components.len(),
                "Resolved company scope"
            );
            Ok(ScopeSet::new(components, products))
        }
    }
}

fn ids_of(graph: &GraphStore, node_type: NodeType) -> Vec<NodeId> {
    graph
        .nodes_of_type(node_type)
        .into_iter()
        .map(|n| n.id.clone())
        .collect()
}

fn in_order(graph: &GraphStore, node_type: NodeType, members: &HashSet<NodeId>) -> Vec<NodeId> {
    graph
        .nodes_of_type(node_type)
        .into_iter()
        .filter(|n| members.contains(&n.id))
        .map(|n| n.id.clone())
        .collect()
}
