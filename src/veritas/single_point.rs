//! Single points of failure and supply data gaps

use super::scope::ScopeSet;
use crate::graph::{GraphStore, NodeId};
use serde::{Deserialize, Serialize};

/// A component with exactly one distinct supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePointOfFailure {
    pub component: NodeId,
    pub supplier: NodeId,
    /// Deduplicated products the component feeds, in scope
    pub products: Vec<NodeId>,
}

/// A component missing suppliers or dependent products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataGap {
    pub component: NodeId,
    pub missing_suppliers: bool,
    pub missing_products: bool,
}

pub fn single_points(graph: &GraphStore, scope: &ScopeSet) -> Vec<SinglePointOfFailure> {
    scope
        .components
        .iter()
        .filter_map(|component| match graph.suppliers_of(component).as_slice() {
            [supplier] => Some(SinglePointOfFailure {
                component: component.clone(),
                supplier: (*supplier).clone(),
                products: scope.products_fed_by(graph, component),
            }),
            _ => None,
        })
        .collect()
}

pub fn data_gaps(graph: &GraphStore, scope: &ScopeSet) -> Vec<DataGap> {
    scope
        .components
        .iter()
        .filter_map(|component| {
            let missing_suppliers = graph.suppliers_of(component).is_empty();
            let missing_products = graph.dependent_products(component).is_empty();
            (missing_suppliers || missing_products).then(|| DataGap {
                component: component.clone(),
                missing_suppliers,
                missing_products,
            })
        })
        .collect()
}
