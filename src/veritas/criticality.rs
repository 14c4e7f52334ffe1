//! Critical component scoring
//!
//! A component's criticality combines four factors, each in [0, 1]:
//! - inverse distinct supplier count (no supplier scores 1.0)
//! - complexity tier ordinal
//! - bottleneck flag, set on the node or implied by its category
//! - dependent product count, saturating at `product_saturation`

use super::scope::ScopeSet;
use crate::config::AnalysisConfig;
use crate::graph::{GraphStore, Node, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalityFactors {
    pub supplier: f64,
    pub complexity: f64,
    pub bottleneck: f64,
    pub products: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCriticality {
    pub component: NodeId,
    pub name: String,
    /// Weighted score in [0, 1]
    pub score: f64,
    pub critical: bool,
    pub supplier_count: usize,
    pub product_count: usize,
    pub factors: CriticalityFactors,
}

/// Score one component; `product_count` is the number of distinct products depending on it
pub fn score_component(
    graph: &GraphStore,
    node: &Node,
    product_count: usize,
    config: &AnalysisConfig,
) -> ComponentCriticality {
    let supplier_count = graph.suppliers_of(&node.id).len();
    let component = node.as_component();

    let supplier = if supplier_count == 0 {
        1.0
    } else {
        1.0 / supplier_count as f64
    };
    let complexity = component.map_or(0.0, |c| c.complexity.ordinal());
    let flagged = component.is_some_and(|c| c.bottleneck)
        || node
            .category()
            .is_some_and(|cat| config.is_bottleneck_category(cat));
    let bottleneck = if flagged { 1.0 } else { 0.0 };
    let products =
        (product_count as f64 / config.product_saturation.max(1) as f64).min(1.0);

    let score = (config.supplier_weight * supplier
        + config.complexity_weight * complexity
        + config.bottleneck_weight * bottleneck
        + config.product_weight * products)
        .clamp(0.0, 1.0);

    ComponentCriticality {
        component: node.id.clone(),
        name: node.name.clone(),
        score,
        critical: score >= config.criticality_threshold,
        supplier_count,
        product_count,
        factors: CriticalityFactors {
            supplier,
            complexity,
            bottleneck,
            products,
        },
    }
}

/// Score every component in scope, highest score first
pub fn score_all(
    graph: &GraphStore,
    scope: &ScopeSet,
    config: &AnalysisConfig,
) -> Vec<ComponentCriticality> {
    let mut scored: Vec<ComponentCriticality> = scope
        .components
        .iter()
        .filter_map(|id| graph.get_node(id))
        .map(|node| {
            let products = scope.products_fed_by(graph, &node.id).len();
            score_component(graph, node, products, config)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.component.cmp(&b.component))
    });
    scored
}
