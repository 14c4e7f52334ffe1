//! Allocation plan for component shortages
//!
//! Affected products are ranked by strategic score and split into three tiers
//! (top 20%, next 30%, rest). Each tier receives a fixed share of its normal
//! supply, lower for severe shortages.

use crate::graph::{GraphStore, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Margin assumed for products that do not declare one
const DEFAULT_MARGIN: f64 = 0.2;

/// Shortages with at most this much supply left are severe
const SEVERE_AVAILABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortageSeverity {
    Moderate,
    Severe,
}

impl ShortageSeverity {
    pub fn from_available_fraction(available_fraction: f64) -> Self {
        if available_fraction <= SEVERE_AVAILABILITY {
            ShortageSeverity::Severe
        } else {
            ShortageSeverity::Moderate
        }
    }

    /// Percent of normal supply allocated to tiers 1, 2 and 3
    pub fn tier_allocations(&self) -> [f64; 3] {
        match self {
            ShortageSeverity::Moderate => [90.0, 70.0, 50.0],
            ShortageSeverity::Severe => [80.0, 50.0, 30.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationTier {
    /// 1 is the highest priority
    pub rank: u8,
    pub allocation_pct: f64,
    pub products: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub severity: ShortageSeverity,
    pub available_supply_pct: f64,
    pub tiers: Vec<AllocationTier>,
    /// Up to five products with the highest margin
    pub high_margin_products: Vec<NodeId>,
    /// Up to five products built from the most critical components
    pub most_critical_products: Vec<NodeId>,
}

impl AllocationPlan {
    pub fn tier_of(&self, product: &NodeId) -> Option<&AllocationTier> {
        self.tiers.iter().find(|t| t.products.contains(product))
    }
}

struct Candidate<'a> {
    id: &'a NodeId,
    score: f64,
    margin: f64,
    release_year: i32,
    critical: usize,
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Strategic score of a product: trade value weighted by margin
pub fn strategic_score(graph: &GraphStore, product: &NodeId) -> f64 {
    graph
        .get_node(product)
        .and_then(|n| n.as_product())
        .map_or(0.0, |p| {
            p.trade_value.unwrap_or(0.0) * p.margin.unwrap_or(DEFAULT_MARGIN)
        })
}

/// Plan allocation across `products`.
///
/// `critical_counts` maps a product to the number of critical components it
/// is built from.
pub fn allocation_plan(
    graph: &GraphStore,
    products: &[NodeId],
    available_fraction: f64,
    critical_counts: &IndexMap<NodeId, usize>,
) -> AllocationPlan {
    let severity = ShortageSeverity::from_available_fraction(available_fraction);

    let mut candidates: Vec<Candidate> = products
        .iter()
        .map(|id| {
            let product = graph.get_node(id).and_then(|n| n.as_product());
            Candidate {
                id,
                score: strategic_score(graph, id),
                margin: product.and_then(|p| p.margin).unwrap_or(DEFAULT_MARGIN),
                release_year: product.and_then(|p| p.release_year).unwrap_or(0),
                critical: critical_counts.get(id).copied().unwrap_or(0),
            }
        })
        .collect();

    // Newer releases win ties on score
    candidates.sort_by(|a, b| {
        desc(a.score, b.score)
            .then(b.release_year.cmp(&a.release_year))
            .then(a.id.cmp(b.id))
    });

    let n = candidates.len();
    let first = (n as f64 * 0.2).ceil() as usize;
    let second = ((n as f64 * 0.5).ceil() as usize).max(first);
    let bounds = [(0, first), (first, second), (second, n)];
    let tiers = bounds
        .iter()
        .zip(severity.tier_allocations())
        .enumerate()
        .map(|(i, (&(start, end), allocation_pct))| AllocationTier {
            rank: i as u8 + 1,
            allocation_pct,
            products: candidates[start..end].iter().map(|c| c.id.clone()).collect(),
        })
        .collect();

    let mut by_margin: Vec<&Candidate> = candidates.iter().collect();
    by_margin.sort_by(|a, b| desc(a.margin, b.margin).then(a.id.cmp(b.id)));
    let high_margin_products = by_margin.iter().take(5).map(|c| c.id.clone()).collect();

    let mut by_critical: Vec<&Candidate> = candidates.iter().filter(|c| c.critical > 0).collect();
    by_critical.sort_by(|a, b| b.critical.cmp(&a.critical).then(a.id.cmp(b.id)));
    let most_critical_products = by_critical.iter().take(5).map(|c| c.id.clone()).collect();

    AllocationPlan {
        severity,
        available_supply_pct: (available_fraction * 100.0).clamp(0.0, 100.0),
        tiers,
        high_margin_products,
        most_critical_products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, Product};

    fn graph(n: usize) -> (GraphStore, Vec<NodeId>) {
        let mut g = GraphStore::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let id = g
                .add_node(Node::product(
                    format!("p{i}"),
                    format!("Product {i}"),
                    Product {
                        trade_value: Some(100.0 * (i + 1) as f64),
                        margin: Some(0.1 + 0.01 * i as f64),
                        ..Default::default()
                    },
                ))
                .unwrap();
            ids.push(id);
        }
        (g, ids)
    }

    #[test]
    fn test_tiers_split_by_strategic_score() {
        let (g, ids) = graph(10);
        let plan = allocation_plan(&g, &ids, 0.7, &IndexMap::new());

        assert_eq!(plan.severity, ShortageSeverity::Moderate);
        let sizes: Vec<usize> = plan.tiers.iter().map(|t| t.products.len()).collect();
        assert_eq!(sizes, vec![2, 3, 5]);
        assert_eq!(plan.tiers[0].products, vec![NodeId::new("p9"), NodeId::new("p8")]);
        assert_eq!(plan.tiers[0].allocation_pct, 90.0);
        assert_eq!(plan.tier_of(&NodeId::new("p0")).map(|t| t.rank), Some(3));
        assert_eq!(plan.high_margin_products.len(), 5);
    }

    #[test]
    fn test_severe_shortage_allocations() {
        let (g, ids) = graph(3);
        let plan = allocation_plan(&g, &ids, 0.4, &IndexMap::new());
        assert_eq!(plan.severity, ShortageSeverity::Severe);
        let pcts: Vec<f64> = plan.tiers.iter().map(|t| t.allocation_pct).collect();
        assert_eq!(pcts, vec![80.0, 50.0, 30.0]);
        assert_eq!(plan.available_supply_pct, 40.0);
    }

    #[test]
    fn test_single_product_lands_in_first_tier() {
        let (g, ids) = graph(1);
        let plan = allocation_plan(&g, &ids, 0.9, &IndexMap::new());
        assert_eq!(plan.tiers[0].products, ids);
        assert!(plan.tiers[1].products.is_empty());
        assert!(plan.tiers[2].products.is_empty());
    }

    #[test]
    fn test_most_critical_products() {
        let (g, ids) = graph(4);
        let mut counts = IndexMap::new();
        counts.insert(NodeId::new("p1"), 2);
        counts.insert(NodeId::new("p3"), 1);
        let plan = allocation_plan(&g, &ids, 0.7, &counts);
        assert_eq!(
            plan.most_critical_products,
            vec![NodeId::new("p1"), NodeId::new("p3")]
        );
    }
}
