//! Geographic concentration of component manufacturing
//!
//! A component manufactured in `m` countries contributes `1/m` to each of them.
//! Shares are taken over every component in scope, so components without a
//! known country lower all shares.

use super::scope::ScopeSet;
use crate::config::AnalysisConfig;
use crate::graph::{GraphStore, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryShare {
    pub country: NodeId,
    pub name: String,
    /// Attributed components / components in scope
    pub share: f64,
    /// Fractional number of components attributed to this country
    pub components: f64,
    pub high_risk: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoConcentration {
    /// Highest share first
    pub shares: Vec<CountryShare>,
    pub high_risk: Vec<NodeId>,
    pub components_in_scope: usize,
    /// Components with at least one manufacturing country
    pub located_components: usize,
}

impl GeoConcentration {
    pub fn top_share(&self) -> f64 {
        self.shares.first().map_or(0.0, |s| s.share)
    }

    pub fn share_of(&self, country: &NodeId) -> Option<f64> {
        self.shares
            .iter()
            .find(|s| &s.country == country)
            .map(|s| s.share)
    }
}

pub fn geographic_concentration(
    graph: &GraphStore,
    scope: &ScopeSet,
    config: &AnalysisConfig,
) -> GeoConcentration {
    let total = scope.components.len();
    let mut attributed: IndexMap<NodeId, f64> = IndexMap::new();
    let mut located = 0;

    for component in &scope.components {
        let countries = graph.countries_of(component);
        if countries.is_empty() {
            continue;
        }
        located += 1;
        let weight = 1.0 / countries.len() as f64;
        for country in countries {
            *attributed.entry(country.clone()).or_insert(0.0) += weight;
        }
    }

    let mut shares: Vec<CountryShare> = attributed
        .into_iter()
        .map(|(country, components)| CountryShare {
            name: graph
                .get_node(&country)
                .map_or_else(|| country.to_string(), |n| n.name.clone()),
            country,
            share: if total == 0 {
                0.0
            } else {
                components / total as f64
            },
            components,
            high_risk: false,
        })
        .collect();

    shares.sort_by(|a, b| {
        b.share
            .partial_cmp(&a.share)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.country.cmp(&b.country))
    });

    for (rank, share) in shares.iter_mut().enumerate() {
        share.high_risk = rank == 0 || share.share >= config.geo_high_risk_threshold;
    }
    let high_risk = shares
        .iter()
        .filter(|s| s.high_risk)
        .map(|s| s.country.clone())
        .collect();

    GeoConcentration {
        shares,
        high_risk,
        components_in_scope: total,
        located_components: located,
    }
}
