//! Country risk profiles and regional comparison

use super::criticality::score_component;
use super::findings::RiskLevel;
use super::tariff::rules_for;
use super::{VeritasError, VeritasResult};
use crate::config::AnalysisConfig;
use crate::graph::{GraphStore, NodeId, NodeType};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::info;

const UNKNOWN_REGION: &str = "Unknown";

/// Inputs of a 0-100 risk score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub component_count: usize,
    pub critical_ratio: f64,
    pub tariff_ratio: f64,
    pub affected_products: usize,
    pub manufacturers: usize,
}

impl RiskFactors {
    pub fn score(&self) -> f64 {
        let score = self.component_count as f64 * 0.1
            + self.critical_ratio * 100.0 * 0.4
            + self.tariff_ratio * 100.0 * 0.2
            + self.affected_products as f64 * 0.2
            + self.manufacturers as f64 * 0.1;
        score.min(100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerExposure {
    pub company: NodeId,
    pub name: String,
    pub products: Vec<NodeId>,
    /// Critical components from the country, summed over the company's products
    pub critical_component_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRisk {
    pub country: NodeId,
    pub name: String,
    pub region: String,
    pub components: Vec<NodeId>,
    pub critical_component_count: usize,
    pub tariff_vulnerable_count: usize,
    pub affected_products: Vec<NodeId>,
    /// Most exposed first, at most five
    pub top_manufacturers: Vec<ManufacturerExposure>,
    pub factors: RiskFactors,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRisk {
    pub region: String,
    pub countries: Vec<NodeId>,
    pub component_count: usize,
    pub critical_component_count: usize,
    pub tariff_vulnerable_count: usize,
    /// Share of all component placements, in [0, 1]
    pub concentration: f64,
    pub factors: RiskFactors,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionComparison {
    /// Highest risk first
    pub regions: Vec<RegionRisk>,
    pub highest_risk_region: Option<String>,
    pub highest_concentration: Option<String>,
    pub lowest_concentration: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct ComponentFlags {
    pub(super) critical: bool,
    pub(super) tariff_vulnerable: bool,
}

/// Criticality and tariff exposure of every component, in graph order
pub(super) fn component_flags(
    graph: &GraphStore,
    config: &AnalysisConfig,
) -> IndexMap<NodeId, ComponentFlags> {
    graph
        .nodes_of_type(NodeType::Component)
        .into_iter()
        .map(|node| {
            let products = graph.dependent_products(&node.id).len();
            let flags = ComponentFlags {
                critical: score_component(graph, node, products, config).critical,
                tariff_vulnerable: !rules_for(graph, node).is_empty(),
            };
            (node.id.clone(), flags)
        })
        .collect()
}

fn region_of(graph: &GraphStore, country: &NodeId) -> String {
    graph
        .get_node(country)
        .and_then(|n| n.as_country())
        .and_then(|c| c.region.clone())
        .unwrap_or_else(|| UNKNOWN_REGION.to_string())
}

struct Exposure {
    components: Vec<NodeId>,
    critical: usize,
    tariff: usize,
    products: IndexSet<NodeId>,
    manufacturers: IndexMap<NodeId, ManufacturerExposure>,
}

/// Aggregate the downstream exposure of a set of components
fn exposure(
    graph: &GraphStore,
    components: Vec<NodeId>,
    flags: &IndexMap<NodeId, ComponentFlags>,
) -> Exposure {
    let mut products = IndexSet::new();
    let mut critical_per_product: IndexMap<NodeId, usize> = IndexMap::new();
    let mut critical = 0;
    let mut tariff = 0;

    for component in &components {
        let f = flags.get(component).copied().unwrap_or_default();
        critical += usize::from(f.critical);
        tariff += usize::from(f.tariff_vulnerable);
        for product in graph.dependent_products(component) {
            *critical_per_product.entry(product.clone()).or_insert(0) += usize::from(f.critical);
            products.insert(product);
        }
    }

    let mut manufacturers: IndexMap<NodeId, ManufacturerExposure> = IndexMap::new();
    for product in &products {
        // Parent companies are credited alongside their subsidiaries
        for owner in graph.owners_of(product) {
            let Some(company) = graph.get_node(&owner) else {
                continue;
            };
            let entry = manufacturers
                .entry(company.id.clone())
                .or_insert_with(|| ManufacturerExposure {
                    company: company.id.clone(),
                    name: company.name.clone(),
                    products: Vec::new(),
                    critical_component_count: 0,
                });
            entry.products.push(product.clone());
            entry.critical_component_count += critical_per_product.get(product).copied().unwrap_or(0);
        }
    }

    Exposure {
        components,
        critical,
        tariff,
        products,
        manufacturers,
    }
}

impl Exposure {
    fn factors(&self) -> RiskFactors {
        let n = self.components.len().max(1) as f64;
        RiskFactors {
            component_count: self.components.len(),
            critical_ratio: self.critical as f64 / n,
            tariff_ratio: self.tariff as f64 / n,
            affected_products: self.products.len(),
            manufacturers: self.manufacturers.len(),
        }
    }
}

/// Risk profile of one country
pub fn country_risk(
    graph: &GraphStore,
    country: &NodeId,
    config: &AnalysisConfig,
) -> VeritasResult<CountryRisk> {
    let node = graph
        .get_node(country)
        .filter(|n| n.is(NodeType::Country))
        .ok_or_else(|| VeritasError::UnknownCountry(country.clone()))?;

    let flags = component_flags(graph, config);
    let components: Vec<NodeId> = flags
        .keys()
        .filter(|c| graph.countries_of(c).contains(&country))
        .cloned()
        .collect();

    let exposure = exposure(graph, components, &flags);
    let factors = exposure.factors();
    let risk_score = factors.score();
    let risk_level =
        RiskLevel::from_score(risk_score, config.medium_risk_cutoff, config.high_risk_cutoff);

    let mut top_manufacturers: Vec<ManufacturerExposure> =
        exposure.manufacturers.into_values().collect();
    top_manufacturers.sort_by(|a, b| b.critical_component_count.cmp(&a.critical_component_count));
    top_manufacturers.truncate(5);

    info!(
        "Country risk for {}: {:.1} ({})",
        node.name, risk_score, risk_level
    );

    Ok(CountryRisk {
        country: node.id.clone(),
        name: node.name.clone(),
        region: region_of(graph, country),
        components: exposure.components,
        critical_component_count: exposure.critical,
        tariff_vulnerable_count: exposure.tariff,
        affected_products: exposure.products.into_iter().collect(),
        top_manufacturers,
        factors,
        risk_score,
        risk_level,
    })
}

/// Group component manufacturing by region and score each region
pub fn compare_regions(graph: &GraphStore, config: &AnalysisConfig) -> RegionComparison {
    let flags = component_flags(graph, config);

    let mut members: IndexMap<String, (IndexSet<NodeId>, IndexSet<NodeId>)> = IndexMap::new();
    for component in flags.keys() {
        for country in graph.countries_of(component) {
            let (countries, components) = members.entry(region_of(graph, country)).or_default();
            countries.insert(country.clone());
            components.insert(component.clone());
        }
    }

    let placements: usize = members.values().map(|(_, c)| c.len()).sum();
    let mut regions: Vec<RegionRisk> = members
        .into_iter()
        .map(|(region, (countries, components))| {
            let exposure = exposure(graph, components.into_iter().collect(), &flags);
            let factors = exposure.factors();
            let risk_score = factors.score();
            RegionRisk {
                region,
                countries: countries.into_iter().collect(),
                component_count: exposure.components.len(),
                critical_component_count: exposure.critical,
                tariff_vulnerable_count: exposure.tariff,
                concentration: exposure.components.len() as f64 / placements.max(1) as f64,
                factors,
                risk_score,
                risk_level: RiskLevel::from_score(
                    risk_score,
                    config.medium_risk_cutoff,
                    config.high_risk_cutoff,
                ),
            }
        })
        .collect();

    regions.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.region.cmp(&b.region))
    });

    let by_concentration = |r: &&RegionRisk| r.concentration;
    let highest_concentration = regions
        .iter()
        .max_by(|a, b| by_concentration(a).total_cmp(&by_concentration(b)))
        .map(|r| r.region.clone());
    let lowest_concentration = regions
        .iter()
        .min_by(|a, b| by_concentration(a).total_cmp(&by_concentration(b)))
        .map(|r| r.region.clone());

    info!("Region comparison complete: {} regions", regions.len());

    RegionComparison {
        highest_risk_region: regions.first().map(|r| r.region.clone()),
        highest_concentration,
        lowest_concentration,
        regions,
    }
}
