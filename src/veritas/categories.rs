//! Dependency and shortage risk by component category

use super::findings::RiskLevel;
use super::regions::component_flags;
use crate::config::AnalysisConfig;
use crate::graph::{GraphStore, NodeId};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Companies listed per dependency report
const TOP_COMPANIES: usize = 5;

/// Categories smaller than this are left out of the shortage report
const MIN_CATEGORY_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyShare {
    pub company: NodeId,
    pub name: String,
    /// Products owned for manufacturers, components supplied for suppliers
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDependency {
    pub category: String,
    pub components: Vec<NodeId>,
    pub critical_component_count: usize,
    pub affected_products: Vec<NodeId>,
    pub manufacturer_count: usize,
    pub supplier_count: usize,
    /// min(100, 0.5 * products + 0.3 * manufacturers + 2 * critical)
    pub dependency_score: f64,
    pub dependency_level: RiskLevel,
    pub top_manufacturers: Vec<CompanyShare>,
    pub top_suppliers: Vec<CompanyShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRisk {
    pub category: String,
    pub component_count: usize,
    pub critical_component_count: usize,
    pub product_count: usize,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortageRiskReport {
    /// Highest risk first
    pub categories: Vec<CategoryRisk>,
    /// Components with a category, including those in small categories
    pub total_components: usize,
    pub total_critical_components: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub critical_component_pct: f64,
}

fn ranked(graph: &GraphStore, counts: IndexMap<NodeId, usize>) -> Vec<CompanyShare> {
    let mut shares: Vec<CompanyShare> = counts
        .into_iter()
        .filter_map(|(company, count)| {
            let name = graph.get_node(&company)?.name.clone();
            Some(CompanyShare {
                company,
                name,
                count,
            })
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares.truncate(TOP_COMPANIES);
    shares
}

/// How much of the graph rests on components whose category contains `category`, ignoring case
pub fn category_dependency(
    graph: &GraphStore,
    category: &str,
    config: &AnalysisConfig,
) -> CategoryDependency {
    let needle = category.to_lowercase();
    let flags = component_flags(graph, config);

    let mut components = Vec::new();
    let mut critical = 0;
    let mut products: IndexSet<NodeId> = IndexSet::new();
    let mut suppliers: IndexMap<NodeId, usize> = IndexMap::new();
    for (component, f) in &flags {
        let matches = graph
            .get_node(component)
            .and_then(|n| n.category())
            .is_some_and(|c| c.to_lowercase().contains(&needle));
        if !matches {
            continue;
        }
        components.push(component.clone());
        critical += usize::from(f.critical);
        products.extend(graph.dependent_products(component));
        for supplier in graph.suppliers_of(component) {
            *suppliers.entry(supplier.clone()).or_insert(0) += 1;
        }
    }

    let mut manufacturers: IndexMap<NodeId, usize> = IndexMap::new();
    for product in &products {
        for owner in graph.owners_of(product) {
            *manufacturers.entry(owner).or_insert(0) += 1;
        }
    }

    let dependency_score = (products.len() as f64 * 0.5
        + manufacturers.len() as f64 * 0.3
        + critical as f64 * 2.0)
        .min(100.0);
    let dependency_level = RiskLevel::from_score(
        dependency_score,
        config.medium_risk_cutoff,
        config.high_risk_cutoff,
    );

    info!(
        "Dependency on {} components: {} components, score {:.1} ({})",
        category,
        components.len(),
        dependency_score,
        dependency_level
    );

    CategoryDependency {
        category: category.to_string(),
        components,
        critical_component_count: critical,
        affected_products: products.into_iter().collect(),
        manufacturer_count: manufacturers.len(),
        supplier_count: suppliers.len(),
        dependency_score,
        dependency_level,
        top_manufacturers: ranked(graph, manufacturers),
        top_suppliers: ranked(graph, suppliers),
    }
}

#[derive(Default)]
struct CategoryTally {
    count: usize,
    critical: usize,
    products: IndexSet<NodeId>,
}

/// Score every component category for shortage risk
pub fn shortage_risk_report(graph: &GraphStore, config: &AnalysisConfig) -> ShortageRiskReport {
    let flags = component_flags(graph, config);

    let mut tallies: IndexMap<String, CategoryTally> = IndexMap::new();
    for (component, f) in &flags {
        let Some(category) = graph.get_node(component).and_then(|n| n.category()) else {
            continue;
        };
        let tally = tallies.entry(category.to_string()).or_default();
        tally.count += 1;
        tally.critical += usize::from(f.critical);
        tally.products.extend(graph.dependent_products(component));
    }

    let total_components: usize = tallies.values().map(|t| t.count).sum();
    let total_critical_components: usize = tallies.values().map(|t| t.critical).sum();

    let mut categories: Vec<CategoryRisk> = tallies
        .into_iter()
        .filter(|(_, t)| t.count >= MIN_CATEGORY_SIZE)
        .map(|(category, t)| {
            let critical_ratio = t.critical as f64 / t.count as f64;
            let risk_score = (t.count as f64 * 0.3
                + critical_ratio * 100.0 * 0.5
                + t.products.len() as f64 * 0.2)
                .min(100.0);
            CategoryRisk {
                category,
                component_count: t.count,
                critical_component_count: t.critical,
                product_count: t.products.len(),
                risk_score,
                risk_level: RiskLevel::from_score(
                    risk_score,
                    config.medium_risk_cutoff,
                    config.high_risk_cutoff,
                ),
            }
        })
        .collect();
    categories.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

    let level_count =
        |level: RiskLevel| categories.iter().filter(|c| c.risk_level == level).count();
    let report = ShortageRiskReport {
        total_components,
        total_critical_components,
        high_risk_count: level_count(RiskLevel::High),
        medium_risk_count: level_count(RiskLevel::Medium),
        critical_component_pct: total_critical_components as f64
            / total_components.max(1) as f64
            * 100.0,
        categories,
    };

    info!(
        "Shortage risk report: {} categories scored, {} high risk",
        report.categories.len(),
        report.high_risk_count
    );
    report
}
