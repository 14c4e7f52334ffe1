//! Supplier dependency insights

use super::findings::RiskLevel;
use super::regions::component_flags;
use crate::config::AnalysisConfig;
use crate::graph::{GraphStore, NodeId};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Components listed per supplier, critical ones first
const KEY_COMPONENTS: usize = 5;

/// Critical components above which a supplier is a high dependency
const HIGH_DEPENDENCY_CRITICAL: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppliedComponent {
    pub component: NodeId,
    pub name: String,
    pub critical: bool,
    pub tariff_vulnerable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierInsight {
    pub supplier: NodeId,
    pub name: String,
    /// (3 * critical + total) / 4
    pub importance: f64,
    pub component_count: usize,
    pub critical_component_count: usize,
    pub tariff_vulnerable_count: usize,
    /// Where the supplied components are made
    pub countries: Vec<NodeId>,
    pub key_components: Vec<SuppliedComponent>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierInsights {
    /// Most important first
    pub top_suppliers: Vec<SupplierInsight>,
    pub total_suppliers: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
}

fn dependency_level(critical: usize) -> RiskLevel {
    if critical > HIGH_DEPENDENCY_CRITICAL {
        RiskLevel::High
    } else if critical > 0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Rank suppliers by how much critical supply depends on them
pub fn supplier_insights(
    graph: &GraphStore,
    config: &AnalysisConfig,
    top_n: usize,
) -> SupplierInsights {
    let flags = component_flags(graph, config);

    let mut supplied: IndexMap<NodeId, (Vec<SuppliedComponent>, IndexSet<NodeId>)> =
        IndexMap::new();
    for (component, f) in &flags {
        let Some(node) = graph.get_node(component) else {
            continue;
        };
        for supplier in graph.suppliers_of(component) {
            let (components, countries) = supplied.entry(supplier.clone()).or_default();
            components.push(SuppliedComponent {
                component: component.clone(),
                name: node.name.clone(),
                critical: f.critical,
                tariff_vulnerable: f.tariff_vulnerable,
            });
            countries.extend(graph.countries_of(component).into_iter().cloned());
        }
    }

    let total_suppliers = supplied.len();
    let mut suppliers: Vec<SupplierInsight> = supplied
        .into_iter()
        .filter_map(|(supplier, (mut components, countries))| {
            let node = graph.get_node(&supplier)?;
            let critical = components.iter().filter(|c| c.critical).count();
            let tariff = components.iter().filter(|c| c.tariff_vulnerable).count();
            let importance = (critical as f64 * 3.0 + components.len() as f64) / 4.0;
            let component_count = components.len();

            components.sort_by_key(|c| !c.critical);
            components.truncate(KEY_COMPONENTS);
            Some(SupplierInsight {
                supplier,
                name: node.name.clone(),
                importance,
                component_count,
                critical_component_count: critical,
                tariff_vulnerable_count: tariff,
                countries: countries.into_iter().collect(),
                key_components: components,
                risk_level: dependency_level(critical),
            })
        })
        .collect();

    suppliers.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    suppliers.truncate(top_n);

    let count = |level: RiskLevel| suppliers.iter().filter(|s| s.risk_level == level).count();
    let insights = SupplierInsights {
        total_suppliers,
        high_risk: count(RiskLevel::High),
        medium_risk: count(RiskLevel::Medium),
        low_risk: count(RiskLevel::Low),
        top_suppliers: suppliers,
    };

    info!(
        "Supplier insights: {} of {} suppliers, {} high dependency",
        insights.top_suppliers.len(),
        insights.total_suppliers,
        insights.high_risk
    );
    insights
}
