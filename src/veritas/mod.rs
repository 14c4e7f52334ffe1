//! Veritas: structural truth analysis of a supply-chain graph
//!
//! Extracts risk facts from the graph as it stands:
//! - critical components (weighted criticality score)
//! - single points of failure (components with one supplier)
//! - geographic concentration of manufacturing
//! - tariff vulnerability (active rules reaching a component)
//! - an aggregate resilience score
//!
//! [`regions`], [`suppliers`] and [`categories`] hold standalone risk profiles
//! computed outside the report.
//!
//! Every analysis is a pure function of `&GraphStore` and configuration.

pub mod categories;
pub mod consistency;
pub mod criticality;
pub mod findings;
pub mod geography;
pub mod regions;
pub mod resilience;
pub mod scope;
pub mod single_point;
pub mod suppliers;
pub mod tariff;

pub use categories::{
    category_dependency, shortage_risk_report, CategoryDependency, CategoryRisk, CompanyShare,
    ShortageRiskReport,
};
pub use consistency::{check_consistency, Inconsistency, InconsistencyKind};
pub use criticality::{ComponentCriticality, CriticalityFactors};
pub use findings::{Evidence, Finding, FindingKind, RiskLevel};
pub use geography::{CountryShare, GeoConcentration};
pub use regions::{compare_regions, country_risk, CountryRisk, RegionComparison, RegionRisk};
pub use resilience::{Resilience, ResilienceInputs};
pub use scope::Scope;
pub use single_point::{DataGap, SinglePointOfFailure};
pub use suppliers::{supplier_insights, SuppliedComponent, SupplierInsight, SupplierInsights};
pub use tariff::{TariffExposure, TariffHit, TariffLink};

use crate::config::{AnalysisConfig, ConfigError};
use crate::graph::{GraphStore, NodeId};
use findings::sort_findings;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by the truth analysis
#[derive(Error, Debug)]
pub enum VeritasError {
    #[error("Unknown scope: {0} is not a company in the graph")]
    UnknownScope(NodeId),

    #[error("Unknown country: {0}")]
    UnknownCountry(NodeId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type VeritasResult<T> = Result<T, VeritasError>;

/// Result of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeritasReport {
    pub scope: Scope,
    pub component_count: usize,
    pub product_count: usize,
    /// Components at or above the criticality threshold, highest score first
    pub critical_components: Vec<ComponentCriticality>,
    pub single_points: Vec<SinglePointOfFailure>,
    pub data_gaps: Vec<DataGap>,
    pub geo_concentration: GeoConcentration,
    pub tariff_vulnerabilities: Vec<TariffExposure>,
    pub resilience: Resilience,
    /// Most severe first
    pub findings: Vec<Finding>,
    /// Graph inconsistencies; never affect the scores
    pub warnings: Vec<Finding>,
}

impl VeritasReport {
    pub fn is_critical(&self, component: &NodeId) -> bool {
        self.critical_components
            .iter()
            .any(|c| &c.component == component)
    }

    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    pub fn has_finding(&self, kind: FindingKind) -> bool {
        self.findings_of(kind).next().is_some()
    }
}

/// Run the full truth analysis over a scope
pub fn analyze(
    graph: &GraphStore,
    scope: &Scope,
    config: &AnalysisConfig,
) -> VeritasResult<VeritasReport> {
    config.validate()?;
    let set = scope::resolve(graph, scope)?;
    if set.is_empty() {
        warn!("Scope {:?} contains no components", scope);
    }

    let scored = criticality::score_all(graph, &set, config);
    let critical_components: Vec<ComponentCriticality> =
        scored.iter().filter(|c| c.critical).cloned().collect();
    let single_points = single_point::single_points(graph, &set);
    let data_gaps = single_point::data_gaps(graph, &set);
    let geo_concentration = geography::geographic_concentration(graph, &set, config);
    let tariff_vulnerabilities = tariff::tariff_vulnerabilities(graph, &set);

    let single_sourced = scored.iter().filter(|c| c.supplier_count <= 1).count();
    let resilience = resilience::resilience(
        &ResilienceInputs {
            components: set.components.len(),
            single_sourced,
            critical: critical_components.len(),
            tariff_exposed: tariff_vulnerabilities.len(),
            top_country_share: geo_concentration.top_share(),
        },
        config,
    );
    debug!(
        single_density = resilience.single_density,
        critical_density = resilience.critical_density,
        tariff_density = resilience.tariff_density,
        top_country_share = resilience.top_country_share,
        "Resilience inputs"
    );

    let criticality_of = |id: &NodeId| {
        scored
            .iter()
            .find(|c| &c.component == id)
            .map_or(0.0, |c| c.score)
    };

    let mut findings = Vec::new();
    for spof in &single_points {
        let mut subjects = vec![spof.component.clone(), spof.supplier.clone()];
        subjects.extend(spof.products.iter().cloned());
        findings.push(Finding::new(
            FindingKind::SinglePoint,
            subjects,
            criticality_of(&spof.component).max(0.5),
            Evidence::SoleSupplier {
                supplier: spof.supplier.clone(),
                products: spof.products.clone(),
            },
            format!(
                "{} depends on a single supplier ({}) and feeds {} product(s)",
                spof.component,
                spof.supplier,
                spof.products.len()
            ),
        ));
    }
    for c in &critical_components {
        findings.push(Finding::new(
            FindingKind::CriticalComponent,
            vec![c.component.clone()],
            c.score,
            Evidence::Criticality {
                score: c.score,
                supplier_count: c.supplier_count,
                product_count: c.product_count,
            },
            format!("{} has criticality {:.2}", c.name, c.score),
        ));
    }
    for share in geo_concentration.shares.iter().filter(|s| s.high_risk) {
        findings.push(Finding::new(
            FindingKind::GeoConcentration,
            vec![share.country.clone()],
            share.share,
            Evidence::CountryShare {
                share: share.share,
                components: share.components,
            },
            format!(
                "{:.0}% of components are manufactured in {}",
                share.share * 100.0,
                share.name
            ),
        ));
    }
    for exposure in &tariff_vulnerabilities {
        let Some(rule) = exposure.top_rule() else {
            continue;
        };
        let mut subjects = vec![exposure.component.clone(), rule.rule.clone()];
        subjects.extend(exposure.products.iter().cloned());
        findings.push(Finding::new(
            FindingKind::TariffVulnerable,
            subjects,
            (rule.rate / 50.0).min(1.0),
            Evidence::Tariff {
                rule: rule.rule.clone(),
                rate: rule.rate,
                products: exposure.products.clone(),
            },
            format!(
                "{} is subject to {} at {:.1}%",
                exposure.component, rule.rule_name, rule.rate
            ),
        ));
    }
    for gap in &data_gaps {
        findings.push(Finding::new(
            FindingKind::DataGap,
            vec![gap.component.clone()],
            if gap.missing_suppliers { 0.5 } else { 0.3 },
            Evidence::MissingLinks {
                suppliers: gap.missing_suppliers,
                products: gap.missing_products,
            },
            match (gap.missing_suppliers, gap.missing_products) {
                (true, true) => format!("{} has no suppliers and feeds no product", gap.component),
                (true, false) => format!("{} has no suppliers", gap.component),
                _ => format!("{} feeds no product", gap.component),
            },
        ));
    }
    sort_findings(&mut findings);

    let warnings = inconsistency_findings(graph, scope, &set.components);

    info!(
        "Veritas analysis of {:?}: {} components, {} critical, {} single points, resilience {:.1}",
        scope,
        set.components.len(),
        critical_components.len(),
        single_points.len(),
        resilience.score
    );

    Ok(VeritasReport {
        scope: scope.clone(),
        component_count: set.components.len(),
        product_count: set.products.len(),
        critical_components,
        single_points,
        data_gaps,
        geo_concentration,
        tariff_vulnerabilities,
        resilience,
        findings,
        warnings,
    })
}

/// Warning findings for inconsistent edges; scoped runs keep only edges touching the scope
fn inconsistency_findings(graph: &GraphStore, scope: &Scope, components: &[NodeId]) -> Vec<Finding> {
    let in_scope: HashSet<&NodeId> = components.iter().collect();
    let scoped = matches!(scope, Scope::Company(_));

    check_consistency(graph)
        .into_iter()
        .filter(|i| !scoped || in_scope.contains(&i.source) || in_scope.contains(&i.target))
        .map(|i| {
            let message = match i.kind {
                InconsistencyKind::MissingSource => {
                    format!("{} edge {} has missing source {}", i.edge_type, i.edge, i.source)
                }
                InconsistencyKind::MissingTarget => {
                    format!("{} edge {} has missing target {}", i.edge_type, i.edge, i.target)
                }
                InconsistencyKind::EndpointTypeMismatch => format!(
                    "{} edge {} cannot connect {} to {}",
                    i.edge_type, i.edge, i.source, i.target
                ),
            };
            Finding::new(
                FindingKind::GraphInconsistency,
                vec![i.source.clone(), i.target.clone()],
                0.1,
                Evidence::Inconsistency {
                    edge: i.edge,
                    edge_type: i.edge_type,
                    source_type: i.source_type,
                    target_type: i.target_type,
                },
                message,
            )
        })
        .collect()
}

/// Analyze several scopes in parallel over one shared graph
pub fn analyze_many(
    graph: &GraphStore,
    scopes: &[Scope],
    config: &AnalysisConfig,
) -> Vec<VeritasResult<VeritasReport>> {
    scopes
        .par_iter()
        .map(|scope| analyze(graph, scope, config))
        .collect()
}
