//! Impact calculator
//!
//! Simulates a scenario by propagating its seed severities downstream along
//! `usedIn` and `supplies` edges, then converts the per-product severity into
//! order-of-magnitude estimates of cost, availability and lead-time impact.
//!
//! Per-product estimates for a severity `s`:
//! - cost increase: `100 * s * cost_factor` percent
//! - availability loss: `100 * s * availability_factor` percent
//! - lead-time delay: `s * lead_factor * lead_time_weeks`
//! - value at risk: `s * trade_value`
//!
//! The first three are amplified when a critical component lies on the
//! propagation path.

use super::allocation::{allocation_plan, AllocationPlan};
use super::scenario::{Scenario, ScenarioKind, ScenarioRequest};
use crate::algo::{PropagationConfig, SeverityTrace, StoreView};
use crate::config::{ConfigError, ImpactConfig};
use crate::graph::{Edge, EdgeType, EventType, GraphStore, NodeId, NodeType};
use crate::veritas::{RiskLevel, VeritasReport};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const PROPAGATION_EDGES: [EdgeType; 2] = [EdgeType::UsedIn, EdgeType::Supplies];

const DAYS_PER_WEEK: f64 = 7.0;

/// Months a full-severity disruption takes to recover from
const FULL_RECOVERY_MONTHS: f64 = 18.0;

/// Simulation errors
#[derive(Error, Debug)]
pub enum ImpactError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type SimulationResult<T> = Result<T, ImpactError>;

/// Estimated impact on one product, or aggregated over many
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    /// Signed; negative for tariff cuts
    pub cost_increase_pct: f64,
    pub availability_loss_pct: f64,
    pub lead_time_delay_weeks: f64,
    pub value_at_risk: f64,
}

impl ImpactEstimate {
    /// Field-wise worst case; cost keeps the larger magnitude
    fn worst(&self, other: &ImpactEstimate) -> ImpactEstimate {
        let cost = if other.cost_increase_pct.abs() > self.cost_increase_pct.abs() {
            other.cost_increase_pct
        } else {
            self.cost_increase_pct
        };
        ImpactEstimate {
            cost_increase_pct: cost,
            availability_loss_pct: self.availability_loss_pct.max(other.availability_loss_pct),
            lead_time_delay_weeks: self.lead_time_delay_weeks.max(other.lead_time_delay_weeks),
            value_at_risk: self.value_at_risk.max(other.value_at_risk),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedProduct {
    pub product: NodeId,
    pub name: String,
    /// Worst-case propagated severity
    pub severity: f64,
    pub hop: usize,
    pub via: Option<NodeId>,
    /// A critical component lies on the propagation path
    pub critical_path: bool,
    pub estimate: ImpactEstimate,
}

/// Averages and maxima over the affected products
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub avg_cost_increase_pct: f64,
    pub max_cost_increase_pct: f64,
    pub avg_availability_loss_pct: f64,
    pub max_availability_loss_pct: f64,
    pub avg_lead_time_delay_weeks: f64,
    pub max_lead_time_delay_weeks: f64,
    pub value_at_risk: f64,
}

impl ImpactSummary {
    fn of(products: &[AffectedProduct]) -> Self {
        if products.is_empty() {
            return Self::default();
        }
        let n = products.len() as f64;
        let mut summary = Self::default();
        for p in products {
            let e = &p.estimate;
            summary.avg_cost_increase_pct += e.cost_increase_pct / n;
            summary.avg_availability_loss_pct += e.availability_loss_pct / n;
            summary.avg_lead_time_delay_weeks += e.lead_time_delay_weeks / n;
            summary.value_at_risk += e.value_at_risk;
            if e.cost_increase_pct.abs() > summary.max_cost_increase_pct.abs() {
                summary.max_cost_increase_pct = e.cost_increase_pct;
            }
            summary.max_availability_loss_pct =
                summary.max_availability_loss_pct.max(e.availability_loss_pct);
            summary.max_lead_time_delay_weeks =
                summary.max_lead_time_delay_weeks.max(e.lead_time_delay_weeks);
        }
        summary
    }
}

/// Resilience before and after the scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResilienceImpact {
    pub before: f64,
    pub after: f64,
    pub drop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub scenario_id: String,
    pub kinds: Vec<ScenarioKind>,
    /// Highest severity first
    pub affected_products: Vec<AffectedProduct>,
    /// Every reached node, highest severity first
    pub affected_nodes: Vec<SeverityTrace>,
    pub cascade_depth: usize,
    /// Critical components the disruption reaches
    pub critical_components_hit: Vec<NodeId>,
    pub summary: ImpactSummary,
    pub resilience: ResilienceImpact,
    pub overall_level: RiskLevel,
    pub recovery_months: f64,
    /// Present for shortage scenarios
    pub allocation: Option<AllocationPlan>,
}

impl ImpactResult {
    pub fn is_empty(&self) -> bool {
        self.affected_nodes.is_empty()
    }

    pub fn product(&self, id: &NodeId) -> Option<&AffectedProduct> {
        self.affected_products.iter().find(|p| &p.product == id)
    }

    /// Propagated severity at a node, zero when unreached
    pub fn severity_of(&self, node: &NodeId) -> f64 {
        self.affected_nodes
            .iter()
            .find(|t| &t.node == node)
            .map_or(0.0, |t| t.severity)
    }
}

/// Lead time, availability and cost factors of a geopolitical event type
pub fn event_factors(event_type: EventType) -> (f64, f64, f64) {
    match event_type {
        EventType::TradeRestriction => (0.5, 0.3, 0.8),
        EventType::Conflict => (0.9, 0.8, 0.6),
        EventType::NaturalDisaster => (0.7, 0.9, 0.4),
        EventType::PoliticalChange => (0.3, 0.2, 0.5),
    }
}

#[derive(Debug, Clone, Copy)]
struct ImpactFactors {
    lead_time: f64,
    availability: f64,
    cost: f64,
}

fn impact_factors(scenario: &Scenario, config: &ImpactConfig) -> ImpactFactors {
    let duration_scale = 0.5 + scenario.magnitude.duration_factor();
    match &scenario.request {
        ScenarioRequest::TariffChange { rate_delta, .. } => ImpactFactors {
            lead_time: 0.1,
            availability: 0.0,
            cost: config.tariff_pass_through * rate_delta.signum(),
        },
        ScenarioRequest::SupplierDisruption { .. } => ImpactFactors {
            lead_time: duration_scale,
            availability: 1.0,
            cost: 0.2,
        },
        ScenarioRequest::GeopoliticalEvent { event_type, .. } => {
            let (lead, availability, cost) = event_factors(*event_type);
            ImpactFactors {
                lead_time: lead * duration_scale,
                availability,
                cost: cost * 0.3,
            }
        }
        ScenarioRequest::Shortage { .. } => ImpactFactors {
            lead_time: duration_scale,
            availability: 1.0,
            cost: 0.5,
        },
    }
}

fn propagation_config(scenario: &Scenario, config: &ImpactConfig) -> PropagationConfig {
    PropagationConfig {
        decay: config.decay * scenario.magnitude.decay_modifier.clamp(0.0, 1.0),
        floor: config.floor,
        max_depth: config.max_depth,
    }
}

/// Outcome of one scenario before merging
struct Run {
    traces: Vec<SeverityTrace>,
    depth: usize,
    products: Vec<AffectedProduct>,
    recovery_months: f64,
}

fn run(
    graph: &GraphStore,
    scenario: &Scenario,
    report: &VeritasReport,
    config: &ImpactConfig,
) -> Run {
    let seeds: Vec<(NodeId, f64)> = scenario
        .targets
        .iter()
        .map(|t| (t.node.clone(), t.severity))
        .collect();
    let propagation = propagation_config(scenario, config);
    debug!(
        scenario = %scenario.id,
        seeds = seeds.len(),
        decay = propagation.decay,
        "Propagating scenario"
    );

    let (traces, depth) = if scenario.kind == ScenarioKind::SupplierDisruption {
        let weight = |edge: &Edge| supply_share(graph, edge);
        StoreView::weighted(graph, &PROPAGATION_EDGES, &weight).propagate(&seeds, &propagation)
    } else {
        StoreView::new(graph, &PROPAGATION_EDGES).propagate(&seeds, &propagation)
    };

    let factors = impact_factors(scenario, config);
    let by_node: FxHashMap<&NodeId, &SeverityTrace> =
        traces.iter().map(|t| (&t.node, t)).collect();

    let products = traces
        .iter()
        .filter_map(|trace| {
            let node = graph.get_node(&trace.node)?;
            let product = node.as_product()?;
            let critical_path = path_has_critical(&by_node, trace, report);
            let lead_time_weeks =
                product.lead_time_days.unwrap_or(config.default_lead_time_days) / DAYS_PER_WEEK;
            let multiplier = if critical_path {
                config.critical_path_multiplier
            } else {
                1.0
            };
            let s = trace.severity * multiplier;
            Some(AffectedProduct {
                product: trace.node.clone(),
                name: node.name.clone(),
                severity: trace.severity,
                hop: trace.hop,
                via: trace.via.clone(),
                critical_path,
                estimate: ImpactEstimate {
                    cost_increase_pct: 100.0 * s * factors.cost,
                    availability_loss_pct: (100.0 * s * factors.availability).min(100.0),
                    lead_time_delay_weeks: s * factors.lead_time * lead_time_weeks,
                    value_at_risk: trace.severity * product.trade_value.unwrap_or(0.0),
                },
            })
        })
        .collect();

    let peak = scenario
        .targets
        .iter()
        .map(|t| t.severity)
        .fold(0.0_f64, f64::max);
    let recovery_months = scenario
        .magnitude
        .duration_months
        .max((peak * FULL_RECOVERY_MONTHS).round());

    Run {
        traces,
        depth,
        products,
        recovery_months,
    }
}

/// Fraction of the downstream node's supply carried by this edge
fn supply_share(graph: &GraphStore, edge: &Edge) -> f64 {
    match edge.edge_type {
        EdgeType::Supplies => edge.share.unwrap_or_else(|| {
            let suppliers = graph.suppliers_of(&edge.target).len().max(1);
            1.0 / suppliers as f64
        }),
        _ => edge.share.unwrap_or(1.0),
    }
}

fn path_has_critical(
    by_node: &FxHashMap<&NodeId, &SeverityTrace>,
    trace: &SeverityTrace,
    report: &VeritasReport,
) -> bool {
    let mut current = trace.via.as_ref();
    // A path has at most `hop` predecessors
    for _ in 0..trace.hop {
        let Some(node) = current else {
            return false;
        };
        if report.is_critical(node) {
            return true;
        }
        current = by_node.get(node).and_then(|t| t.via.as_ref());
    }
    false
}

fn overall_level(summary: &ImpactSummary, resilience_drop: f64) -> RiskLevel {
    let cost = summary.avg_cost_increase_pct.abs();
    let lead = summary.avg_lead_time_delay_weeks;
    let availability = summary.avg_availability_loss_pct;
    if resilience_drop > 15.0 || lead > 8.0 || availability > 40.0 || cost > 20.0 {
        RiskLevel::High
    } else if resilience_drop > 7.0 || lead > 4.0 || availability > 20.0 || cost > 10.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Resilience after removing the disrupted share of the reached components
fn resilience_after(
    graph: &GraphStore,
    traces: &[SeverityTrace],
    report: &VeritasReport,
) -> ResilienceImpact {
    let before = report.resilience.score;
    let after = if report.component_count == 0 {
        before
    } else {
        let lost: f64 = traces
            .iter()
            .filter(|t| {
                graph
                    .get_node(&t.node)
                    .is_some_and(|n| n.is(NodeType::Component))
            })
            .map(|t| t.severity)
            .sum();
        let fraction = (lost / report.component_count as f64).min(1.0);
        before * (1.0 - fraction)
    };
    ResilienceImpact {
        before,
        after,
        drop: before - after,
    }
}

fn critical_counts(graph: &GraphStore, report: &VeritasReport) -> IndexMap<NodeId, usize> {
    let mut counts = IndexMap::new();
    for critical in &report.critical_components {
        for product in graph.dependent_products(&critical.component) {
            *counts.entry(product).or_insert(0) += 1;
        }
    }
    counts
}

/// Simulate one scenario
pub fn simulate(
    graph: &GraphStore,
    scenario: &Scenario,
    report: &VeritasReport,
    config: &ImpactConfig,
) -> SimulationResult<ImpactResult> {
    simulate_combined(graph, std::slice::from_ref(scenario), report, config)
}

/// Simulate several scenarios at once.
///
/// Each scenario propagates with its own decay and weights; per node and per
/// product the worst case over all scenarios is kept.
pub fn simulate_combined(
    graph: &GraphStore,
    scenarios: &[Scenario],
    report: &VeritasReport,
    config: &ImpactConfig,
) -> SimulationResult<ImpactResult> {
    config.validate()?;

    let mut traces: IndexMap<NodeId, SeverityTrace> = IndexMap::new();
    let mut products: IndexMap<NodeId, AffectedProduct> = IndexMap::new();
    let mut cascade_depth = 0;
    let mut recovery_months: f64 = 0.0;
    let mut allocation = None;

    for scenario in scenarios {
        if scenario.is_empty() {
            debug!(scenario = %scenario.id, "Scenario has no targets");
        }
        let outcome = run(graph, scenario, report, config);
        cascade_depth = cascade_depth.max(outcome.depth);
        recovery_months = recovery_months.max(outcome.recovery_months);

        for trace in outcome.traces {
            match traces.get_mut(&trace.node) {
                Some(existing) if existing.severity >= trace.severity => {}
                Some(existing) => *existing = trace,
                None => {
                    traces.insert(trace.node.clone(), trace);
                }
            }
        }

        let plan_products: Vec<NodeId> =
            outcome.products.iter().map(|p| p.product.clone()).collect();
        for product in outcome.products {
            match products.get_mut(&product.product) {
                Some(existing) => {
                    let estimate = existing.estimate.worst(&product.estimate);
                    if product.severity > existing.severity {
                        *existing = product;
                    }
                    existing.estimate = estimate;
                }
                None => {
                    products.insert(product.product.clone(), product);
                }
            }
        }

        if allocation.is_none() {
            if let ScenarioRequest::Shortage {
                available_fraction, ..
            } = &scenario.request
            {
                if !plan_products.is_empty() {
                    allocation = Some(allocation_plan(
                        graph,
                        &plan_products,
                        *available_fraction,
                        &critical_counts(graph, report),
                    ));
                }
            }
        }
    }

    let mut affected_nodes: Vec<SeverityTrace> = traces.into_values().collect();
    affected_nodes.sort_by(|a, b| {
        b.severity
            .partial_cmp(&a.severity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.hop.cmp(&b.hop))
            .then(a.node.cmp(&b.node))
    });
    let mut affected_products: Vec<AffectedProduct> = products.into_values().collect();
    affected_products.sort_by(|a, b| {
        b.severity
            .partial_cmp(&a.severity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.product.cmp(&b.product))
    });

    let critical_components_hit: Vec<NodeId> = affected_nodes
        .iter()
        .filter(|t| report.is_critical(&t.node))
        .map(|t| t.node.clone())
        .collect();

    let summary = ImpactSummary::of(&affected_products);
    let resilience = resilience_after(graph, &affected_nodes, report);
    let overall_level = overall_level(&summary, resilience.drop);

    let ids: Vec<&str> = scenarios.iter().map(|s| s.id.as_str()).collect();
    let result = ImpactResult {
        scenario_id: ids.join("+"),
        kinds: scenarios.iter().map(|s| s.kind).collect(),
        affected_products,
        affected_nodes,
        cascade_depth,
        critical_components_hit,
        summary,
        resilience,
        overall_level,
        recovery_months,
        allocation,
    };

    info!(
        "Simulated {}: {} products affected, depth {}, {} impact",
        result.scenario_id,
        result.affected_products.len(),
        result.cascade_depth,
        result.overall_level
    );
    Ok(result)
}
