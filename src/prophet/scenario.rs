//! Scenario modeler
//!
//! Resolves a what-if request into a [`Scenario`] anchored to concrete graph
//! nodes. Resolution only reads the graph; unknown targets and out-of-domain
//! magnitudes are rejected before any simulation runs.

use crate::graph::{EdgeType, EventType, GraphStore, Node, NodeId, NodeType, SeverityTier};
use crate::veritas::tariff::all_rules_for;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Scenario construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

fn invalid<T>(message: impl Into<String>) -> ScenarioResult<T> {
    Err(ScenarioError::InvalidScenario(message.into()))
}

/// How much of a supplier's output is lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisruptionLevel {
    Partial,
    Complete,
}

impl DisruptionLevel {
    pub fn factor(&self) -> f64 {
        match self {
            DisruptionLevel::Partial => 0.6,
            DisruptionLevel::Complete => 1.0,
        }
    }
}

/// What a shortage applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortageTarget {
    Component(NodeId),
    /// Every component whose category contains this text, ignoring case
    Category(String),
}

/// A what-if request before resolution against the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioRequest {
    TariffChange {
        origin: NodeId,
        destination: NodeId,
        category: Option<String>,
        /// Signed change in percentage points
        rate_delta: f64,
    },
    SupplierDisruption {
        supplier: NodeId,
        level: DisruptionLevel,
        duration_months: f64,
    },
    GeopoliticalEvent {
        countries: Vec<NodeId>,
        event_type: EventType,
        severity: SeverityTier,
        duration_months: f64,
    },
    Shortage {
        target: ShortageTarget,
        /// Fraction of normal supply still available, in [0, 1]
        available_fraction: f64,
        duration_months: f64,
    },
}

impl ScenarioRequest {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioRequest::TariffChange { .. } => ScenarioKind::TariffChange,
            ScenarioRequest::SupplierDisruption { .. } => ScenarioKind::SupplierDisruption,
            ScenarioRequest::GeopoliticalEvent { .. } => ScenarioKind::GeopoliticalEvent,
            ScenarioRequest::Shortage { .. } => ScenarioKind::Shortage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    TariffChange,
    SupplierDisruption,
    GeopoliticalEvent,
    Shortage,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioKind::TariffChange => "tariff_change",
            ScenarioKind::SupplierDisruption => "supplier_disruption",
            ScenarioKind::GeopoliticalEvent => "geopolitical_event",
            ScenarioKind::Shortage => "shortage",
        };
        write!(f, "{}", name)
    }
}

/// A seed node with its starting severity in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTarget {
    pub node: NodeId,
    pub severity: f64,
}

/// Normalized scenario magnitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    /// Seed severity before per-target scaling, in [0, 1]
    pub severity: f64,
    pub duration_months: f64,
    /// Extra attenuation on the per-hop decay, in (0, 1]
    pub decay_modifier: f64,
    pub rate_delta: Option<f64>,
    pub available_fraction: Option<f64>,
}

impl Magnitude {
    fn new(severity: f64, duration_months: f64) -> Self {
        Self {
            severity: severity.clamp(0.0, 1.0),
            duration_months,
            decay_modifier: 1.0,
            rate_delta: None,
            available_fraction: None,
        }
    }

    /// Share of a year the disruption lasts, capped at 1
    pub fn duration_factor(&self) -> f64 {
        (self.duration_months / 12.0).clamp(0.0, 1.0)
    }
}

/// A scenario resolved against the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub kind: ScenarioKind,
    pub request: ScenarioRequest,
    /// Seed nodes in graph insertion order
    pub targets: Vec<ScenarioTarget>,
    /// Products depending on any target
    pub affected_products: Vec<NodeId>,
    pub magnitude: Magnitude,
    /// Tariff rules whose rate the scenario changes
    pub touched_rules: Vec<NodeId>,
}

impl Scenario {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn target_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.targets.iter().map(|t| &t.node)
    }

    pub fn targets_node(&self, node: &NodeId) -> bool {
        self.targets.iter().any(|t| &t.node == node)
    }
}

/// Seed severity and decay modifier of a severity tier.
///
/// Milder events fade faster; no tier propagates further than the configured decay.
pub fn tier_profile(tier: SeverityTier) -> (f64, f64) {
    match tier {
        SeverityTier::Low => (0.3, 0.8),
        SeverityTier::Medium => (0.6, 0.9),
        SeverityTier::High => (0.9, 1.0),
    }
}

/// Resolve a request against the graph
pub fn build_scenario(graph: &GraphStore, request: ScenarioRequest) -> ScenarioResult<Scenario> {
    let scenario = match &request {
        ScenarioRequest::TariffChange {
            origin,
            destination,
            category,
            rate_delta,
        } => tariff_change(graph, origin, destination, category.as_deref(), *rate_delta),
        ScenarioRequest::SupplierDisruption {
            supplier,
            level,
            duration_months,
        } => supplier_disruption(graph, supplier, *level, *duration_months),
        ScenarioRequest::GeopoliticalEvent {
            countries,
            event_type,
            severity,
            duration_months,
        } => geopolitical_event(graph, countries, *event_type, *severity, *duration_months),
        ScenarioRequest::Shortage {
            target,
            available_fraction,
            duration_months,
        } => shortage(graph, target, *available_fraction, *duration_months),
    }?;

    let Resolved {
        id,
        targets,
        magnitude,
        touched_rules,
    } = scenario;
    let affected_products = products_depending_on(graph, &targets);

    info!(
        "Built scenario {} with {} targets and {} dependent products",
        id,
        targets.len(),
        affected_products.len()
    );

    Ok(Scenario {
        id,
        kind: request.kind(),
        request,
        targets,
        affected_products,
        magnitude,
        touched_rules,
    })
}

/// Build a geopolitical scenario from a disruption event node.
///
/// Countries come from the event's `affects` edges; components it affects
/// directly are seeded as well.
pub fn scenario_from_event(graph: &GraphStore, event_id: &NodeId) -> ScenarioResult<Scenario> {
    let Some(node) = graph.get_node(event_id) else {
        return invalid(format!("unknown event {}", event_id));
    };
    let Some(event) = node.as_disruption_event() else {
        return invalid(format!("{} is not a disruption event", event_id));
    };

    let mut countries = Vec::new();
    let mut components = Vec::new();
    for edge in graph.outgoing_of_type(event_id, EdgeType::Affects) {
        match graph.get_node(&edge.target).map(Node::node_type) {
            Some(NodeType::Country) if !countries.contains(&edge.target) => {
                countries.push(edge.target.clone())
            }
            Some(NodeType::Component) if !components.contains(&edge.target) => {
                components.push(edge.target.clone())
            }
            _ => {}
        }
    }
    if countries.is_empty() && components.is_empty() {
        return invalid(format!(
            "event {} affects no country or component",
            event_id
        ));
    }

    let mut scenario = build_scenario(
        graph,
        ScenarioRequest::GeopoliticalEvent {
            countries,
            event_type: event.event_type,
            severity: event.severity,
            duration_months: event.duration_months,
        },
    )?;

    let seed = scenario.magnitude.severity;
    let mut added = false;
    for component in components {
        if !scenario.targets_node(&component) {
            scenario.targets.push(ScenarioTarget {
                node: component,
                severity: seed,
            });
            added = true;
        }
    }
    if added {
        scenario.affected_products = products_depending_on(graph, &scenario.targets);
    }
    scenario.id = format!("event:{}", event_id);
    Ok(scenario)
}

struct Resolved {
    id: String,
    targets: Vec<ScenarioTarget>,
    magnitude: Magnitude,
    touched_rules: Vec<NodeId>,
}

fn check_duration(duration_months: f64) -> ScenarioResult<()> {
    if duration_months.is_finite() && duration_months >= 0.0 {
        Ok(())
    } else {
        invalid(format!(
            "duration must be a non-negative number of months, got {}",
            duration_months
        ))
    }
}

fn require(graph: &GraphStore, id: &NodeId, allowed: &[NodeType]) -> ScenarioResult<()> {
    match graph.get_node(id) {
        None => invalid(format!("unknown node {}", id)),
        Some(node) if !allowed.contains(&node.node_type()) => invalid(format!(
            "{} is a {}, expected one of {:?}",
            id,
            node.node_type(),
            allowed
        )),
        Some(_) => Ok(()),
    }
}

fn category_contains(node: &Node, needle: &str) -> bool {
    node.category()
        .is_some_and(|c| c.to_lowercase().contains(&needle.to_lowercase()))
}

fn tariff_change(
    graph: &GraphStore,
    origin: &NodeId,
    destination: &NodeId,
    category: Option<&str>,
    rate_delta: f64,
) -> ScenarioResult<Resolved> {
    require(graph, origin, &[NodeType::Country])?;
    require(graph, destination, &[NodeType::Country])?;
    if !rate_delta.is_finite() || rate_delta.abs() > 100.0 {
        return invalid(format!(
            "rate delta must be within [-100, 100], got {}",
            rate_delta
        ));
    }

    let mut targets = Vec::new();
    let mut touched_rules: Vec<NodeId> = Vec::new();
    let severity = rate_delta.abs() / 100.0;

    for component in graph.nodes_of_type(NodeType::Component) {
        if !graph.countries_of(&component.id).contains(&origin) {
            continue;
        }
        if let Some(category) = category {
            let matches = component
                .category()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !matches {
                continue;
            }
        }

        // Existing rules on the lane, in force or not, take the new rate
        for hit in all_rules_for(graph, component) {
            let Some(rule) = graph
                .get_node(&hit.rule)
                .and_then(|node| node.as_tariff_rule())
            else {
                continue;
            };
            let origin_ok = rule.origin.as_ref().map_or(true, |o| o == origin);
            let destination_ok = rule.destination.as_ref().map_or(true, |d| d == destination);
            if !(origin_ok && destination_ok) {
                continue;
            }
            let new_rate = rule.rate + rate_delta;
            if !(0.0..=100.0).contains(&new_rate) {
                return invalid(format!(
                    "rule {} would move from {}% to {}%",
                    hit.rule, rule.rate, new_rate
                ));
            }
            if !touched_rules.contains(&hit.rule) {
                touched_rules.push(hit.rule);
            }
        }

        debug!(component = %component.id, "Tariff change reaches component");
        targets.push(ScenarioTarget {
            node: component.id.clone(),
            severity,
        });
    }

    let mut magnitude = Magnitude::new(severity, 0.0);
    magnitude.rate_delta = Some(rate_delta);

    Ok(Resolved {
        id: format!(
            "tariff:{}->{}:{}{:+}",
            origin,
            destination,
            category.map(|c| format!("{}:", c)).unwrap_or_default(),
            rate_delta
        ),
        targets,
        magnitude,
        touched_rules,
    })
}

fn supplier_disruption(
    graph: &GraphStore,
    supplier: &NodeId,
    level: DisruptionLevel,
    duration_months: f64,
) -> ScenarioResult<Resolved> {
    require(graph, supplier, &[NodeType::Company, NodeType::Material])?;
    check_duration(duration_months)?;

    let severity = level.factor();
    let mut targets: Vec<ScenarioTarget> = Vec::new();
    for edge in graph.outgoing_of_type(supplier, EdgeType::Supplies) {
        if !graph.has_node(&edge.target) || targets.iter().any(|t| t.node == edge.target) {
            continue;
        }
        let share = edge.share.unwrap_or_else(|| {
            let suppliers = graph.suppliers_of(&edge.target).len().max(1);
            1.0 / suppliers as f64
        });
        debug!(component = %edge.target, share, "Supplier disruption seed");
        targets.push(ScenarioTarget {
            node: edge.target.clone(),
            severity: (severity * share).clamp(0.0, 1.0),
        });
    }

    let level_name = match level {
        DisruptionLevel::Partial => "partial",
        DisruptionLevel::Complete => "complete",
    };
    Ok(Resolved {
        id: format!("supplier:{}:{}:{}m", supplier, level_name, duration_months),
        targets,
        magnitude: Magnitude::new(severity, duration_months),
        touched_rules: Vec::new(),
    })
}

fn geopolitical_event(
    graph: &GraphStore,
    countries: &[NodeId],
    event_type: EventType,
    tier: SeverityTier,
    duration_months: f64,
) -> ScenarioResult<Resolved> {
    if countries.is_empty() {
        return invalid("geopolitical event names no country");
    }
    for country in countries {
        require(graph, country, &[NodeType::Country])?;
    }
    check_duration(duration_months)?;

    let (severity, decay_modifier) = tier_profile(tier);
    let targets = graph
        .nodes_of_type(NodeType::Component)
        .into_iter()
        .filter(|component| {
            graph
                .countries_of(&component.id)
                .into_iter()
                .any(|c| countries.contains(c))
        })
        .map(|component| ScenarioTarget {
            node: component.id.clone(),
            severity,
        })
        .collect();

    let mut magnitude = Magnitude::new(severity, duration_months);
    magnitude.decay_modifier = decay_modifier;

    let names: Vec<&str> = countries.iter().map(NodeId::as_str).collect();
    Ok(Resolved {
        id: format!("geopolitical:{:?}:{}", event_type, names.join("+")),
        targets,
        magnitude,
        touched_rules: Vec::new(),
    })
}

fn shortage(
    graph: &GraphStore,
    target: &ShortageTarget,
    available_fraction: f64,
    duration_months: f64,
) -> ScenarioResult<Resolved> {
    if !(0.0..=1.0).contains(&available_fraction) {
        return invalid(format!(
            "available fraction must be within [0, 1], got {}",
            available_fraction
        ));
    }
    check_duration(duration_months)?;

    let severity = 1.0 - available_fraction;
    let (components, label): (Vec<NodeId>, String) = match target {
        ShortageTarget::Component(id) => {
            require(graph, id, &[NodeType::Component])?;
            (vec![id.clone()], id.to_string())
        }
        ShortageTarget::Category(category) => {
            if category.trim().is_empty() {
                return invalid("shortage category is empty");
            }
            let ids = graph
                .nodes_of_type(NodeType::Component)
                .into_iter()
                .filter(|c| category_contains(c, category))
                .map(|c| c.id.clone())
                .collect();
            (ids, category.to_lowercase())
        }
    };

    let targets = components
        .into_iter()
        .map(|node| ScenarioTarget { node, severity })
        .collect();
    let mut magnitude = Magnitude::new(severity, duration_months);
    magnitude.available_fraction = Some(available_fraction);

    Ok(Resolved {
        id: format!("shortage:{}:{}", label, available_fraction),
        targets,
        magnitude,
        touched_rules: Vec::new(),
    })
}

fn products_depending_on(graph: &GraphStore, targets: &[ScenarioTarget]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut products = Vec::new();
    for target in targets {
        let direct = graph
            .get_node(&target.node)
            .is_some_and(|n| n.is(NodeType::Product));
        if direct && seen.insert(target.node.clone()) {
            products.push(target.node.clone());
        }
        for product in graph.dependent_products(&target.node) {
            if seen.insert(product.clone()) {
                products.push(product);
            }
        }
    }
    products
}
