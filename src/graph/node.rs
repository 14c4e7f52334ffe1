//! Node implementation for the supply-chain graph
//!
//! Each node carries a typed payload for the fields the analysis reads and a
//! residual property map for everything else the ingestion step supplies.

use super::property::{PropertyMap, PropertyValue};
use super::types::{NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Manufacturing complexity tier of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default)]
pub enum ComplexityTier {
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
}

impl ComplexityTier {
    /// Fixed ordinal scale used by criticality scoring
    pub fn ordinal(&self) -> f64 {
        match self {
            ComplexityTier::Low => 0.25,
            ComplexityTier::Medium => 0.5,
            ComplexityTier::High => 0.75,
            ComplexityTier::VeryHigh => 1.0,
        }
    }
}

/// Kind of geopolitical event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EventType {
    #[default]
    TradeRestriction,
    Conflict,
    NaturalDisaster,
    PoliticalChange,
}

/// Qualitative severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default)]
pub enum SeverityTier {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub region: Option<String>,
    pub iso_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Headquarters country
    pub headquarters: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub category: Option<String>,
    /// Annual trade value in currency units
    pub trade_value: Option<f64>,
    pub lead_time_days: Option<f64>,
    pub release_year: Option<i32>,
    /// Gross margin as a fraction
    pub margin: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub category: Option<String>,
    pub complexity: ComplexityTier,
    /// Known production bottleneck
    pub bottleneck: bool,
    pub lead_time_days: Option<f64>,
    pub unit_cost: Option<f64>,
    pub trade_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRule {
    /// Current rate in percent, [0, 100]
    pub rate: f64,
    pub active: bool,
    /// Component category the rule covers without an explicit edge
    pub category: Option<String>,
    /// Exporting country
    pub origin: Option<NodeId>,
    /// Importing country
    pub destination: Option<NodeId>,
}

impl Default for TariffRule {
    fn default() -> Self {
        Self {
            rate: 0.0,
            active: true,
            category: None,
            origin: None,
            destination: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisruptionEvent {
    pub event_type: EventType,
    pub severity: SeverityTier,
    pub duration_months: f64,
}

/// Typed payload per node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Country(Country),
    Company(Company),
    Product(Product),
    Component(Component),
    Material(Material),
    TariffRule(TariffRule),
    DisruptionEvent(DisruptionEvent),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Country(_) => NodeType::Country,
            NodeKind::Company(_) => NodeType::Company,
            NodeKind::Product(_) => NodeType::Product,
            NodeKind::Component(_) => NodeType::Component,
            NodeKind::Material(_) => NodeType::Material,
            NodeKind::TariffRule(_) => NodeType::TariffRule,
            NodeKind::DisruptionEvent(_) => NodeType::DisruptionEvent,
        }
    }
}

/// A node in the supply-chain graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Display name
    pub name: String,

    /// Typed payload
    pub kind: NodeKind,

    /// Residual attributes (criticality hints, source-system fields, ...)
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Node {
            id: id.into(),
            name: name.into(),
            kind,
            properties: PropertyMap::new(),
        }
    }

    pub fn country(id: impl Into<NodeId>, name: impl Into<String>, country: Country) -> Self {
        Self::new(id, name, NodeKind::Country(country))
    }

    pub fn company(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::Company(Company::default()))
    }

    pub fn product(id: impl Into<NodeId>, name: impl Into<String>, product: Product) -> Self {
        Self::new(id, name, NodeKind::Product(product))
    }

    pub fn component(id: impl Into<NodeId>, name: impl Into<String>, component: Component) -> Self {
        Self::new(id, name, NodeKind::Component(component))
    }

    pub fn material(id: impl Into<NodeId>, name: impl Into<String>, material: Material) -> Self {
        Self::new(id, name, NodeKind::Material(material))
    }

    pub fn tariff_rule(id: impl Into<NodeId>, name: impl Into<String>, rule: TariffRule) -> Self {
        Self::new(id, name, NodeKind::TariffRule(rule))
    }

    pub fn disruption_event(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        event: DisruptionEvent,
    ) -> Self {
        Self::new(id, name, NodeKind::DisruptionEvent(event))
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is(&self, node_type: NodeType) -> bool {
        self.node_type() == node_type
    }

    pub fn as_country(&self) -> Option<&Country> {
        match &self.kind {
            NodeKind::Country(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_company(&self) -> Option<&Company> {
        match &self.kind {
            NodeKind::Company(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_product(&self) -> Option<&Product> {
        match &self.kind {
            NodeKind::Product(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&Component> {
        match &self.kind {
            NodeKind::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tariff_rule(&self) -> Option<&TariffRule> {
        match &self.kind {
            NodeKind::TariffRule(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_disruption_event(&self) -> Option<&DisruptionEvent> {
        match &self.kind {
            NodeKind::DisruptionEvent(e) => Some(e),
            _ => None,
        }
    }

    /// Category of a product, component or material
    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Product(p) => p.category.as_deref(),
            NodeKind::Component(c) => c.category.as_deref(),
            NodeKind::Material(m) => m.category.as_deref(),
            _ => None,
        }
    }

    /// Set a residual attribute, builder style
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Boolean attribute, `false` when absent or not a boolean
    pub fn flag(&self, key: &str) -> bool {
        self.get_property(key)
            .and_then(PropertyValue::as_boolean)
            .unwrap_or(false)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_payload() {
        let node = Node::component(
            "comp_gpu",
            "GPU die",
            Component {
                category: Some("semiconductor".into()),
                complexity: ComplexityTier::VeryHigh,
                bottleneck: true,
                ..Default::default()
            },
        );

        assert_eq!(node.node_type(), NodeType::Component);
        assert!(node.is(NodeType::Component));
        assert_eq!(node.category(), Some("semiconductor"));
        assert_eq!(node.as_component().unwrap().complexity.ordinal(), 1.0);
        assert!(node.as_product().is_none());
    }

    #[test]
    fn test_residual_properties() {
        let mut node = Node::company("sup_tsmc", "TSMC").with_property("critical", true);
        assert!(node.flag("critical"));
        assert!(!node.flag("missing"));

        node.set_property("employees", 73000i64);
        assert_eq!(node.get_property("employees").unwrap().as_integer(), Some(73000));
    }

    #[test]
    fn test_tariff_rule_defaults_active() {
        let rule = TariffRule::default();
        assert!(rule.active);
        assert_eq!(rule.rate, 0.0);
    }

    #[test]
    fn test_complexity_ordinal_is_increasing() {
        let tiers = [
            ComplexityTier::Low,
            ComplexityTier::Medium,
            ComplexityTier::High,
            ComplexityTier::VeryHigh,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
        assert_eq!(ComplexityTier::default(), ComplexityTier::Medium);
    }

    #[test]
    fn test_node_equality_by_id() {
        let a = Node::company("x", "Alpha");
        let b = Node::company("x", "Renamed");
        let c = Node::company("y", "Alpha");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
