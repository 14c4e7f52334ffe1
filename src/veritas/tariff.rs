//! Tariff vulnerability
//!
//! A component is exposed to an active tariff rule when it links to the rule
//! through `subjectToTariff`, or when its category matches the rule's category
//! and, if the rule names an origin country, it is manufactured there.

use super::scope::ScopeSet;
use crate::graph::{EdgeType, GraphStore, Node, NodeId, NodeType, TariffRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TariffLink {
    Direct,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffHit {
    pub rule: NodeId,
    pub rule_name: String,
    /// Current rate in percent
    pub rate: f64,
    pub link: TariffLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffExposure {
    pub component: NodeId,
    /// Highest rate first
    pub rules: Vec<TariffHit>,
    pub products: Vec<NodeId>,
}

impl TariffExposure {
    pub fn max_rate(&self) -> f64 {
        self.rules.first().map_or(0.0, |hit| hit.rate)
    }

    pub fn top_rule(&self) -> Option<&TariffHit> {
        self.rules.first()
    }
}

/// Active rules matching a component, highest rate first
pub fn rules_for(graph: &GraphStore, component: &Node) -> Vec<TariffHit> {
    matching_rules(graph, component, true)
}

/// Rules matching a component whether or not they are in force
pub fn all_rules_for(graph: &GraphStore, component: &Node) -> Vec<TariffHit> {
    matching_rules(graph, component, false)
}

fn matching_rules(graph: &GraphStore, component: &Node, active_only: bool) -> Vec<TariffHit> {
    let mut hits: Vec<TariffHit> = Vec::new();

    for edge in graph.outgoing_of_type(&component.id, EdgeType::SubjectToTariff) {
        let Some(rule_node) = graph.get_node(&edge.target) else {
            continue;
        };
        let Some(rule) = rule_node.as_tariff_rule() else {
            continue;
        };
        let in_force = rule.active || !active_only;
        if in_force && !hits.iter().any(|h| h.rule == rule_node.id) {
            hits.push(hit(rule_node, rule, TariffLink::Direct));
        }
    }

    if let Some(category) = component.category() {
        let countries = graph.countries_of(&component.id);
        for rule_node in graph.nodes_of_type(NodeType::TariffRule) {
            let Some(rule) = rule_node.as_tariff_rule() else {
                continue;
            };
            if (active_only && !rule.active) || hits.iter().any(|h| h.rule == rule_node.id) {
                continue;
            }
            let category_match = rule
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            let origin_match = rule
                .origin
                .as_ref()
                .map_or(true, |origin| countries.contains(&origin));
            if category_match && origin_match {
                hits.push(hit(rule_node, rule, TariffLink::Category));
            }
        }
    }

    hits.sort_by(|a, b| {
        b.rate
            .partial_cmp(&a.rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.rule.cmp(&b.rule))
    });
    hits
}

fn hit(node: &Node, rule: &TariffRule, link: TariffLink) -> TariffHit {
    TariffHit {
        rule: node.id.clone(),
        rule_name: node.name.clone(),
        rate: rule.rate,
        link,
    }
}

pub fn tariff_vulnerabilities(graph: &GraphStore, scope: &ScopeSet) -> Vec<TariffExposure> {
    scope
        .components
        .iter()
        .filter_map(|id| graph.get_node(id))
        .filter_map(|node| {
            let rules = rules_for(graph, node);
            if rules.is_empty() {
                return None;
            }
            Some(TariffExposure {
                component: node.id.clone(),
                rules,
                products: scope.products_fed_by(graph, &node.id),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Component, Country, Product};
    use crate::veritas::scope::{resolve, Scope};

    fn graph() -> GraphStore {
        let mut g = GraphStore::new();
        g.add_node(Node::country("cn", "China", Country::default())).unwrap();
        g.add_node(Node::country("vn", "Vietnam", Country::default())).unwrap();
        g.add_node(Node::product("p1", "Laptop", Product::default())).unwrap();

        let chip = Component {
            category: Some("Semiconductor".into()),
            ..Default::default()
        };
        g.add_node(Node::component("c_direct", "Modem", Component::default()))
            .unwrap();
        g.add_node(Node::component("c_cn_chip", "Chip CN", chip.clone())).unwrap();
        g.add_node(Node::component("c_vn_chip", "Chip VN", chip)).unwrap();

        g.add_node(Node::tariff_rule(
            "r_direct",
            "Section 301",
            TariffRule {
                rate: 25.0,
                ..Default::default()
            },
        ))
        .unwrap();
        g.add_node(Node::tariff_rule(
            "r_chips_cn",
            "Chips from China",
            TariffRule {
                rate: 10.0,
                category: Some("semiconductor".into()),
                origin: Some(NodeId::new("cn")),
                ..Default::default()
            },
        ))
        .unwrap();
        g.add_node(Node::tariff_rule(
            "r_inactive",
            "Expired",
            TariffRule {
                rate: 50.0,
                active: false,
                category: Some("semiconductor".into()),
                ..Default::default()
            },
        ))
        .unwrap();

        g.create_edge("c_direct", "r_direct", EdgeType::SubjectToTariff).unwrap();
        g.create_edge("c_direct", "r_inactive", EdgeType::SubjectToTariff).unwrap();
        g.create_edge("c_cn_chip", "cn", EdgeType::ManufacturedIn).unwrap();
        g.create_edge("c_vn_chip", "vn", EdgeType::ManufacturedIn).unwrap();
        g.create_edge("c_direct", "p1", EdgeType::UsedIn).unwrap();
        g
    }

    #[test]
    fn test_direct_and_category_links() {
        let g = graph();
        let scope = resolve(&g, &Scope::All).unwrap();
        let exposures = tariff_vulnerabilities(&g, &scope);

        assert_eq!(exposures.len(), 2);

        let direct = &exposures[0];
        assert_eq!(direct.component, NodeId::new("c_direct"));
        assert_eq!(direct.rules.len(), 1, "inactive rule must be ignored");
        assert_eq!(direct.max_rate(), 25.0);
        assert_eq!(direct.top_rule().unwrap().link, TariffLink::Direct);
        assert_eq!(direct.products, vec![NodeId::new("p1")]);

        let chip = &exposures[1];
        assert_eq!(chip.component, NodeId::new("c_cn_chip"));
        assert_eq!(chip.top_rule().unwrap().link, TariffLink::Category);
    }

    #[test]
    fn test_all_rules_include_inactive() {
        let g = graph();
        let node = g.get_node(&NodeId::new("c_direct")).unwrap();
        let all_hits = all_rules_for(&g, node);
        let all: Vec<&str> = all_hits.iter().map(|h| h.rule.as_str()).collect();
        assert_eq!(all, vec!["r_inactive", "r_direct"]);
        assert_eq!(rules_for(&g, node).len(), 1);
    }

    #[test]
    fn test_origin_must_match() {
        let g = graph();
        let node = g.get_node(&NodeId::new("c_vn_chip")).unwrap();
        assert!(rules_for(&g, node).is_empty());
    }
}
