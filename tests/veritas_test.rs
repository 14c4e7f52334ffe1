use nova_prophet::config::{AnalysisConfig, ProphetConfig};
use nova_prophet::graph::{Component, Country, EdgeType, GraphStore, Node, NodeId, Product};
use nova_prophet::veritas::{
    analyze, analyze_many, compare_regions, country_risk, FindingKind, RiskLevel, Scope,
};

fn multi_country_graph() -> GraphStore {
    let mut g = GraphStore::new();
    for (id, name, region) in [
        ("tw", "Taiwan", "Asia"),
        ("kr", "South Korea", "Asia"),
        ("de", "Germany", "Europe"),
    ] {
        g.add_node(Node::country(
            id,
            name,
            Country {
                region: Some(region.into()),
                iso_code: None,
            },
        ))
        .unwrap();
    }
    g.add_node(Node::company("acme", "Acme")).unwrap();
    g.add_node(Node::company("globex", "Globex")).unwrap();
    for i in 0..3 {
        g.add_node(Node::company(format!("s{i}"), format!("Supplier {i}")))
            .unwrap();
    }
    g.add_node(Node::product("phone", "Phone", Product::default())).unwrap();
    g.add_node(Node::product("car", "Car", Product::default())).unwrap();
    g.create_edge("phone", "acme", EdgeType::OwnedBy).unwrap();
    g.create_edge("car", "globex", EdgeType::OwnedBy).unwrap();

    for (id, country) in [("chip", "tw"), ("memory", "kr"), ("sensor", "tw"), ("motor", "de")] {
        g.add_node(Node::component(id, id, Component::default())).unwrap();
        g.create_edge(id, country, EdgeType::ManufacturedIn).unwrap();
    }
    // chip has two suppliers; everything else is single sourced
    g.create_edge("s0", "chip", EdgeType::Supplies).unwrap();
    g.create_edge("s1", "chip", EdgeType::Supplies).unwrap();
    g.create_edge("s1", "memory", EdgeType::Supplies).unwrap();
    g.create_edge("s2", "sensor", EdgeType::Supplies).unwrap();
    g.create_edge("s2", "motor", EdgeType::Supplies).unwrap();

    for component in ["chip", "memory"] {
        g.create_edge(component, "phone", EdgeType::UsedIn).unwrap();
    }
    for component in ["chip", "sensor", "motor"] {
        g.create_edge(component, "car", EdgeType::UsedIn).unwrap();
    }
    g
}

#[test]
fn test_single_points_name_sole_supplier() {
    let g = multi_country_graph();
    let report = analyze(&g, &Scope::All, &AnalysisConfig::default()).unwrap();

    let spofs: Vec<(&str, &str)> = report
        .single_points
        .iter()
        .map(|s| (s.component.as_str(), s.supplier.as_str()))
        .collect();
    assert!(spofs.contains(&("memory", "s1")));
    assert!(spofs.contains(&("sensor", "s2")));
    assert!(spofs.contains(&("motor", "s2")));
    assert!(!spofs.iter().any(|(c, _)| *c == "chip"));

    let chip = NodeId::new("chip");
    assert!(!report
        .findings_of(FindingKind::SinglePoint)
        .any(|f| f.subject() == Some(&chip)));
}

#[test]
fn test_geo_shares_sum_to_one() {
    let g = multi_country_graph();
    let report = analyze(&g, &Scope::All, &AnalysisConfig::default()).unwrap();
    let geo = &report.geo_concentration;

    let total: f64 = geo.shares.iter().map(|s| s.share).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(geo.shares[0].country, NodeId::new("tw"));
    assert!((geo.top_share() - 0.5).abs() < 1e-9);
    assert!(!geo.high_risk.is_empty());
}

#[test]
fn test_empty_graph_is_fully_resilient() {
    let g = GraphStore::new();
    let report = analyze(&g, &Scope::All, &AnalysisConfig::default()).unwrap();
    assert!(report.findings.is_empty());
    assert_eq!(report.resilience.score, 100.0);
    assert!(report.geo_concentration.shares.is_empty());
}

#[test]
fn test_analyze_many_matches_sequential() {
    let g = multi_country_graph();
    let config = AnalysisConfig::default();
    let scopes = vec![
        Scope::All,
        Scope::company("acme"),
        Scope::company("globex"),
        Scope::company("missing"),
    ];

    let reports = analyze_many(&g, &scopes, &config);
    assert_eq!(reports.len(), 4);
    for (scope, result) in scopes.iter().zip(&reports) {
        match (analyze(&g, scope, &config), result) {
            (Ok(expected), Ok(actual)) => {
                assert_eq!(expected.component_count, actual.component_count);
                assert_eq!(expected.findings, actual.findings);
            }
            (Err(_), Err(_)) => {}
            _ => panic!("parallel and sequential analysis disagree for {:?}", scope),
        }
    }

    let acme = reports[1].as_ref().unwrap();
    assert_eq!(acme.component_count, 2);
    assert_eq!(acme.product_count, 1);
}

#[test]
fn test_inconsistent_edges_become_warnings() {
    let mut g = multi_country_graph();
    g.insert_edge("ghost", "chip", EdgeType::Supplies);
    g.insert_edge("chip", "de", EdgeType::UsedIn);

    let report = analyze(&g, &Scope::All, &AnalysisConfig::default()).unwrap();
    assert_eq!(report.warnings.len(), 2);
    assert!(report
        .warnings
        .iter()
        .all(|w| w.kind == FindingKind::GraphInconsistency));

    // Dangling suppliers do not count as suppliers
    let chip = NodeId::new("chip");
    assert!(!report.single_points.iter().any(|s| s.component == chip));
}

#[test]
fn test_country_and_region_risk() {
    let g = multi_country_graph();
    let config = AnalysisConfig::default();

    let taiwan = country_risk(&g, &NodeId::new("tw"), &config).unwrap();
    assert_eq!(taiwan.components.len(), 2);
    assert!(taiwan.risk_score > 0.0 && taiwan.risk_score <= 100.0);
    assert!(country_risk(&g, &NodeId::new("chip"), &config).is_err());

    let comparison = compare_regions(&g, &config);
    assert_eq!(comparison.highest_concentration.as_deref(), Some("Asia"));
    assert_eq!(comparison.lowest_concentration.as_deref(), Some("Europe"));
    let asia = comparison
        .regions
        .iter()
        .find(|r| r.region == "Asia")
        .unwrap();
    assert!((asia.concentration - 0.75).abs() < 1e-9);
    assert!(asia.risk_level >= RiskLevel::Low);
}

#[test]
fn test_config_overrides_from_yaml() {
    let config = ProphetConfig::from_yaml_str(
        "analysis:\n  criticality_threshold: 0.5\nimpact:\n  decay: 0.5\n  max_depth: 2\n",
    )
    .unwrap();
    assert_eq!(config.analysis.criticality_threshold, 0.5);
    assert_eq!(config.analysis.supplier_weight, 0.4);
    assert_eq!(config.impact.max_depth, 2);

    // Lower threshold turns the single-sourced components critical
    let g = multi_country_graph();
    let report = analyze(&g, &Scope::All, &config.analysis).unwrap();
    assert!(report.is_critical(&NodeId::new("memory")));

    let invalid = ProphetConfig::from_yaml_str("impact:\n  decay: 1.5\n");
    assert!(invalid.is_err());
}
