//! Invariants checked over a family of generated supply chains

use nova_prophet::config::{AnalysisConfig, ImpactConfig};
use nova_prophet::graph::{
    Component, ComplexityTier, Country, EdgeType, EventType, GraphStore, Node, NodeId, Product,
    SeverityTier,
};
use nova_prophet::prophet::{
    build_scenario, simulate, DisruptionLevel, ScenarioRequest, ShortageTarget,
};
use nova_prophet::veritas::{analyze, FindingKind, Scope};

const EPS: f64 = 1e-9;

/// Deterministic linear congruential generator
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

/// Generated graph; every component is made in exactly one country.
/// Sub-assembly links may form cycles.
fn generated(seed: u64, components: usize) -> GraphStore {
    let mut rng = Lcg(seed);
    let mut g = GraphStore::new();
    let countries = 4;
    let suppliers = 5;
    let products = 4;

    for i in 0..countries {
        g.add_node(Node::country(format!("k{i}"), format!("Country {i}"), Country::default()))
            .unwrap();
    }
    for i in 0..suppliers {
        g.add_node(Node::company(format!("s{i}"), format!("Supplier {i}")))
            .unwrap();
    }
    for i in 0..products {
        g.add_node(Node::product(format!("p{i}"), format!("Product {i}"), Product::default()))
            .unwrap();
    }
    let tiers = [
        ComplexityTier::Low,
        ComplexityTier::Medium,
        ComplexityTier::High,
        ComplexityTier::VeryHigh,
    ];
    for i in 0..components {
        let id = format!("c{i}");
        g.add_node(Node::component(
            id.clone(),
            id.clone(),
            Component {
                complexity: tiers[rng.below(4)],
                bottleneck: rng.below(4) == 0,
                ..Default::default()
            },
        ))
        .unwrap();
        g.create_edge(id.clone(), format!("k{}", rng.below(countries)), EdgeType::ManufacturedIn)
            .unwrap();

        let supplier_count = rng.below(3);
        let first = rng.below(suppliers);
        for k in 0..supplier_count {
            g.create_edge(
                format!("s{}", (first + k) % suppliers),
                id.clone(),
                EdgeType::Supplies,
            )
            .unwrap();
        }
        for _ in 0..=rng.below(2) {
            g.create_edge(id.clone(), format!("p{}", rng.below(products)), EdgeType::UsedIn)
                .unwrap();
        }
    }
    for _ in 0..components / 2 {
        let a = rng.below(components);
        let b = rng.below(components);
        if a != b {
            g.create_edge(format!("c{a}"), format!("c{b}"), EdgeType::UsedIn)
                .unwrap();
        }
    }
    g
}

#[test]
fn test_resilience_bounds_and_monotonicity() {
    let config = AnalysisConfig::default();
    for seed in 0..20 {
        let mut g = generated(seed, 12);
        let before = analyze(&g, &Scope::All, &config).unwrap().resilience.score;
        assert!((0.0..=100.0).contains(&before));

        g.add_node(Node::component("extra", "Extra", Component::default()))
            .unwrap();
        g.create_edge("s0", "extra", EdgeType::Supplies).unwrap();
        g.create_edge("extra", "p0", EdgeType::UsedIn).unwrap();
        g.create_edge("extra", "k0", EdgeType::ManufacturedIn).unwrap();

        let after = analyze(&g, &Scope::All, &config).unwrap().resilience.score;
        assert!((0.0..=100.0).contains(&after));
        assert!(after <= before + EPS, "seed {seed}: {after} > {before}");
    }
}

#[test]
fn test_single_points_match_supplier_counts() {
    let config = AnalysisConfig::default();
    for seed in 0..20 {
        let g = generated(seed, 15);
        let report = analyze(&g, &Scope::All, &config).unwrap();

        for component in g.nodes_of_type(nova_prophet::NodeType::Component) {
            let suppliers = g.suppliers_of(&component.id);
            let finding = report
                .findings_of(FindingKind::SinglePoint)
                .find(|f| f.subject() == Some(&component.id));
            if suppliers.len() == 1 {
                let finding = finding.expect("single-supplier component is reported");
                assert!(finding.concerns(suppliers[0]));
            } else {
                assert!(finding.is_none(), "seed {seed}: {} reported", component.id);
            }
        }
    }
}

#[test]
fn test_geo_shares_sum_to_one() {
    let config = AnalysisConfig::default();
    for seed in 0..10 {
        let g = generated(seed, 10);
        let report = analyze(&g, &Scope::All, &config).unwrap();
        let total: f64 = report.geo_concentration.shares.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < EPS, "seed {seed}: {total}");
    }
}

/// Every what-if kind the generated graphs can express
fn requests() -> Vec<ScenarioRequest> {
    let mut requests = Vec::new();
    for supplier in ["s0", "s3"] {
        requests.push(ScenarioRequest::SupplierDisruption {
            supplier: NodeId::new(supplier),
            level: DisruptionLevel::Complete,
            duration_months: 6.0,
        });
    }
    for severity in [SeverityTier::Low, SeverityTier::Medium, SeverityTier::High] {
        requests.push(ScenarioRequest::GeopoliticalEvent {
            countries: vec![NodeId::new("k0"), NodeId::new("k2")],
            event_type: EventType::Conflict,
            severity,
            duration_months: 4.0,
        });
    }
    requests.push(ScenarioRequest::Shortage {
        target: ShortageTarget::Component(NodeId::new("c1")),
        available_fraction: 0.0,
        duration_months: 6.0,
    });
    requests.push(ScenarioRequest::TariffChange {
        origin: NodeId::new("k1"),
        destination: NodeId::new("k3"),
        category: None,
        rate_delta: 60.0,
    });
    requests
}

#[test]
fn test_propagation_decays_along_every_path() {
    let analysis = AnalysisConfig::default();
    let config = ImpactConfig::default();
    for seed in 0..20 {
        let g = generated(seed, 20);
        let report = analyze(&g, &Scope::All, &analysis).unwrap();

        for request in requests() {
            let kind = request.kind();
            let scenario = build_scenario(&g, request).unwrap();
            let impact = simulate(&g, &scenario, &report, &config).unwrap();

            assert!(impact.cascade_depth <= config.max_depth);
            for trace in &impact.affected_nodes {
                assert!(trace.severity <= 1.0 + EPS);
                assert!(trace.hop <= config.max_depth);
                let Some(via) = &trace.via else {
                    assert_eq!(trace.hop, 0);
                    continue;
                };
                let upstream = impact.severity_of(via);
                assert!(
                    trace.severity <= upstream * config.decay + EPS,
                    "seed {seed}, {kind}: {} at {} exceeds {} at {}",
                    trace.severity,
                    trace.node,
                    upstream,
                    via
                );
            }
        }
    }
}

#[test]
fn test_empty_target_set_yields_empty_result() {
    let g = generated(7, 10);
    let report = analyze(&g, &Scope::All, &AnalysisConfig::default()).unwrap();
    let scenario = build_scenario(
        &g,
        ScenarioRequest::Shortage {
            target: ShortageTarget::Category("no such category".into()),
            available_fraction: 0.2,
            duration_months: 3.0,
        },
    )
    .unwrap();
    assert!(scenario.targets.is_empty());

    let impact = simulate(&g, &scenario, &report, &ImpactConfig::default()).unwrap();
    assert!(impact.affected_products.is_empty());
    assert!(impact.affected_nodes.is_empty());
    assert_eq!(impact.cascade_depth, 0);
}
