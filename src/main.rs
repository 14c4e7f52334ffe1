use anyhow::{Context, Result};
use nova_prophet::graph::{
    Company, Component, ComplexityTier, Country, DisruptionEvent, EdgeType, EventType, GraphStore,
    Node, NodeId, NodeKind, Product, SeverityTier, TariffRule,
};
use nova_prophet::prophet::{
    build_scenario, find_alternative_sources, recommend, scenario_from_event, simulate,
    simulate_combined, DisruptionLevel, ImpactResult, ScenarioRequest, ShortageTarget,
};
use nova_prophet::veritas::{
    analyze, category_dependency, compare_regions, shortage_risk_report, supplier_insights, Scope,
};
use nova_prophet::ProphetConfig;

/// Tuning for the walkthrough; anything omitted keeps its default
const DEMO_CONFIG: &str = r#"
analysis:
  criticality_threshold: 0.7
  geo_high_risk_threshold: 0.15
impact:
  decay: 0.7
  floor: 0.05
  max_depth: 4
  critical_path_multiplier: 1.5
"#;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Nova Prophet v{}", nova_prophet::version());
    println!("==========================================");
    println!();

    let config =
        ProphetConfig::from_yaml_str(DEMO_CONFIG).context("parsing demo configuration")?;

    let graph = sample_graph()?;
    let stats = graph.statistics();
    println!(
        "✓ Loaded sample graph: {} nodes, {} edges",
        stats.node_count, stats.edge_count
    );

    // Demo 1: Truth analysis
    println!("\n=== Demo 1: Veritas Analysis ===");
    let report = analyze(&graph, &Scope::company("acme"), &config.analysis)?;
    println!(
        "Scope: {} components, {} products",
        report.component_count, report.product_count
    );
    println!("Resilience score: {:.1}", report.resilience.score);
    for finding in &report.findings {
        println!("  [{}] {}", finding.level, finding.message);
    }
    for warning in &report.warnings {
        println!("  [warning] {}", warning.message);
    }

    let regions = compare_regions(&graph, &config.analysis);
    if let Some(top) = regions.regions.first() {
        println!(
            "Highest-risk region: {} (score {:.1}, {})",
            top.region, top.risk_score, top.risk_level
        );
    }

    let insights = supplier_insights(&graph, &config.analysis, 3);
    for supplier in &insights.top_suppliers {
        println!(
            "Supplier {}: {} components ({} critical), importance {:.2}, {} dependency",
            supplier.name,
            supplier.component_count,
            supplier.critical_component_count,
            supplier.importance,
            supplier.risk_level
        );
    }

    let semis = category_dependency(&graph, "semiconductor", &config.analysis);
    println!(
        "Semiconductor dependency: {} products, {} manufacturers, score {:.1} ({})",
        semis.affected_products.len(),
        semis.manufacturer_count,
        semis.dependency_score,
        semis.dependency_level
    );
    let shortage = shortage_risk_report(&graph, &config.analysis);
    println!(
        "Shortage risk: {} categories scored, {:.1}% of components critical",
        shortage.categories.len(),
        shortage.critical_component_pct
    );

    let sourcing = find_alternative_sources(&graph, &NodeId::new("oled"), 3)?;
    for alternative in &sourcing.alternatives {
        println!(
            "Alternative to {}: {} (similarity {:.2})",
            sourcing.name, alternative.name, alternative.similarity
        );
    }

    // Demo 2: Scenarios
    println!("\n=== Demo 2: Scenario Simulation ===");
    let requests = vec![
        ScenarioRequest::SupplierDisruption {
            supplier: NodeId::new("foundry"),
            level: DisruptionLevel::Complete,
            duration_months: 3.0,
        },
        ScenarioRequest::TariffChange {
            origin: NodeId::new("china"),
            destination: NodeId::new("usa"),
            category: Some("Display".into()),
            rate_delta: 15.0,
        },
        ScenarioRequest::Shortage {
            target: ShortageTarget::Category("semiconductor".into()),
            available_fraction: 0.5,
            duration_months: 6.0,
        },
    ];

    let mut scenarios = Vec::new();
    for request in requests {
        let scenario = build_scenario(&graph, request)?;
        let impact = simulate(&graph, &scenario, &report, &config.impact)?;
        print_impact(&impact);
        scenarios.push(scenario);
    }

    let event = scenario_from_event(&graph, &NodeId::new("strait_blockade"))?;
    let event_impact = simulate(&graph, &event, &report, &config.impact)?;
    print_impact(&event_impact);
    scenarios.push(event);

    let combined = simulate_combined(&graph, &scenarios, &report, &config.impact)?;
    print_impact(&combined);

    // Demo 3: Recommendations
    println!("\n=== Demo 3: Recommendations ===");
    for rec in recommend(&report, Some(&combined)) {
        println!("  [{:?}] {}: {}", rec.priority, rec.category, rec.rationale);
        for action in &rec.actions {
            println!("      - {}", action);
        }
    }

    println!("\n=== Report (JSON) ===");
    println!("{}", serde_json::to_string_pretty(&report.resilience)?);

    Ok(())
}

fn print_impact(impact: &ImpactResult) {
    println!(
        "✓ {}: {} products, depth {}, {} impact, recovery {:.0} months",
        impact.scenario_id,
        impact.affected_products.len(),
        impact.cascade_depth,
        impact.overall_level,
        impact.recovery_months
    );
    for product in impact.affected_products.iter().take(3) {
        println!(
            "    {} severity {:.2} (hop {}), cost {:+.1}%, availability -{:.1}%, delay {:.1} weeks",
            product.name,
            product.severity,
            product.hop,
            product.estimate.cost_increase_pct,
            product.estimate.availability_loss_pct,
            product.estimate.lead_time_delay_weeks
        );
    }
    if let Some(plan) = &impact.allocation {
        for tier in &plan.tiers {
            println!(
                "    tier {}: {} products at {:.0}% allocation",
                tier.rank,
                tier.products.len(),
                tier.allocation_pct
            );
        }
    }
}

fn sample_graph() -> Result<GraphStore> {
    let mut graph = GraphStore::new();

    let asia = |iso: &str| Country {
        region: Some("Asia".into()),
        iso_code: Some(iso.into()),
    };
    graph.add_node(Node::country("taiwan", "Taiwan", asia("TW")))?;
    graph.add_node(Node::country("china", "China", asia("CN")))?;
    graph.add_node(Node::country("korea", "South Korea", asia("KR")))?;
    graph.add_node(Node::country(
        "usa",
        "United States",
        Country {
            region: Some("North America".into()),
            iso_code: Some("US".into()),
        },
    ))?;

    graph.add_node(Node::new(
        "acme",
        "Acme Devices",
        NodeKind::Company(Company {
            headquarters: Some(NodeId::new("usa")),
        }),
    ))?;
    for (id, name) in [
        ("foundry", "Formosa Foundry"),
        ("panelco", "Panel Co"),
        ("cellworks", "Cell Works"),
        ("memfab", "MemFab"),
    ] {
        graph.add_node(Node::company(id, name))?;
    }

    for (id, name, year, value) in [
        ("phone", "Acme Phone", 2024, 5_000_000.0),
        ("tablet", "Acme Tablet", 2023, 2_000_000.0),
    ] {
        graph.add_node(Node::product(
            id,
            name,
            Product {
                category: Some("Consumer Electronics".into()),
                trade_value: Some(value),
                lead_time_days: Some(56.0),
                release_year: Some(year),
                margin: Some(0.35),
            },
        ))?;
        graph.create_edge(id, "acme", EdgeType::OwnedBy)?;
    }

    let component = |category: &str, complexity: ComplexityTier, bottleneck: bool| Component {
        category: Some(category.into()),
        complexity,
        bottleneck,
        lead_time_days: Some(84.0),
        ..Default::default()
    };
    graph.add_node(Node::component(
        "soc",
        "Application Processor",
        component("Semiconductor", ComplexityTier::VeryHigh, true),
    ))?;
    graph.add_node(Node::component(
        "dram",
        "DRAM",
        component("Semiconductor", ComplexityTier::High, false),
    ))?;
    graph.add_node(Node::component(
        "oled",
        "OLED Panel",
        component("Display", ComplexityTier::High, false),
    ))?;
    graph.add_node(Node::component(
        "battery",
        "Battery Cell",
        component("Battery", ComplexityTier::Medium, false),
    ))?;

    graph.create_edge("foundry", "soc", EdgeType::Supplies)?;
    graph.create_edge_with_share("memfab", "dram", EdgeType::Supplies, 0.7)?;
    graph.create_edge_with_share("foundry", "dram", EdgeType::Supplies, 0.3)?;
    graph.create_edge("panelco", "oled", EdgeType::Supplies)?;
    graph.create_edge("cellworks", "battery", EdgeType::Supplies)?;

    for (component, country) in [
        ("soc", "taiwan"),
        ("dram", "korea"),
        ("oled", "china"),
        ("battery", "china"),
    ] {
        graph.create_edge(component, country, EdgeType::ManufacturedIn)?;
    }
    for component in ["soc", "dram", "oled", "battery"] {
        graph.create_edge(component, "phone", EdgeType::UsedIn)?;
    }
    for component in ["soc", "oled", "battery"] {
        graph.create_edge(component, "tablet", EdgeType::UsedIn)?;
    }

    graph.add_node(Node::tariff_rule(
        "section301",
        "Section 301 Displays",
        TariffRule {
            rate: 25.0,
            category: Some("Display".into()),
            origin: Some(NodeId::new("china")),
            destination: Some(NodeId::new("usa")),
            ..Default::default()
        },
    ))?;

    graph.add_node(Node::disruption_event(
        "strait_blockade",
        "Strait Blockade",
        DisruptionEvent {
            event_type: EventType::Conflict,
            severity: SeverityTier::High,
            duration_months: 6.0,
        },
    ))?;
    graph.create_edge("strait_blockade", "taiwan", EdgeType::Affects)?;

    // A record the ingestion step could not resolve
    graph.insert_edge("unknown_vendor", "battery", EdgeType::Supplies);

    Ok(graph)
}
