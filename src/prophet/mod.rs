//! Prophet: scenario modeling and impact prediction
//!
//! - [`scenario`] resolves a what-if request against the graph
//! - [`impact`] propagates the disruption and estimates its downstream impact
//! - [`allocation`] plans supply allocation during shortages
//! - [`recommend`] turns findings and simulated impact into ranked advice
//! - [`alternatives`] suggests substitute components and their sources

pub mod allocation;
pub mod alternatives;
pub mod impact;
pub mod recommend;
pub mod scenario;

pub use allocation::{allocation_plan, AllocationPlan, AllocationTier, ShortageSeverity};
pub use alternatives::{
    find_alternative_sources, AlternativeComponent, AlternativeSources, AlternativesError,
    AlternativesResult, CurrentSupplier,
};
pub use impact::{
    simulate, simulate_combined, AffectedProduct, ImpactError, ImpactEstimate, ImpactResult,
    ImpactSummary, ResilienceImpact, SimulationResult,
};
pub use recommend::{recommend, Priority, Recommendation, RecommendationCategory};
pub use scenario::{
    build_scenario, scenario_from_event, DisruptionLevel, Magnitude, Scenario, ScenarioError,
    ScenarioKind, ScenarioRequest, ScenarioResult, ScenarioTarget, ShortageTarget,
};
