use contracts::{ScenarioConfig, ScenarioKind};
use proptest::prelude::*;
use sim_core::{
    compare_scenarios, run_scenario, ConstraintModel, IndicatorGraph, ScenarioEngine, SeedSampler,
};

fn config(seed: u64, target_sdgs: Vec<u8>, timeline_years: u32) -> ScenarioConfig {
    let mut config = ScenarioConfig::default();
    config.seed = seed;
    config.target_sdgs = target_sdgs;
    config.timeline_years = timeline_years;
    config
}

#[test]
fn run_result_round_trips_through_json() {
    let graph = IndicatorGraph::sdg_default();
    let result = run_scenario(&graph, config(42, vec![3, 4], 4)).expect("run succeeds");

    let encoded = serde_json::to_string(&result).expect("serialize");
    let decoded: contracts::RunResult = serde_json::from_str(&encoded).expect("deserialize");
    assert_eq!(result, decoded);
}

#[test]
fn comparison_round_trips_through_json() {
    let graph = IndicatorGraph::sdg_default();
    let comparison = compare_scenarios(&graph, &config(42, vec![7], 3)).expect("batch succeeds");

    let encoded = serde_json::to_string(&comparison).expect("serialize");
    let decoded: contracts::ScenarioComparison =
        serde_json::from_str(&encoded).expect("deserialize");
    assert_eq!(comparison, decoded);
}

proptest! {
    #[test]
    fn trajectories_are_deterministic_per_seed(
        seed in 1_u64..10_000,
        sdg in 1_u8..=17,
        timeline in 1_u32..8,
    ) {
        let cfg = config(seed, vec![sdg], timeline);
        let mut engine_a = ScenarioEngine::new(IndicatorGraph::sdg_default(), cfg.clone());
        let mut engine_b = ScenarioEngine::new(IndicatorGraph::sdg_default(), cfg);
        prop_assert_eq!(engine_a.run(), engine_b.run());
    }

    #[test]
    fn every_indicator_stays_inside_its_bounds(
        seed in 1_u64..10_000,
        sdg_a in 1_u8..=17,
        sdg_b in 1_u8..=17,
        timeline in 1_u32..10,
    ) {
        let mut engine = ScenarioEngine::new(
            IndicatorGraph::sdg_default(),
            config(seed, vec![sdg_a, sdg_b], timeline),
        );
        let states = engine.run().to_vec();
        for state in &states {
            for indicator in engine.graph().indicators() {
                let value = state.value(&indicator.key);
                prop_assert!(
                    value >= indicator.min && value <= indicator.max,
                    "{} = {} out of bounds at year {}",
                    indicator.key,
                    value,
                    state.year
                );
            }
        }
    }

    #[test]
    fn effectiveness_never_decreases_with_more_funding(
        seed in 1_u64..10_000,
        low in 0.0_f64..100.0,
        extra in 0.0_f64..50.0,
    ) {
        let sampler = SeedSampler::new(seed);
        let lower = ConstraintModel::new(ScenarioKind::PartialSuccess, low, 5, 6, &sampler);
        let higher = ConstraintModel::new(ScenarioKind::PartialSuccess, low + extra, 5, 6, &sampler);
        prop_assert!(higher.total_effectiveness() >= lower.total_effectiveness());
    }

    #[test]
    fn summaries_keep_confidence_in_band(
        seed in 1_u64..10_000,
        sdg in 1_u8..=17,
        timeline in 1_u32..8,
        scenario_idx in 0_usize..5,
    ) {
        let graph = IndicatorGraph::sdg_default();
        let mut cfg = config(seed, vec![sdg], timeline);
        cfg.scenario = ScenarioKind::ALL[scenario_idx];
        let result = run_scenario(&graph, cfg).expect("run succeeds");
        prop_assert!((0.5..=1.0).contains(&result.summary.confidence_score));
        prop_assert!(result.summary.net_sdg_progress.is_finite());
    }

    #[test]
    fn pending_effects_always_target_known_indicators_with_time_left(
        seed in 1_u64..10_000,
        sdg in 1_u8..=17,
        timeline in 1_u32..8,
    ) {
        let mut engine = ScenarioEngine::new(
            IndicatorGraph::sdg_default(),
            config(seed, vec![sdg], timeline),
        );
        let states = engine.run().to_vec();
        for state in &states {
            for effect in &state.delayed_effects {
                prop_assert!(effect.years_remaining >= 1);
                prop_assert!(engine.graph().info(&effect.target).is_some());
            }
        }
    }
}
