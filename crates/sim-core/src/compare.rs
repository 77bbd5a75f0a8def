//! Single-run and batch entry points. A batch runs every scenario kind
//! against the same targets and timeline, each with its own derived seed, in
//! parallel, and ranks the outcomes by net progress.

use contracts::{
    RunResult, ScenarioComparison, ScenarioConfig, ScenarioKind, ScenarioOutcome,
};
use rayon::prelude::*;

use crate::engine::ScenarioEngine;
use crate::explain::{ExplainError, Explainer};
use crate::graph::IndicatorGraph;
use crate::sampler::SeedSampler;

/// Runs one scenario end to end: trajectory plus summary, in the shape
/// downstream consumers persist.
pub fn run_scenario(
    graph: &IndicatorGraph,
    config: ScenarioConfig,
) -> Result<RunResult, ExplainError> {
    let mut engine = ScenarioEngine::new(graph.clone(), config.clone());
    engine.run();
    let explainer = Explainer::new(
        engine.graph(),
        engine.states(),
        engine.constraints(),
        &config.target_sdgs,
    )?;
    let summary = explainer.summary();
    Ok(RunResult {
        schema_version: config.schema_version.clone(),
        run_id: config.run_id.clone(),
        yearly_states: engine.states().to_vec(),
        summary,
        config,
    })
}

/// Runs all five scenario kinds under the base config's targets and
/// timeline, ranked best first by net progress.
///
/// Each scenario gets preset funding and delay: 50% funding when
/// underfunded, a 12-month delay when delayed, full funding and no delay
/// otherwise. Seeds are derived per scenario from the base seed, so the
/// whole batch is reproducible while no two scenarios share draws.
pub fn compare_scenarios(
    graph: &IndicatorGraph,
    base: &ScenarioConfig,
) -> Result<ScenarioComparison, ExplainError> {
    let base_sampler = SeedSampler::new(base.seed);

    let mut scenarios = ScenarioKind::ALL
        .into_par_iter()
        .enumerate()
        .map(|(position, kind)| -> Result<ScenarioOutcome, ExplainError> {
            let config = scenario_preset(base, kind, base_sampler.derive(position as u64 + 1));
            let result = run_scenario(graph, config)?;
            let final_state = result
                .yearly_states
                .last()
                .map(|state| state.indicators.clone())
                .unwrap_or_default();
            Ok(ScenarioOutcome {
                scenario: kind,
                net_progress: result.summary.net_sdg_progress,
                confidence: result.summary.confidence_score,
                narrative: result.summary.narrative,
                final_state,
            })
        })
        .collect::<Result<Vec<_>, ExplainError>>()?;

    scenarios.sort_by(|a, b| b.net_progress.total_cmp(&a.net_progress));

    Ok(ScenarioComparison {
        schema_version: base.schema_version.clone(),
        target_sdgs: base.target_sdgs.clone(),
        timeline_years: base.timeline_years,
        best_scenario: scenarios[0].scenario,
        worst_scenario: scenarios[scenarios.len() - 1].scenario,
        scenarios,
    })
}

fn scenario_preset(base: &ScenarioConfig, kind: ScenarioKind, sampler: SeedSampler) -> ScenarioConfig {
    let mut config = base.clone();
    config.run_id = format!("{}_{}", base.run_id, kind);
    config.seed = sampler.seed();
    config.scenario = kind;
    config.funding_percentage = match kind {
        ScenarioKind::Underfunded => 50.0,
        _ => 100.0,
    };
    config.delay_months = match kind {
        ScenarioKind::Delay => 12,
        _ => 0,
    };
    config
}
