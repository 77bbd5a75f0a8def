//! Year-by-year state-transition orchestrator. One engine instance owns one
//! run: its graph, its constraint and feedback models, its sampler, and the
//! append-only state history it produces.

mod step;

use std::collections::BTreeMap;

use contracts::{ScenarioConfig, SimulationState};

use crate::constraint::ConstraintModel;
use crate::feedback::FeedbackModel;
use crate::graph::IndicatorGraph;
use crate::sampler::{stable_key_hash, SeedSampler};

const DIRECT_IMPACT_MIN: f64 = 8.0;
const DIRECT_IMPACT_MAX: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    graph: IndicatorGraph,
    config: ScenarioConfig,
    constraints: ConstraintModel,
    feedback: FeedbackModel,
    sampler: SeedSampler,
    states: Vec<SimulationState>,
}

impl ScenarioEngine {
    pub fn new(graph: IndicatorGraph, config: ScenarioConfig) -> Self {
        Self::with_feedback(graph, FeedbackModel::standard(), config)
    }

    pub fn with_feedback(
        graph: IndicatorGraph,
        feedback: FeedbackModel,
        config: ScenarioConfig,
    ) -> Self {
        let sampler = SeedSampler::new(config.seed);
        let constraints = ConstraintModel::new(
            config.scenario,
            config.funding_percentage,
            config.timeline_years,
            config.delay_months,
            &sampler,
        );
        Self {
            graph,
            config,
            constraints,
            feedback,
            sampler,
            states: Vec::new(),
        }
    }

    pub fn graph(&self) -> &IndicatorGraph {
        &self.graph
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn constraints(&self) -> &ConstraintModel {
        &self.constraints
    }

    /// The trajectory produced by the last [`run`](Self::run); empty before.
    pub fn states(&self) -> &[SimulationState] {
        &self.states
    }

    /// Year-0 state: catalogue baselines, with any configured overrides for
    /// registered indicators. Override keys that match nothing are ignored.
    pub fn baseline_state(&self) -> SimulationState {
        let indicators = self
            .graph
            .indicators()
            .iter()
            .map(|indicator| {
                let value = self
                    .config
                    .baseline_overrides
                    .get(&indicator.key)
                    .copied()
                    .unwrap_or(indicator.baseline);
                (indicator.key.clone(), value)
            })
            .collect::<BTreeMap<_, _>>();

        SimulationState {
            year: 0,
            indicators,
            delayed_effects: Vec::new(),
        }
    }

    /// Base potential change per indicator tagged to a target SDG, sampled
    /// once per run and re-applied identically every year (sustained annual
    /// investment). Targeting the same SDG twice accumulates.
    pub fn direct_impact(&self) -> BTreeMap<String, f64> {
        let mut impacts = BTreeMap::new();
        for sdg in &self.config.target_sdgs {
            for indicator in self.graph.indicators_for_goal(*sdg) {
                let base =
                    self.sampler
                        .uniform(stable_key_hash(&indicator), DIRECT_IMPACT_MIN, DIRECT_IMPACT_MAX);
                *impacts.entry(indicator).or_insert(0.0) += base;
            }
        }
        impacts
    }

    /// Runs the full simulation, replacing any previous history. Returns the
    /// trajectory: years 0..=timeline_years, in order.
    pub fn run(&mut self) -> &[SimulationState] {
        let direct_impacts = self.direct_impact();
        let mut states = Vec::with_capacity(self.config.timeline_years as usize + 1);
        states.push(self.baseline_state());

        for year in 1..=self.config.timeline_years {
            let next = self.simulate_year(&states[states.len() - 1], year, &direct_impacts, &states);
            states.push(next);
        }

        self.states = states;
        &self.states
    }
}
