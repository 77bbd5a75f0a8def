//! Delayed cyclic feedback. Loops are pre-declared finite chains of
//! indicator keys, not graph walks, so no cycle detection is needed. Each
//! loop compounds the historical movement of its chain and deposits the
//! result on the chain's last node.

use std::collections::BTreeMap;
use std::fmt;

use contracts::SimulationState;

use crate::graph::IndicatorGraph;

/// Qualitative tag only; the math is driven entirely by `strength`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    Positive,
    Negative,
    Mixed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackLoop {
    pub name: String,
    pub chain: Vec<String>,
    pub kind: LoopKind,
    pub strength: f64,
    pub delay_years: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    ChainTooShort { loop_name: String },
    UnknownChainIndicator { loop_name: String, indicator: String },
}

impl fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackError::ChainTooShort { loop_name } => {
                write!(f, "feedback loop {loop_name} needs a chain of at least 2 indicators")
            }
            FeedbackError::UnknownChainIndicator {
                loop_name,
                indicator,
            } => {
                write!(f, "feedback loop {loop_name} references unknown indicator: {indicator}")
            }
        }
    }
}

impl std::error::Error for FeedbackError {}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackModel {
    loops: Vec<FeedbackLoop>,
}

impl FeedbackModel {
    /// The built-in loop table matching the default SDG catalogue.
    pub fn standard() -> Self {
        Self {
            loops: default_loops(),
        }
    }

    /// No feedback at all; useful for reduced catalogues and tests.
    pub fn disabled() -> Self {
        Self { loops: Vec::new() }
    }

    /// Builds a model from custom loops, rejecting chains that reference
    /// indicators missing from the graph.
    pub fn from_loops(
        graph: &IndicatorGraph,
        loops: Vec<FeedbackLoop>,
    ) -> Result<Self, FeedbackError> {
        for feedback_loop in &loops {
            if feedback_loop.chain.len() < 2 {
                return Err(FeedbackError::ChainTooShort {
                    loop_name: feedback_loop.name.clone(),
                });
            }
            for indicator in &feedback_loop.chain {
                if graph.info(indicator).is_none() {
                    return Err(FeedbackError::UnknownChainIndicator {
                        loop_name: feedback_loop.name.clone(),
                        indicator: indicator.clone(),
                    });
                }
            }
        }
        Ok(Self { loops })
    }

    pub fn loops(&self) -> &[FeedbackLoop] {
        &self.loops
    }

    /// Additive per-indicator effects derived from historical co-movement.
    ///
    /// Requires at least two prior states; with a shorter history than a
    /// loop's delay the earliest recorded state stands in for the missing
    /// one. Effects from loops sharing a target accumulate; saturation and
    /// clamping are the engine's job.
    pub fn compute_effects(
        &self,
        state: &SimulationState,
        history: &[SimulationState],
    ) -> BTreeMap<String, f64> {
        let mut effects = BTreeMap::new();

        if history.len() < 2 {
            return effects;
        }

        for feedback_loop in &self.loops {
            let delay = feedback_loop.delay_years as usize;
            let historical = if delay > 0 && history.len() >= delay {
                &history[history.len() - delay]
            } else {
                &history[0]
            };

            let mut chain_strength = 1.0;
            for indicator in &feedback_loop.chain[..feedback_loop.chain.len() - 1] {
                let change = (state.value(indicator) - historical.value(indicator)) / 100.0;
                chain_strength *= 1.0 + change * feedback_loop.strength;
            }

            if let Some(target) = feedback_loop.chain.last() {
                let effect = (chain_strength - 1.0) * 100.0 * feedback_loop.strength;
                *effects.entry(target.clone()).or_insert(0.0) += effect;
            }
        }

        effects
    }
}

fn feedback_loop(
    name: &str,
    chain: &[&str],
    kind: LoopKind,
    strength: f64,
    delay_years: u32,
    description: &str,
) -> FeedbackLoop {
    FeedbackLoop {
        name: name.to_string(),
        chain: chain.iter().map(|key| key.to_string()).collect(),
        kind,
        strength,
        delay_years,
        description: description.to_string(),
    }
}

fn default_loops() -> Vec<FeedbackLoop> {
    vec![
        feedback_loop(
            "Education-Employment-Revenue Loop",
            &["education_index", "employment_rate", "governance_index", "education_index"],
            LoopKind::Positive,
            0.15,
            2,
            "Better education raises employment and tax revenue, funding more education",
        ),
        feedback_loop(
            "Industrial-Emissions-Health Loop",
            &["innovation_index", "emissions_reduction", "health_index", "employment_rate"],
            LoopKind::Mixed,
            -0.10,
            3,
            "Industrial growth can increase emissions, reducing health and productivity",
        ),
        feedback_loop(
            "Poverty-Health-Employment Trap",
            &["poverty_rate", "health_index", "employment_rate", "poverty_rate"],
            LoopKind::Negative,
            -0.12,
            1,
            "Poverty reduces health access, limiting employment, perpetuating poverty",
        ),
        feedback_loop(
            "Clean Energy Innovation Loop",
            &["clean_energy", "innovation_index", "employment_rate", "clean_energy"],
            LoopKind::Positive,
            0.18,
            2,
            "Clean energy drives innovation and jobs, enabling more clean energy investment",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn state(year: u32, values: &[(&str, f64)]) -> SimulationState {
        SimulationState {
            year,
            indicators: values
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
            delayed_effects: Vec::new(),
        }
    }

    fn single_loop(strength: f64, delay_years: u32) -> FeedbackModel {
        FeedbackModel {
            loops: vec![feedback_loop(
                "Test Loop",
                &["a", "b", "c"],
                LoopKind::Positive,
                strength,
                delay_years,
                "a lifts b lifts c",
            )],
        }
    }

    #[test]
    fn standard_loops_reference_only_catalogue_indicators() {
        let graph = IndicatorGraph::sdg_default();
        let model = FeedbackModel::from_loops(&graph, default_loops())
            .expect("standard loops are consistent with the default catalogue");
        assert_eq!(model.loops().len(), 4);
    }

    #[test]
    fn short_history_yields_no_effects() {
        let model = single_loop(0.2, 1);
        let current = state(1, &[("a", 60.0), ("b", 60.0), ("c", 60.0)]);
        let history = vec![state(0, &[("a", 50.0), ("b", 50.0), ("c", 50.0)])];
        assert!(model.compute_effects(&current, &history).is_empty());
    }

    #[test]
    fn effect_lands_on_last_chain_node_only() {
        let model = single_loop(0.2, 1);
        let history = vec![
            state(0, &[("a", 50.0), ("b", 50.0), ("c", 50.0)]),
            state(1, &[("a", 55.0), ("b", 55.0), ("c", 55.0)]),
        ];
        let current = state(2, &[("a", 60.0), ("b", 60.0), ("c", 60.0)]);
        let effects = model.compute_effects(&current, &history);

        // delay 1 compares against the most recent state: +5 on a and b.
        let change = 5.0 / 100.0;
        let chain_strength = (1.0 + change * 0.2) * (1.0 + change * 0.2);
        let expected = (chain_strength - 1.0) * 100.0 * 0.2;

        assert_eq!(effects.len(), 1);
        assert!((effects["c"] - expected).abs() < 1e-12);
    }

    #[test]
    fn delay_beyond_history_falls_back_to_earliest_state() {
        let model = single_loop(0.2, 5);
        let history = vec![
            state(0, &[("a", 40.0), ("b", 40.0), ("c", 40.0)]),
            state(1, &[("a", 55.0), ("b", 55.0), ("c", 55.0)]),
        ];
        let current = state(2, &[("a", 60.0), ("b", 60.0), ("c", 60.0)]);
        let effects = model.compute_effects(&current, &history);

        // Earliest state is the comparison point: +20 on a and b.
        let change = 20.0 / 100.0;
        let chain_strength = (1.0 + change * 0.2) * (1.0 + change * 0.2);
        let expected = (chain_strength - 1.0) * 100.0 * 0.2;
        assert!((effects["c"] - expected).abs() < 1e-12);
    }

    #[test]
    fn loops_sharing_a_target_accumulate_additively() {
        let mut model = single_loop(0.2, 1);
        model.loops.push(feedback_loop(
            "Second Loop",
            &["b", "c"],
            LoopKind::Positive,
            0.3,
            1,
            "b lifts c",
        ));
        let history = vec![
            state(0, &[("a", 50.0), ("b", 50.0), ("c", 50.0)]),
            state(1, &[("a", 50.0), ("b", 50.0), ("c", 50.0)]),
        ];
        let current = state(2, &[("a", 60.0), ("b", 60.0), ("c", 60.0)]);
        let effects = model.compute_effects(&current, &history);

        let first = {
            let change = 10.0 / 100.0;
            let chain = (1.0 + change * 0.2) * (1.0 + change * 0.2);
            (chain - 1.0) * 100.0 * 0.2
        };
        let second = {
            let change = 10.0 / 100.0;
            let chain = 1.0 + change * 0.3;
            (chain - 1.0) * 100.0 * 0.3
        };
        assert!((effects["c"] - (first + second)).abs() < 1e-12);
    }

    #[test]
    fn negative_strength_produces_damping_effect() {
        let model = single_loop(-0.12, 1);
        let history = vec![
            state(0, &[("a", 50.0), ("b", 50.0), ("c", 50.0)]),
            state(1, &[("a", 50.0), ("b", 50.0), ("c", 50.0)]),
        ];
        let current = state(2, &[("a", 60.0), ("b", 60.0), ("c", 60.0)]);
        let effects = model.compute_effects(&current, &history);
        // chain_strength dips below 1 and the final multiplier is negative,
        // so the two sign flips land a small positive correction here.
        let change = 10.0 / 100.0;
        let chain = (1.0 + change * -0.12) * (1.0 + change * -0.12);
        let expected = (chain - 1.0) * 100.0 * -0.12;
        assert!((effects["c"] - expected).abs() < 1e-12);
        assert!(expected > 0.0);
    }

    #[test]
    fn from_loops_rejects_unknown_chain_indicator() {
        let graph = IndicatorGraph::sdg_default();
        let bad = vec![feedback_loop(
            "Broken Loop",
            &["education_index", "no_such_indicator"],
            LoopKind::Positive,
            0.1,
            1,
            "chain with a typo",
        )];
        let err = FeedbackModel::from_loops(&graph, bad).expect_err("typo must fail");
        assert_eq!(
            err,
            FeedbackError::UnknownChainIndicator {
                loop_name: "Broken Loop".to_string(),
                indicator: "no_such_indicator".to_string(),
            }
        );
    }

    #[test]
    fn from_loops_rejects_single_node_chain() {
        let graph = IndicatorGraph::sdg_default();
        let bad = vec![feedback_loop(
            "Degenerate Loop",
            &["education_index"],
            LoopKind::Positive,
            0.1,
            1,
            "one node is not a loop",
        )];
        assert!(matches!(
            FeedbackModel::from_loops(&graph, bad),
            Err(FeedbackError::ChainTooShort { .. })
        ));
    }

    #[test]
    fn unknown_chain_values_read_as_zero_at_runtime() {
        // Runtime leniency: a model built without validation still treats
        // missing indicators as zero-valued rather than failing.
        let model = single_loop(0.2, 1);
        let empty = SimulationState {
            year: 2,
            indicators: BTreeMap::new(),
            delayed_effects: Vec::new(),
        };
        let history = vec![empty.clone(), empty.clone()];
        let effects = model.compute_effects(&empty, &history);
        assert_eq!(effects.get("c").copied().unwrap_or(0.0), 0.0);
    }
}
