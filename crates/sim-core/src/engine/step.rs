use std::collections::{BTreeMap, VecDeque};

use contracts::{PendingDelayedEffect, SimulationState};

use super::ScenarioEngine;
use crate::saturation::saturate;

/// Changes smaller than this are not propagated through the graph.
const PROPAGATION_THRESHOLD: f64 = 0.1;

impl ScenarioEngine {
    /// One Year[k] -> Year[k+1] transition, operating on a clone of the
    /// current state. Fixed order: direct impact, delayed-effect resolution,
    /// graph propagation, feedback, bounds clamp.
    pub(super) fn simulate_year(
        &self,
        current: &SimulationState,
        year: u32,
        direct_impacts: &BTreeMap<String, f64>,
        history: &[SimulationState],
    ) -> SimulationState {
        let mut next = current.clone();
        next.year = year;

        let mut tally = BTreeMap::<String, f64>::new();
        let effectiveness = self.constraints.total_effectiveness();

        // 1. Direct project impact, constrained then saturated.
        for (indicator, base_impact) in direct_impacts {
            let applied = self.apply_saturated(&mut next, indicator, base_impact * effectiveness);
            *tally.entry(indicator.clone()).or_insert(0.0) += applied;
        }

        // 2. Delayed effects due this year fire and are dropped; the rest
        // tick down by one.
        let mut still_pending = Vec::new();
        for effect in std::mem::take(&mut next.delayed_effects) {
            if effect.years_remaining <= 1 {
                let applied = self.apply_saturated(&mut next, &effect.target, effect.magnitude);
                *tally.entry(effect.target).or_insert(0.0) += applied;
            } else {
                still_pending.push(PendingDelayedEffect {
                    years_remaining: effect.years_remaining - 1,
                    ..effect
                });
            }
        }
        next.delayed_effects = still_pending;

        // 3. Graph propagation. Zero-delay edges apply immediately and their
        // targets re-enter the worklist, so chains of immediate edges cascade
        // within the same year; delayed edges enqueue a pending effect.
        let mut worklist = tally
            .iter()
            .map(|(indicator, change)| (indicator.clone(), *change))
            .collect::<VecDeque<_>>();
        while let Some((indicator, change)) = worklist.pop_front() {
            if change.abs() < PROPAGATION_THRESHOLD {
                continue;
            }
            for influence in self.graph.influences_from(&indicator) {
                let indirect = change * influence.weight;
                if influence.delay_years > 0 {
                    next.delayed_effects.push(PendingDelayedEffect {
                        target: influence.target.clone(),
                        magnitude: indirect,
                        years_remaining: influence.delay_years,
                    });
                } else {
                    let applied = self.apply_saturated(&mut next, &influence.target, indirect);
                    if applied != 0.0 {
                        *tally.entry(influence.target.clone()).or_insert(0.0) += applied;
                        worklist.push_back((influence.target.clone(), applied));
                    }
                }
            }
        }

        // 4. Feedback against the recorded history. The model itself returns
        // nothing until two prior states exist.
        let feedback_effects = self.feedback.compute_effects(&next, history);
        for (indicator, effect) in feedback_effects {
            self.apply_saturated(&mut next, &indicator, effect);
        }

        // 5. Unconditional clamp, even though every step already saturates.
        for (key, value) in next.indicators.iter_mut() {
            if let Some(info) = self.graph.info(key) {
                *value = value.clamp(info.min, info.max);
            }
        }

        next
    }

    /// Saturates a proposed change against the indicator's bounds and applies
    /// it, returning the change actually made. Unknown indicators are a
    /// silent no-op.
    fn apply_saturated(&self, state: &mut SimulationState, indicator: &str, proposed: f64) -> f64 {
        let Some(info) = self.graph.info(indicator) else {
            return 0.0;
        };
        let current = state.value(indicator);
        let applied = saturate(current, proposed, info.max, info.min);
        if applied != 0.0 {
            state
                .indicators
                .insert(indicator.to_string(), current + applied);
        }
        applied
    }
}
