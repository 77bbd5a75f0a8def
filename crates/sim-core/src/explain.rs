//! Post-hoc explainability over a completed trajectory: change rankings,
//! bottleneck diagnosis, risks, recommendations, a confidence score, and a
//! short narrative. Pure analysis; never mutates the trajectory.

use std::collections::BTreeSet;
use std::fmt;

use contracts::{Bottleneck, SimulationState, SummaryResult, TopChange};

use crate::constraint::ConstraintModel;
use crate::graph::IndicatorGraph;

/// Indicators that get called out when they stagnate while being targeted.
const CRITICAL_WATCH_LIST: [&str; 4] = [
    "health_index",
    "poverty_rate",
    "water_access",
    "food_security",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    SignificantIncrease,
    ModerateIncrease,
    SignificantDecrease,
    ModerateDecrease,
    Stable,
}

impl Trend {
    fn classify(pct_change: f64) -> Trend {
        if pct_change > 5.0 {
            Trend::SignificantIncrease
        } else if pct_change > 1.0 {
            Trend::ModerateIncrease
        } else if pct_change < -5.0 {
            Trend::SignificantDecrease
        } else if pct_change < -1.0 {
            Trend::ModerateDecrease
        } else {
            Trend::Stable
        }
    }

    fn is_decline(&self) -> bool {
        matches!(self, Trend::SignificantDecrease | Trend::ModerateDecrease)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeAnalysis {
    pub key: String,
    pub baseline: f64,
    pub final_value: f64,
    pub change: f64,
    pub pct_change: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainError {
    EmptyTrajectory,
}

impl fmt::Display for ExplainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplainError::EmptyTrajectory => {
                f.write_str("cannot explain an empty trajectory")
            }
        }
    }
}

impl std::error::Error for ExplainError {}

pub struct Explainer<'a> {
    graph: &'a IndicatorGraph,
    states: &'a [SimulationState],
    constraints: &'a ConstraintModel,
    target_sdgs: &'a [u8],
}

impl<'a> Explainer<'a> {
    pub fn new(
        graph: &'a IndicatorGraph,
        states: &'a [SimulationState],
        constraints: &'a ConstraintModel,
        target_sdgs: &'a [u8],
    ) -> Result<Self, ExplainError> {
        if states.is_empty() {
            return Err(ExplainError::EmptyTrajectory);
        }
        Ok(Self {
            graph,
            states,
            constraints,
            target_sdgs,
        })
    }

    /// Per-indicator classification of baseline-to-final change, in
    /// catalogue order. Percent change against a zero baseline is defined
    /// as zero.
    pub fn analyze_changes(&self) -> Vec<ChangeAnalysis> {
        let baseline = &self.states[0];
        let final_state = &self.states[self.states.len() - 1];

        self.graph
            .indicators()
            .iter()
            .map(|indicator| {
                let baseline_value = baseline.value(&indicator.key);
                let final_value = final_state.value(&indicator.key);
                let change = final_value - baseline_value;
                let pct_change = if baseline_value > 0.0 {
                    change / baseline_value * 100.0
                } else {
                    0.0
                };
                ChangeAnalysis {
                    key: indicator.key.clone(),
                    baseline: baseline_value,
                    final_value,
                    change,
                    pct_change,
                    trend: Trend::classify(pct_change),
                }
            })
            .collect()
    }

    /// The `n` largest movers by absolute percent change. Ties keep
    /// catalogue order (the sort is stable).
    pub fn top_changes(&self, n: usize) -> Vec<TopChange> {
        let mut analysis = self.analyze_changes();
        analysis.sort_by(|a, b| b.pct_change.abs().total_cmp(&a.pct_change.abs()));
        analysis.truncate(n);
        analysis
            .into_iter()
            .map(|entry| TopChange {
                indicator: self.display_name(&entry.key),
                baseline: entry.baseline,
                final_value: entry.final_value,
                change: entry.change,
                pct_change: entry.pct_change,
            })
            .collect()
    }

    /// Target-SDG indicators that moved less than 3%, with a diagnosis.
    pub fn bottlenecks(&self) -> Vec<Bottleneck> {
        let analysis = self.analyze_changes();
        let mut bottlenecks = Vec::new();

        for sdg in self.target_sdgs {
            for key in self.graph.indicators_for_goal(*sdg) {
                let Some(entry) = analysis.iter().find(|entry| entry.key == key) else {
                    continue;
                };
                if entry.pct_change < 3.0 {
                    let reason = self.diagnose_bottleneck(entry, &analysis);
                    bottlenecks.push(Bottleneck {
                        indicator: self.display_name(&key),
                        reason,
                    });
                }
            }
        }

        bottlenecks
    }

    /// Diagnosis priority: near ceiling, then weak upstream influencers,
    /// then low overall effectiveness, then a generic saturation message.
    fn diagnose_bottleneck(&self, entry: &ChangeAnalysis, analysis: &[ChangeAnalysis]) -> String {
        if let Some(info) = self.graph.info(&entry.key) {
            if entry.final_value > 0.9 * info.max {
                return format!(
                    "Already near maximum capacity ({:.1}/{:.1})",
                    entry.final_value, info.max
                );
            }
        }

        let weak_supports = self
            .graph
            .influencers_of(&entry.key)
            .iter()
            .filter(|upstream| {
                analysis
                    .iter()
                    .find(|candidate| &candidate.key == *upstream)
                    .map(|candidate| candidate.pct_change < 2.0)
                    .unwrap_or(false)
            })
            .take(2)
            .map(|upstream| self.display_name(upstream))
            .collect::<Vec<_>>();
        if !weak_supports.is_empty() {
            return format!("Limited by weak progress in: {}", weak_supports.join(", "));
        }

        let effectiveness = self.constraints.total_effectiveness();
        if effectiveness < 0.6 {
            return format!(
                "Constrained by implementation factors ({:.0}% effectiveness)",
                effectiveness * 100.0
            );
        }

        "Saturation effects or systemic constraints".to_string()
    }

    /// Up to five risks, in priority order: declines, stagnant critical
    /// indicators under targeting, low effectiveness, unrealized delayed
    /// effects.
    pub fn risk_factors(&self) -> Vec<String> {
        let analysis = self.analyze_changes();
        let mut risks = Vec::new();

        for entry in &analysis {
            if entry.trend.is_decline() {
                risks.push(format!(
                    "{} declined by {:.1}% - requires intervention",
                    self.display_name(&entry.key),
                    entry.pct_change.abs()
                ));
            }
        }

        let targeted = self.targeted_indicator_keys();
        for key in CRITICAL_WATCH_LIST {
            if !targeted.contains(key) {
                continue;
            }
            let stagnant = analysis
                .iter()
                .find(|entry| entry.key == key)
                .map(|entry| entry.trend == Trend::Stable)
                .unwrap_or(false);
            if stagnant {
                risks.push(format!(
                    "{} stagnant despite targeting",
                    self.display_name(key)
                ));
            }
        }

        let effectiveness = self.constraints.total_effectiveness();
        if effectiveness < 0.5 {
            risks.push(format!(
                "Overall implementation effectiveness is low ({:.0}%) - project may underdeliver",
                effectiveness * 100.0
            ));
        }

        let pending = self.states[self.states.len() - 1].delayed_effects.len();
        if pending > 0 {
            risks.push(format!(
                "{pending} delayed effects still pending - full impact not yet realized"
            ));
        }

        risks.truncate(5);
        risks
    }

    /// Up to five recommendations, in priority order.
    pub fn recommendations(&self) -> Vec<String> {
        let analysis = self.analyze_changes();
        let mut recommendations = Vec::new();

        let bottlenecks = self.bottlenecks();
        if !bottlenecks.is_empty() {
            let names = bottlenecks
                .iter()
                .take(2)
                .map(|bottleneck| bottleneck.indicator.clone())
                .collect::<Vec<_>>();
            recommendations.push(format!("Focus additional resources on: {}", names.join(", ")));
        }

        let declining = analysis
            .iter()
            .filter(|entry| entry.trend.is_decline())
            .take(2)
            .map(|entry| self.display_name(&entry.key))
            .collect::<Vec<_>>();
        if !declining.is_empty() {
            recommendations.push(format!(
                "Urgent: address declining trends in {}",
                declining.join(", ")
            ));
        }

        if let Some(top_performer) = analysis.iter().find(|entry| entry.pct_change > 10.0) {
            let downstream = self
                .graph
                .influences_from(&top_performer.key)
                .iter()
                .take(2)
                .map(|edge| self.display_name(&edge.target))
                .collect::<Vec<_>>();
            if !downstream.is_empty() {
                recommendations.push(format!(
                    "Leverage strong {} gains to improve {}",
                    self.display_name(&top_performer.key),
                    downstream.join(", ")
                ));
            }
        }

        let effectiveness = self.constraints.total_effectiveness();
        if effectiveness < 0.7 {
            recommendations.push(format!(
                "Improve implementation conditions - current effectiveness is only {:.0}%",
                effectiveness * 100.0
            ));
        }

        if self.states.len() < 5 {
            recommendations
                .push("Consider extending project timeline for full impact realization".to_string());
        }

        recommendations.truncate(5);
        recommendations
    }

    /// Confidence in [0.5, 1.0], discounted for severe constraints, high
    /// volatility, and short trajectories.
    pub fn confidence_score(&self) -> f64 {
        let mut confidence: f64 = 1.0;

        let effectiveness = self.constraints.total_effectiveness();
        if effectiveness < 0.5 {
            confidence *= 0.7;
        } else if effectiveness < 0.7 {
            confidence *= 0.85;
        }

        let volatile = self
            .analyze_changes()
            .iter()
            .filter(|entry| entry.pct_change.abs() > 20.0)
            .count();
        if volatile > 5 {
            confidence *= 0.8;
        }

        if self.states.len() < 4 {
            confidence *= 0.85;
        }

        confidence.clamp(0.5, 1.0)
    }

    /// Mean percent change across target-SDG indicators; zero when no
    /// indicator matches.
    pub fn net_progress(&self) -> f64 {
        let analysis = self.analyze_changes();
        let mut changes = Vec::new();
        for sdg in self.target_sdgs {
            for key in self.graph.indicators_for_goal(*sdg) {
                if let Some(entry) = analysis.iter().find(|entry| entry.key == key) {
                    changes.push(entry.pct_change);
                }
            }
        }
        if changes.is_empty() {
            0.0
        } else {
            changes.iter().sum::<f64>() / changes.len() as f64
        }
    }

    pub fn summary(&self) -> SummaryResult {
        let top_changes = self.top_changes(5);
        let bottlenecks = self.bottlenecks();
        let net_progress = self.net_progress();
        let narrative = self.narrative(&top_changes, &bottlenecks, net_progress);

        SummaryResult {
            narrative,
            net_sdg_progress: net_progress,
            confidence_score: self.confidence_score(),
            top_changes,
            bottlenecks,
            risks: self.risk_factors(),
            recommendations: self.recommendations(),
            effectiveness: self.constraints.total_effectiveness(),
        }
    }

    fn narrative(
        &self,
        top_changes: &[TopChange],
        bottlenecks: &[Bottleneck],
        net_progress: f64,
    ) -> String {
        let mut parts = Vec::new();

        if net_progress > 10.0 {
            parts.push(format!(
                "The simulation shows strong progress with {net_progress:.1}% average improvement across target SDGs."
            ));
        } else if net_progress > 5.0 {
            parts.push(format!(
                "The simulation shows moderate progress with {net_progress:.1}% average improvement across target SDGs."
            ));
        } else if net_progress > 0.0 {
            parts.push(format!(
                "The simulation shows limited progress with only {net_progress:.1}% average improvement across target SDGs."
            ));
        } else {
            parts.push(format!(
                "The simulation shows concerning results with {:.1}% average decline in target SDGs.",
                net_progress.abs()
            ));
        }

        if let Some(top) = top_changes.first() {
            parts.push(format!(
                "{} showed the strongest gains with a {:.1}% improvement.",
                top.indicator, top.pct_change
            ));
        }

        if let Some(bottleneck) = bottlenecks.first() {
            parts.push(format!(
                "However, {} remained a bottleneck - {}.",
                bottleneck.indicator,
                bottleneck.reason.to_lowercase()
            ));
        }

        let effectiveness = self.constraints.total_effectiveness();
        if effectiveness < 0.7 {
            parts.push(format!(
                "Overall implementation effectiveness was limited to {:.0}% due to various constraints.",
                effectiveness * 100.0
            ));
        }

        parts.join(" ")
    }

    fn display_name(&self, key: &str) -> String {
        self.graph
            .info(key)
            .map(|indicator| indicator.name.clone())
            .unwrap_or_else(|| key.to_string())
    }

    fn targeted_indicator_keys(&self) -> BTreeSet<String> {
        self.target_sdgs
            .iter()
            .flat_map(|sdg| self.graph.indicators_for_goal(*sdg))
            .collect()
    }
}
