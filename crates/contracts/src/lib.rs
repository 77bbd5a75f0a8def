//! v1 cross-boundary contracts shared by the simulation kernel, CLI, and any
//! future API or persistence surface.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod serde_u64_string;

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Implementation scenario selected for a run. The kind picks the baseline
/// effectiveness constraint; everything else about a scenario lives in
/// [`ScenarioConfig`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Success,
    PartialSuccess,
    Delay,
    Failure,
    Underfunded,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 5] = [
        ScenarioKind::Success,
        ScenarioKind::PartialSuccess,
        ScenarioKind::Delay,
        ScenarioKind::Failure,
        ScenarioKind::Underfunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Success => "success",
            ScenarioKind::PartialSuccess => "partial_success",
            ScenarioKind::Delay => "delay",
            ScenarioKind::Failure => "failure",
            ScenarioKind::Underfunded => "underfunded",
        }
    }

    pub fn parse(raw: &str) -> Option<ScenarioKind> {
        ScenarioKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for one simulation run. The caller is responsible for
/// validating SDG range (1-17) and non-empty targets; the kernel does not
/// re-validate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub schema_version: String,
    pub run_id: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub target_sdgs: Vec<u8>,
    pub scenario: ScenarioKind,
    pub funding_percentage: f64,
    pub timeline_years: u32,
    pub delay_months: u32,
    #[serde(default)]
    pub baseline_overrides: BTreeMap<String, f64>,
    pub notes: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: "run_local_001".to_string(),
            seed: 1337,
            target_sdgs: Vec::new(),
            scenario: ScenarioKind::Success,
            funding_percentage: 100.0,
            timeline_years: 5,
            delay_months: 0,
            baseline_overrides: BTreeMap::new(),
            notes: None,
        }
    }
}

/// An indirect effect that has been scheduled but has not fired yet.
/// Mutated only by the engine: decremented each year, removed when it fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingDelayedEffect {
    pub target: String,
    pub magnitude: f64,
    pub years_remaining: u32,
}

/// All indicator values at a single simulated year, plus the delayed
/// effects still outstanding at that year. Never mutated once appended to a
/// run's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationState {
    pub year: u32,
    pub indicators: BTreeMap<String, f64>,
    pub delayed_effects: Vec<PendingDelayedEffect>,
}

impl SimulationState {
    pub fn value(&self, indicator: &str) -> f64 {
        self.indicators.get(indicator).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopChange {
    pub indicator: String,
    pub baseline: f64,
    pub final_value: f64,
    pub change: f64,
    pub pct_change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bottleneck {
    pub indicator: String,
    pub reason: String,
}

/// Explainer output for a completed trajectory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResult {
    pub narrative: String,
    pub net_sdg_progress: f64,
    pub confidence_score: f64,
    pub top_changes: Vec<TopChange>,
    pub bottlenecks: Vec<Bottleneck>,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
    pub effectiveness: f64,
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "net_progress={:.1}% confidence={:.2} effectiveness={:.2}",
            self.net_sdg_progress, self.confidence_score, self.effectiveness
        )
    }
}

/// A full run result: the trajectory plus its summary, shaped the way
/// downstream consumers persist it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    pub schema_version: String,
    pub run_id: String,
    pub config: ScenarioConfig,
    pub yearly_states: Vec<SimulationState>,
    pub summary: SummaryResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioOutcome {
    pub scenario: ScenarioKind,
    pub net_progress: f64,
    pub confidence: f64,
    pub narrative: String,
    pub final_state: BTreeMap<String, f64>,
}

/// Ranked comparison of all scenario kinds under the same targets and
/// timeline, best first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioComparison {
    pub schema_version: String,
    pub target_sdgs: Vec<u8>,
    pub timeline_years: u32,
    pub scenarios: Vec<ScenarioOutcome>,
    pub best_scenario: ScenarioKind,
    pub worst_scenario: ScenarioKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_kind_round_trips_through_snake_case() {
        for kind in ScenarioKind::ALL {
            let encoded = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(encoded, format!("\"{}\"", kind.as_str()));
            let decoded: ScenarioKind = serde_json::from_str(&encoded).expect("deserialize");
            assert_eq!(decoded, kind);
        }
    }

    #[test]
    fn scenario_kind_parse_rejects_unknown() {
        assert_eq!(ScenarioKind::parse("success"), Some(ScenarioKind::Success));
        assert_eq!(ScenarioKind::parse("miracle"), None);
    }

    #[test]
    fn config_round_trip_preserves_overrides() {
        let mut config = ScenarioConfig::default();
        config.target_sdgs = vec![3, 4];
        config
            .baseline_overrides
            .insert("health_index".to_string(), 55.5);

        let encoded = serde_json::to_string(&config).expect("serialize");
        let decoded: ScenarioConfig = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, config);
    }

    #[test]
    fn config_defaults_are_schema_v1() {
        let config = ScenarioConfig::default();
        assert_eq!(config.schema_version, SCHEMA_VERSION_V1);
        assert_eq!(config.scenario, ScenarioKind::Success);
        assert!(config.target_sdgs.is_empty());
    }

    #[test]
    fn state_value_is_zero_for_unknown_indicator() {
        let state = SimulationState {
            year: 0,
            indicators: BTreeMap::new(),
            delayed_effects: Vec::new(),
        };
        assert_eq!(state.value("no_such_indicator"), 0.0);
    }
}
