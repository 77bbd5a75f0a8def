//! Deterministic SDG scenario simulation kernel.
//!
//! A run takes a [`contracts::ScenarioConfig`], walks the indicator influence
//! graph year by year under a multiplicative constraint model with delayed
//! effects and cyclic feedback, and hands the finished trajectory to the
//! explainer. Everything downstream of the seed is reproducible bit for bit.

pub mod compare;
pub mod constraint;
pub mod engine;
pub mod explain;
pub mod feedback;
pub mod graph;
pub mod sampler;
pub mod saturation;

pub use compare::{compare_scenarios, run_scenario};
pub use constraint::{Constraint, ConstraintModel};
pub use engine::ScenarioEngine;
pub use explain::{ChangeAnalysis, ExplainError, Explainer, Trend};
pub use feedback::{FeedbackError, FeedbackLoop, FeedbackModel, LoopKind};
pub use graph::{GraphError, Indicator, IndicatorGraph, InfluenceEdge};
pub use sampler::{stable_key_hash, SeedSampler};
pub use saturation::saturate;
