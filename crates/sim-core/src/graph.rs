//! Static indicator catalogue and directed influence graph. Indicators and
//! edges are immutable after construction; runtime lookups on unknown keys
//! degrade to empty results instead of failing, but custom catalogues are
//! validated at build time so a typo'd edge fails loudly before a run starts.

use std::collections::BTreeMap;
use std::fmt;

/// A tracked metric, bounded in [min, max], owned by one SDG.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub key: String,
    pub name: String,
    pub baseline: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub sdg: u8,
}

/// A directed, weighted, optionally delayed causal link. The source is the
/// map key the edge is registered under.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluenceEdge {
    pub target: String,
    pub weight: f64,
    pub delay_years: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateIndicator(String),
    UnknownEdgeSource(String),
    UnknownEdgeTarget { source: String, target: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::DuplicateIndicator(key) => {
                write!(f, "indicator registered twice: {key}")
            }
            GraphError::UnknownEdgeSource(source) => {
                write!(f, "influence edges registered for unknown indicator: {source}")
            }
            GraphError::UnknownEdgeTarget { source, target } => {
                write!(f, "edge from {source} points at unknown indicator: {target}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

#[derive(Debug, Clone)]
pub struct IndicatorGraph {
    indicators: Vec<Indicator>,
    index_by_key: BTreeMap<String, usize>,
    influences: BTreeMap<String, Vec<InfluenceEdge>>,
    influencers: BTreeMap<String, Vec<String>>,
}

impl IndicatorGraph {
    /// The built-in 17-indicator SDG catalogue with its influence table.
    pub fn sdg_default() -> Self {
        Self::assemble(default_indicators(), default_influences())
    }

    /// Builds a graph from a custom catalogue, rejecting edges that
    /// reference unregistered indicators.
    pub fn from_parts(
        indicators: Vec<Indicator>,
        influences: BTreeMap<String, Vec<InfluenceEdge>>,
    ) -> Result<Self, GraphError> {
        let mut seen = BTreeMap::new();
        for (position, indicator) in indicators.iter().enumerate() {
            if seen.insert(indicator.key.clone(), position).is_some() {
                return Err(GraphError::DuplicateIndicator(indicator.key.clone()));
            }
        }
        for (source, edges) in &influences {
            if !seen.contains_key(source) {
                return Err(GraphError::UnknownEdgeSource(source.clone()));
            }
            for edge in edges {
                if !seen.contains_key(&edge.target) {
                    return Err(GraphError::UnknownEdgeTarget {
                        source: source.clone(),
                        target: edge.target.clone(),
                    });
                }
            }
        }
        Ok(Self::assemble(indicators, influences))
    }

    fn assemble(
        indicators: Vec<Indicator>,
        influences: BTreeMap<String, Vec<InfluenceEdge>>,
    ) -> Self {
        let index_by_key = indicators
            .iter()
            .enumerate()
            .map(|(position, indicator)| (indicator.key.clone(), position))
            .collect::<BTreeMap<_, _>>();

        let mut influencers = BTreeMap::<String, Vec<String>>::new();
        for (source, edges) in &influences {
            for edge in edges {
                let entry = influencers.entry(edge.target.clone()).or_default();
                if !entry.iter().any(|existing| existing == source) {
                    entry.push(source.clone());
                }
            }
        }

        Self {
            indicators,
            index_by_key,
            influences,
            influencers,
        }
    }

    /// All indicators in catalogue order. Catalogue order is the stable
    /// tie-break for rankings downstream.
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn info(&self, key: &str) -> Option<&Indicator> {
        self.index_by_key
            .get(key)
            .map(|position| &self.indicators[*position])
    }

    /// Outgoing edges of an indicator; empty for unknown keys.
    pub fn influences_from(&self, key: &str) -> &[InfluenceEdge] {
        self.influences
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Indicators with an edge pointing *at* the given key, in source order.
    pub fn influencers_of(&self, key: &str) -> &[String] {
        self.influencers
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Keys of all indicators owned by the given SDG, in catalogue order.
    pub fn indicators_for_goal(&self, sdg: u8) -> Vec<String> {
        self.indicators
            .iter()
            .filter(|indicator| indicator.sdg == sdg)
            .map(|indicator| indicator.key.clone())
            .collect()
    }
}

fn indicator(key: &str, name: &str, baseline: f64, unit: &str, sdg: u8) -> Indicator {
    Indicator {
        key: key.to_string(),
        name: name.to_string(),
        baseline,
        min: 0.0,
        max: 100.0,
        unit: unit.to_string(),
        sdg,
    }
}

fn default_indicators() -> Vec<Indicator> {
    vec![
        indicator("poverty_rate", "Poverty Rate", 20.0, "%", 1),
        indicator("food_security", "Food Security Index", 65.0, "index", 2),
        indicator("health_index", "Health Access Index", 70.0, "index", 3),
        indicator("education_index", "Education Quality Index", 68.0, "index", 4),
        indicator("gender_equality", "Gender Equality Index", 72.0, "index", 5),
        indicator("water_access", "Clean Water Access", 75.0, "%", 6),
        indicator("clean_energy", "Clean Energy Share", 30.0, "%", 7),
        indicator("employment_rate", "Employment Rate", 65.0, "%", 8),
        indicator("innovation_index", "Innovation Index", 55.0, "index", 9),
        indicator("equality_index", "Equality Index", 60.0, "index", 10),
        indicator(
            "urban_sustainability",
            "Urban Sustainability Index",
            58.0,
            "index",
            11,
        ),
        indicator("circular_economy", "Circular Economy Index", 40.0, "index", 12),
        indicator("emissions_reduction", "Emissions Reduction", 35.0, "%", 13),
        indicator("marine_health", "Marine Ecosystem Health", 62.0, "index", 14),
        indicator(
            "terrestrial_health",
            "Terrestrial Ecosystem Health",
            68.0,
            "index",
            15,
        ),
        indicator("governance_index", "Governance Quality Index", 64.0, "index", 16),
        indicator("partnership_index", "Partnership Effectiveness", 60.0, "index", 17),
    ]
}

fn edge(target: &str, weight: f64, delay_years: u32, description: &str) -> InfluenceEdge {
    InfluenceEdge {
        target: target.to_string(),
        weight,
        delay_years,
        description: description.to_string(),
    }
}

fn default_influences() -> BTreeMap<String, Vec<InfluenceEdge>> {
    let mut influences = BTreeMap::new();

    influences.insert(
        "education_index".to_string(),
        vec![
            edge("employment_rate", 0.5, 1, "Education improves job prospects with 1-year delay"),
            edge("health_index", 0.3, 2, "Education leads to better health behaviors"),
            edge("poverty_rate", -0.4, 2, "Education reduces poverty over time"),
            edge("innovation_index", 0.6, 1, "Education drives innovation"),
        ],
    );
    influences.insert(
        "employment_rate".to_string(),
        vec![
            edge("poverty_rate", -0.7, 0, "Employment directly reduces poverty"),
            edge("health_index", 0.3, 1, "Employment improves health access"),
            edge("food_security", 0.4, 0, "Employment enables food access"),
            edge("equality_index", 0.2, 1, "Employment reduces inequality"),
        ],
    );
    influences.insert(
        "health_index".to_string(),
        vec![
            edge("employment_rate", 0.3, 1, "Health enables workforce participation"),
            edge("poverty_rate", -0.3, 1, "Health reduces poverty through productivity"),
            edge("education_index", 0.2, 2, "Health enables education participation"),
        ],
    );
    influences.insert(
        "water_access".to_string(),
        vec![
            edge("health_index", 0.5, 0, "Clean water immediately improves health"),
            edge("food_security", 0.3, 1, "Water access enables agriculture"),
            edge("employment_rate", 0.2, 1, "Water access enables economic activity"),
        ],
    );
    influences.insert(
        "clean_energy".to_string(),
        vec![
            edge("emissions_reduction", 0.8, 0, "Clean energy directly reduces emissions"),
            edge("health_index", 0.3, 1, "Clean energy reduces pollution-related illness"),
            edge("innovation_index", 0.4, 1, "Clean energy drives tech innovation"),
        ],
    );
    influences.insert(
        "circular_economy".to_string(),
        vec![
            edge("emissions_reduction", 0.5, 1, "Circular economy reduces waste emissions"),
            edge("employment_rate", 0.3, 1, "Circular economy creates green jobs"),
            edge("marine_health", 0.3, 2, "Reduced waste improves ocean health"),
            edge("terrestrial_health", 0.3, 2, "Reduced waste improves land health"),
        ],
    );
    influences.insert(
        "emissions_reduction".to_string(),
        vec![
            edge("health_index", 0.4, 2, "Lower emissions improve respiratory health"),
            edge("marine_health", 0.5, 3, "Lower emissions slow ocean acidification"),
            edge("terrestrial_health", 0.5, 3, "Lower emissions preserve ecosystems"),
        ],
    );
    influences.insert(
        "innovation_index".to_string(),
        vec![
            edge("employment_rate", 0.4, 1, "Innovation creates new jobs"),
            edge("clean_energy", 0.6, 2, "Innovation enables clean energy transition"),
            edge("circular_economy", 0.5, 2, "Innovation enables circular models"),
        ],
    );
    influences.insert(
        "governance_index".to_string(),
        vec![
            edge("equality_index", 0.5, 1, "Good governance reduces inequality"),
            edge("partnership_index", 0.6, 1, "Good governance enables partnerships"),
            edge("education_index", 0.3, 2, "Good governance improves education systems"),
        ],
    );
    influences.insert(
        "gender_equality".to_string(),
        vec![
            edge("employment_rate", 0.4, 1, "Gender equality increases labor participation"),
            edge("education_index", 0.3, 1, "Gender equality improves education access"),
            edge("poverty_rate", -0.3, 2, "Gender equality reduces household poverty"),
        ],
    );
    influences.insert(
        "urban_sustainability".to_string(),
        vec![
            edge("health_index", 0.3, 1, "Sustainable cities improve health"),
            edge("emissions_reduction", 0.4, 1, "Sustainable cities reduce emissions"),
            edge("equality_index", 0.2, 2, "Sustainable cities reduce urban inequality"),
        ],
    );

    influences
}
