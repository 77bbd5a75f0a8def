//! Serializes u64 seeds as strings so they survive JSON consumers that
//! round-trip numbers through f64.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Numeric(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text.parse::<u64>().map_err(D::Error::custom),
        Raw::Numeric(value) => Ok(value),
    }
}
