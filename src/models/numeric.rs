//! Lenient numeric deserializer.
//!
//! The analytical store serialises DECIMAL and BIGINT columns as JSON strings
//! (`"300.5"`, `"1250000"`) while DOUBLE columns arrive as plain numbers. Every
//! numeric field on the market models goes through this helper.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid numeric value: {:?}", s))),
        }
    }
}

/// Accepts a number or a numeric string. `null`, a missing field or an empty
/// string become `None`, so one bad cell never rejects the whole row set.
pub fn opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => value.into_f64().map(Some),
    }
}
