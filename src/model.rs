use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::ops::Deref;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PortRecord {
    #[serde(default, deserialize_with = "de_string_from_any")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64_from_any")]
    pub lat: Option<f64>,
    #[serde(default, alias = "lon", deserialize_with = "de_opt_f64_from_any")]
    pub lng: Option<f64>,
}

impl PortRecord {
    pub fn name_text(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn country_text(&self) -> &str {
        self.country.as_deref().unwrap_or("")
    }

    /// Both coordinates, only when they are finite numbers.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Read-only port list, loaded once and shared behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: Vec<PortRecord>,
}

impl Catalog {
    pub fn new(records: Vec<PortRecord>) -> Self {
        Self { records }
    }

    pub fn positioned(&self) -> impl Iterator<Item = (&PortRecord, (f64, f64))> + '_ {
        self.records
            .iter()
            .filter_map(|record| record.position().map(|pos| (record, pos)))
    }
}

impl Deref for Catalog {
    type Target = [PortRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

fn de_string_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        _ => Ok(None),
    }
}

/// Numbers and numeric strings both count as coordinates, so a catalog
/// exported with quoted values still plots.
fn de_opt_f64_from_any<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => Ok(number.as_f64().filter(|v| v.is_finite())),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(trimmed.parse::<f64>().ok().filter(|v| v.is_finite()))
            }
        }
        _ => Ok(None),
    }
}
