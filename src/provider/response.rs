//! Response bodies of the WorldWeatherOnline past-weather endpoint.
//!
//! Numeric fields arrive as JSON strings (`"maxtempC": "5"`); they are kept as strings
//! here and parsed during normalization.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize)]
pub struct PastWeatherResponse {
    pub data: Option<PastWeatherData>,
}

#[derive(Debug, Deserialize)]
pub struct PastWeatherData {
    pub weather: Option<Vec<RawDay>>,
    pub error: Option<Vec<ApiMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub msg: String,
}

/// One day as returned by the provider, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDay {
    pub date: String,
    #[serde(rename = "maxtempC", default, deserialize_with = "lenient_string")]
    pub max_temp_c: Option<String>,
    #[serde(rename = "mintempC", default, deserialize_with = "lenient_string")]
    pub min_temp_c: Option<String>,
    #[serde(rename = "avgtempC", default, deserialize_with = "lenient_string")]
    pub avg_temp_c: Option<String>,
    #[serde(rename = "uvIndex", default, deserialize_with = "lenient_string")]
    pub uv_index: Option<String>,
    #[serde(rename = "sunHour", default, deserialize_with = "lenient_string")]
    pub sun_hour: Option<String>,
    #[serde(default)]
    pub hourly: Vec<RawHour>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHour {
    #[serde(rename = "windspeedKmph", default, deserialize_with = "lenient_string")]
    pub wind_speed_kmph: Option<String>,
    #[serde(rename = "winddir16Point", default, deserialize_with = "lenient_string")]
    pub wind_direction: Option<String>,
    #[serde(rename = "WindGustKmph", default, deserialize_with = "lenient_string")]
    pub wind_gust_kmph: Option<String>,
}

/// Accepts a JSON string or number; empty strings and `null` become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}
