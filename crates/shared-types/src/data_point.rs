//! Read-only views over dataset records used by pointer interactions

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record that has been projected to screen space
pub trait ScreenPosition {
    fn screen_x(&self) -> f64;
    fn screen_y(&self) -> f64;
}

/// A record carrying a sortable time value under a named field
pub trait TimeKeyed {
    /// Time value in the same unit the time scale inverts to.
    /// `None` when the field is absent or not interpretable as time.
    fn time_key(&self, field: &str) -> Option<f64>;
}

/// Simple projected point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl ScreenPosition for ScreenPoint {
    fn screen_x(&self) -> f64 {
        self.x
    }

    fn screen_y(&self) -> f64 {
        self.y
    }
}

/// One row of the dataset as delivered by the API: an arbitrary JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord {
    fields: Map<String, Value>,
}

impl DataRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for DataRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl TryFrom<Value> for DataRecord {
    type Error = crate::InteractionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(crate::InteractionError::InvalidValue {
                field: "record".to_string(),
                message: format!("expected an object, got {other}"),
            }),
        }
    }
}

impl ScreenPosition for DataRecord {
    fn screen_x(&self) -> f64 {
        self.number("x").unwrap_or(f64::NAN)
    }

    fn screen_y(&self) -> f64 {
        self.number("y").unwrap_or(f64::NAN)
    }
}

impl TimeKeyed for DataRecord {
    fn time_key(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_time_millis(s),
            _ => None,
        }
    }
}

/// Parse a time string into epoch milliseconds.
///
/// Accepts RFC 3339 timestamps, bare `YYYY-MM-DD` dates (midnight UTC) and
/// plain numbers.
pub fn parse_time_millis(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.timestamp_millis() as f64);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(midnight.and_utc().timestamp_millis() as f64);
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> DataRecord {
        DataRecord::try_from(value).unwrap()
    }

    #[test]
    fn test_screen_position_from_record() {
        let r = record(json!({"x": 12.5, "y": "40", "borough": "Queens"}));
        assert_eq!(r.screen_x(), 12.5);
        assert_eq!(r.screen_y(), 40.0);

        let missing = record(json!({"borough": "Queens"}));
        assert!(missing.screen_x().is_nan());
    }

    #[test]
    fn test_time_key_variants() {
        let numeric = record(json!({"time": 1_700_000_000_000u64}));
        assert_eq!(numeric.time_key("time"), Some(1_700_000_000_000.0));

        let date = record(json!({"pickup_date": "1970-01-02"}));
        assert_eq!(date.time_key("pickup_date"), Some(86_400_000.0));

        let rfc = record(json!({"time": "1970-01-01T00:00:01Z"}));
        assert_eq!(rfc.time_key("time"), Some(1000.0));

        let junk = record(json!({"time": "yesterday"}));
        assert_eq!(junk.time_key("time"), None);
        assert_eq!(junk.time_key("missing"), None);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(DataRecord::try_from(json!([1, 2])).is_err());
    }
}
