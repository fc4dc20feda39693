use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NEIGHBORHOOD: &str = "neighborhood";
pub const PROPERTY_TYPE: &str = "property_type";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

/// Identifier of a listing, as found in the table's id column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingId {
    Integer(u64),
    String(String),
}

impl ListingId {
    /// Parse a raw cell: integers stay integers, anything else is kept as text
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<u64>() {
            Ok(i) => ListingId::Integer(i),
            Err(_) => ListingId::String(trimmed.to_string()),
        }
    }

    /// Whole non-negative numbers (`7`, `7.0`) become integers; other numbers keep their text
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match (n.as_u64(), n.as_f64()) {
                (Some(i), _) => ListingId::Integer(i),
                (None, Some(f)) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
                    ListingId::Integer(f as u64)
                }
                _ => ListingId::String(n.to_string()),
            }),
            Value::String(s) if !s.trim().is_empty() => Some(ListingId::parse(s)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ListingId::Integer(i) => Value::from(*i),
            ListingId::String(s) => Value::from(s.clone()),
        }
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingId::String(s) => write!(f, "{}", s),
            ListingId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for ListingId {
    fn from(s: String) -> Self {
        ListingId::String(s)
    }
}

impl From<&str> for ListingId {
    fn from(s: &str) -> Self {
        ListingId::String(s.to_string())
    }
}

impl From<u64> for ListingId {
    fn from(i: u64) -> Self {
        ListingId::Integer(i)
    }
}

/// One row of the listings table: an identifier plus its cleaned columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl Listing {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ListingId>, payload: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    /// Build a listing from a JSON object; non-object values give an empty payload
    #[must_use]
    pub fn from_json(id: impl Into<ListingId>, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, payload)
    }

    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(field.to_string(), value.into());
        self
    }

    #[inline]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    /// Numeric value of a column, `None` when it is missing or not a number
    #[inline]
    pub fn number(&self, field: &str) -> Option<f64> {
        self.payload.get(field).and_then(numeric_value)
    }

    #[inline]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }

    pub fn neighborhood(&self) -> Option<&str> {
        self.text(NEIGHBORHOOD)
    }

    pub fn property_type(&self) -> Option<&str> {
        self.text(PROPERTY_TYPE)
    }

    /// `(latitude, longitude)` when both are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.number(LATITUDE)?, self.number(LONGITUDE)?))
    }

    /// True when every listed feature has a numeric value
    pub fn has_numbers(&self, features: &[String]) -> bool {
        features.iter().all(|f| self.number(f).is_some())
    }
}

/// Interpret a cell as a number: finite JSON numbers and booleans (as 0/1)
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// True when a cell carries no usable value
pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Number(n) => n.as_f64().map_or(true, |v| !v.is_finite()),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn house() -> Listing {
        Listing::from_json(
            7u64,
            json!({
                "neighborhood": "ROMA NORTE",
                "property_type": "house",
                "price": 4_500_000.0,
                "num_bedrooms": 3,
                "has_amenities": true,
                "latitude": 19.41,
                "longitude": -99.16,
                "url_ad": null
            }),
        )
    }

    #[test]
    fn test_numeric_accessors() {
        let listing = house();
        assert_eq!(listing.number("price"), Some(4_500_000.0));
        assert_eq!(listing.number("num_bedrooms"), Some(3.0));
        assert_eq!(listing.number("has_amenities"), Some(1.0));
        assert_eq!(listing.number("neighborhood"), None);
        assert_eq!(listing.number("url_ad"), None);
        assert_eq!(listing.number("age"), None);
    }

    #[test]
    fn test_categorical_and_coordinates() {
        let listing = house();
        assert_eq!(listing.neighborhood(), Some("ROMA NORTE"));
        assert_eq!(listing.property_type(), Some("house"));
        assert_eq!(listing.coordinates(), Some((19.41, -99.16)));

        let no_coords = Listing::new(1u64, Map::new()).with_field(LATITUDE, 19.0);
        assert_eq!(no_coords.coordinates(), None);
    }

    #[test]
    fn test_has_numbers() {
        let listing = house();
        assert!(listing.has_numbers(&["price".to_string(), "num_bedrooms".to_string()]));
        assert!(!listing.has_numbers(&["price".to_string(), "url_ad".to_string()]));
    }

    #[test]
    fn test_listing_id_parse() {
        assert_eq!(ListingId::parse("42"), ListingId::Integer(42));
        assert_eq!(ListingId::parse(" ab-7 "), ListingId::String("ab-7".to_string()));
        assert_eq!(ListingId::from_value(&json!(3)), Some(ListingId::Integer(3)));
        assert_eq!(ListingId::from_value(&json!(null)), None);
        assert_eq!(ListingId::from_value(&json!(1.0)), Some(ListingId::Integer(1)));
        assert_eq!(ListingId::from_value(&json!(-3)), Some(ListingId::String("-3".to_string())));
        assert_eq!(ListingId::from_value(&json!(2.5)), Some(ListingId::String("2.5".to_string())));
        assert_eq!(serde_json::to_string(&ListingId::Integer(9)).unwrap(), "9");
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(&json!(null)));
        assert!(is_missing(&json!("  ")));
        assert!(!is_missing(&json!(0)));
        assert!(!is_missing(&json!("house")));
    }
}
