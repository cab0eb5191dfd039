//! Claims bag and value normalization
//!
//! Claims arrive as JSON values (a decoded token body, session attributes).
//! Every lookup flattens the stored value into an ordered list of strings so
//! the membership and pattern strategies can treat scalars and collections
//! the same way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Display;

use crate::error::Result;

/// Authenticated-request claims, keyed by claim name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimsBag {
    claims: HashMap<String, Value>,
}

impl ClaimsBag {
    /// Create an empty claims bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing claim map
    pub fn from_map(claims: HashMap<String, Value>) -> Self {
        Self { claims }
    }

    /// Build a bag from a JSON object; any other JSON yields an empty bag
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from(map),
            _ => Self::default(),
        }
    }

    /// Parse a JSON document; a non-object document yields an empty bag
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not valid JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::from_json(serde_json::from_str(json)?))
    }

    /// Insert or replace a claim
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    /// Insert a collection claim, keeping iteration order
    pub fn insert_values<I, T>(&mut self, name: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let items = values
            .into_iter()
            .map(|v| Value::String(v.to_string()))
            .collect();
        self.claims.insert(name.into(), Value::Array(items));
        self
    }

    /// Builder-style insert
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Raw claim value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Normalized values of a claim
    ///
    /// Absent and `null` claims produce an empty list. Scalars produce a
    /// single entry. Arrays produce one entry per element in order, with
    /// `null` elements skipped. Never fails.
    pub fn values(&self, name: &str) -> Vec<String> {
        match self.claims.get(name) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().filter_map(scalar_string).collect(),
            Some(other) => scalar_string(other).into_iter().collect(),
        }
    }
}

/// String form of a single claim element
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Nested collections keep their compact JSON form
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

impl From<Map<String, Value>> for ClaimsBag {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            claims: map.into_iter().collect(),
        }
    }
}

impl From<HashMap<String, Value>> for ClaimsBag {
    fn from(claims: HashMap<String, Value>) -> Self {
        Self::from_map(claims)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ClaimsBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            claims: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[test]
    fn test_absent_claim_is_empty() {
        let bag = ClaimsBag::new();
        assert!(bag.values("iss").is_empty());
    }

    #[test]
    fn test_null_claim_is_empty() {
        let bag = ClaimsBag::new().with_claim("iss", Value::Null);
        assert!(bag.values("iss").is_empty());
    }

    #[test]
    fn test_scalar_claims() {
        let bag = ClaimsBag::new()
            .with_claim("iss", "myapp")
            .with_claim("exp", 1_700_000_000u64)
            .with_claim("admin", true);

        assert_eq!(bag.values("iss"), vec!["myapp"]);
        assert_eq!(bag.values("exp"), vec!["1700000000"]);
        assert_eq!(bag.values("admin"), vec!["true"]);
    }

    #[test]
    fn test_array_preserves_order_and_duplicates() {
        let bag = ClaimsBag::from_json(json!({"scp": ["c", "a", "c", null, 7]}));
        assert_eq!(bag.values("scp"), vec!["c", "a", "c", "7"]);
    }

    #[test]
    fn test_nested_values_render_as_json() {
        let bag = ClaimsBag::from_json(json!({
            "groups": [["a", "b"]],
            "address": {"country": "NL"}
        }));
        assert_eq!(bag.values("groups"), vec![r#"["a","b"]"#]);
        assert_eq!(bag.values("address"), vec![r#"{"country":"NL"}"#]);
    }

    #[test]
    fn test_insert_values_from_unordered_collection() {
        let roles: BTreeSet<&str> = ["viewer", "admin"].into_iter().collect();
        let mut bag = ClaimsBag::new();
        bag.insert_values("roles", &roles);
        assert_eq!(bag.values("roles"), vec!["admin", "viewer"]);
    }

    #[test]
    fn test_from_json_non_object() {
        assert!(ClaimsBag::from_json(json!(["iss"])).is_empty());
        assert!(ClaimsBag::from_json(Value::Null).is_empty());
    }

    #[test]
    fn test_from_json_str() {
        let bag = ClaimsBag::from_json_str(r#"{"iss": "myapp"}"#).unwrap();
        assert_eq!(bag.values("iss"), vec!["myapp"]);
        assert!(ClaimsBag::from_json_str("{").is_err());
    }

    #[test]
    fn test_deserialize_transparent() {
        let bag: ClaimsBag = serde_json::from_str(r#"{"sub": "user", "scp": ["a"]}"#).unwrap();
        assert_eq!(bag.len(), 2);
        assert!(bag.contains_key("sub"));
        assert_eq!(bag.values("scp"), vec!["a"]);
    }
}
