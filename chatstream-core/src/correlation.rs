//! Correlation data carried by a structured `done` payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

const ID_KEYS: [&str; 4] = ["id", "message_id", "messageId", "request_id"];
const SESSION_KEYS: [&str; 2] = ["session_id", "sessionId"];

/// Fields a backend attached to its `done` event.
///
/// The set of fields is not fixed; the accessors look up the names
/// backends commonly use and everything else stays reachable via
/// [`Correlation::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Correlation(Map<String, JsonValue>);

impl Correlation {
    /// Wrap a field map, dropping the `type` discriminator.
    ///
    /// Returns `None` when nothing but the discriminator was present.
    #[must_use]
    pub fn from_fields(mut fields: Map<String, JsonValue>) -> Option<Self> {
        fields.remove("type");
        if fields.is_empty() {
            None
        } else {
            Some(Self(fields))
        }
    }

    /// Message or request id, as text.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.first_scalar(&ID_KEYS)
    }

    /// Session id, as text.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.first_scalar(&SESSION_KEYS)
    }

    /// Raw field lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// All fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    fn first_scalar(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(|value| match value {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn fields(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_type_only_yields_none() {
        assert!(Correlation::from_fields(fields(json!({"type": "done"}))).is_none());
    }

    #[test]
    fn test_id_lookup_order_and_numbers() {
        let c = Correlation::from_fields(fields(json!({
            "type": "done",
            "message_id": 991,
            "sessionId": "abc",
        })))
        .unwrap();

        assert_eq!(c.id().as_deref(), Some("991"));
        assert_eq!(c.session_id().as_deref(), Some("abc"));
        assert!(c.get("type").is_none());
    }

    #[test]
    fn test_non_scalar_ids_are_skipped() {
        let c = Correlation::from_fields(fields(json!({
            "id": {"nested": true},
            "request_id": "r-1",
        })))
        .unwrap();
        assert_eq!(c.id().as_deref(), Some("r-1"));
        assert!(c.session_id().is_none());
    }

    #[rstest]
    #[case(json!({"id": "a"}), Some("a"))]
    #[case(json!({"messageId": 7}), Some("7"))]
    #[case(json!({"request_id": "r", "id": "first"}), Some("first"))]
    #[case(json!({"conversation": "c"}), None)]
    fn test_id_keys(#[case] value: JsonValue, #[case] expected: Option<&str>) {
        let c = Correlation::from_fields(fields(value)).unwrap();
        assert_eq!(c.id().as_deref(), expected);
    }
}
