// Change-diff engine
//
// Computes the minimal write payload for an entity: the declared fields
// that are set and differ from (or are absent in) the last loaded snapshot,
// plus any snapshot key whose current value has changed. Unset fields and
// child collections never appear.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::field::Field;

/// One form-encoded payload value. Numbers stay numbers on the wire, so a
/// rack `size` of 42 goes out as `42`, never as `"42"` or `42.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(Number),
    Text(String),
}

impl FormValue {
    /// Form encoding of an arbitrary JSON value. Strings go out verbatim;
    /// every other non-number value is sent as its JSON text, so `true`,
    /// `false` and `null` reach the server spelled exactly that way.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => {
                Self::Text(value.to_string())
            }
        }
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Ordered field-name to value map sent as a form body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, FormValue>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a String, &'a FormValue);
    type IntoIter = indexmap::map::Iter<'a, String, FormValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Values loaded from the server compare loosely for numbers: `1`, `1.0`
/// and `1e0` are the same rack slot.
pub(crate) fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y).is_eq(),
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Fields to send on the next write.
///
/// Declared fields are visited first, in declaration order. Snapshot keys
/// follow; an entry already emitted keeps its position.
pub fn changed_fields(
    declared: &IndexMap<&'static str, Field>,
    extra: &Map<String, Value>,
    snapshot: &Map<String, Value>,
) -> Payload {
    let mut payload = Payload::new();

    for (name, field) in declared {
        let Field::Set(current) = field else {
            continue;
        };
        match snapshot.get(*name) {
            Some(loaded) if same_value(loaded, current) => {}
            _ => payload.insert(*name, FormValue::from_json(current)),
        }
    }

    for (name, loaded) in snapshot {
        let current = match declared.get(name.as_str()) {
            Some(Field::Set(value)) => value,
            Some(Field::Unset { .. }) => continue,
            None => match extra.get(name) {
                Some(value) => value,
                None => continue,
            },
        };
        if !same_value(loaded, current) {
            payload.insert(name.as_str(), FormValue::from_json(current));
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn declared(pairs: &[(&'static str, Field)]) -> IndexMap<&'static str, Field> {
        pairs.iter().cloned().collect()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn fresh_entity_sends_every_set_field() {
        let fields = declared(&[
            ("name", Field::Set(json!("TestRack1"))),
            ("size", Field::Set(json!(42))),
            ("notes", Field::optional()),
        ]);
        let payload = changed_fields(&fields, &Map::new(), &Map::new());

        assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["name", "size"]);
        assert_eq!(payload.get("size"), Some(&FormValue::Number(42.into())));
    }

    #[test]
    fn unchanged_snapshot_yields_empty_payload() {
        let fields = declared(&[
            ("name", Field::Set(json!("R1"))),
            ("size", Field::Set(json!(42))),
        ]);
        let snapshot = object(json!({"name": "R1", "size": 42.0, "rack_id": 7}));
        let extra = object(json!({"rack_id": 7}));

        assert!(changed_fields(&fields, &extra, &snapshot).is_empty());
    }

    #[test]
    fn single_mutation_is_the_only_entry() {
        let fields = declared(&[
            ("name", Field::Set(json!("R1-renamed"))),
            ("size", Field::Set(json!(42))),
        ]);
        let snapshot = object(json!({"name": "R1", "size": 42}));
        let payload = changed_fields(&fields, &Map::new(), &snapshot);

        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("name"), Some(&FormValue::from("R1-renamed")));
    }

    #[test]
    fn changed_extra_attribute_is_sent() {
        let fields = declared(&[("name", Field::Set(json!("R1")))]);
        let snapshot = object(json!({"name": "R1", "row": "A"}));
        let extra = object(json!({"row": "B"}));
        let payload = changed_fields(&fields, &extra, &snapshot);

        assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["row"]);
    }

    #[test]
    fn unset_field_never_sent_even_when_loaded() {
        let fields = declared(&[("notes", Field::optional())]);
        let snapshot = object(json!({"notes": "old"}));

        assert!(changed_fields(&fields, &Map::new(), &snapshot).is_empty());
    }

    #[test]
    fn form_encoding_of_scalars() {
        assert_eq!(FormValue::from_json(&json!(true)), FormValue::from("true"));
        assert_eq!(FormValue::from_json(&json!(false)), FormValue::from("false"));
        assert_eq!(FormValue::from_json(&json!(null)), FormValue::from("null"));
        assert_eq!(FormValue::from_json(&json!("yes")), FormValue::from("yes"));
        assert_eq!(FormValue::from_json(&json!([1, 2])), FormValue::from("[1,2]"));
        assert_eq!(FormValue::from_json(&json!(1.5)).to_string(), "1.5");
    }

    #[test]
    fn set_boolean_and_null_sent_as_json_text() {
        let fields = declared(&[
            ("is_it_switch", Field::Set(json!(true))),
            ("in_service", Field::Set(json!(false))),
            ("notes", Field::Set(Value::Null)),
        ]);
        let payload = changed_fields(&fields, &Map::new(), &Map::new());

        assert_eq!(payload.get("is_it_switch"), Some(&FormValue::from("true")));
        assert_eq!(payload.get("in_service"), Some(&FormValue::from("false")));
        assert_eq!(payload.get("notes"), Some(&FormValue::from("null")));
    }

    #[test]
    fn loose_number_equality() {
        assert!(same_value(&json!(1), &json!(1.0)));
        assert!(!same_value(&json!(1), &json!("1")));
        assert!(!same_value(&json!(1), &json!(2)));
    }
}
