//! Collection+JSON envelope codec.
//!
//! The TeamSnap API v3 wraps every response in a Collection+JSON envelope: a
//! `collection` holding zero or more `items`, each carrying its fields as an
//! ordered list of `{name, value}` pairs plus navigational `links`. This
//! module decodes that shape into flat [`Record`]s and builds the inverse
//! `template` body used by create/update requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::EnvelopeError;

/// Wire-level response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope {
    /// The collection wrapper.
    pub collection: Collection,
}

/// The collection wrapper inside an envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Collection {
    /// API version reported by the server (e.g. "3.867.0").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Canonical href of this collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Navigational links (pagination, related resources).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,

    /// The items in this collection. May be empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
}

/// One item inside a collection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Item {
    /// Canonical href of this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Ordered field data. Names are unique within one item.
    #[serde(default)]
    pub data: Vec<FieldPair>,

    /// Item-level navigational links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// One name/value pair inside an item's data list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldPair {
    /// Field name.
    pub name: String,
    /// Field value. Absent values arrive as JSON null.
    #[serde(default)]
    pub value: Value,
}

/// A navigational link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Link {
    /// Link relation name (e.g. "next", "team").
    pub rel: String,
    /// Target URI.
    pub href: String,
    /// Human-readable description, if the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Deprecation marker set by the server.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

/// The decoded, flat form of one envelope item.
///
/// Field insertion order is preserved. Unknown fields are kept verbatim;
/// fields the server omitted are absent rather than defaulted, so callers can
/// distinguish "omitted" from "explicitly null".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
    links: Vec<Link>,
}

impl Record {
    /// Looks up a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Looks up a field as a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Looks up a field as a signed integer.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Looks up a field as a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Returns true if the field is present (even if its value is null).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up an item-level link href by relation name.
    pub fn link(&self, rel: &str) -> Option<&str> {
        extract_link(&self.links, rel)
    }

    /// The item-level links captured alongside the fields.
    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
            links: Vec::new(),
        }
    }
}

/// Flattens one item's name/value pairs into a [`Record`].
///
/// Fails with [`EnvelopeError::DuplicateField`] if a name repeats; the item's
/// links ride along as the record's side channel.
pub fn decode_item(item: &Item) -> Result<Record, EnvelopeError> {
    let mut fields: Vec<(String, Value)> = Vec::with_capacity(item.data.len());
    for pair in &item.data {
        if fields.iter().any(|(n, _)| n == &pair.name) {
            return Err(EnvelopeError::DuplicateField(pair.name.clone()));
        }
        fields.push((pair.name.clone(), pair.value.clone()));
    }
    Ok(Record {
        fields,
        links: item.links.clone(),
    })
}

/// Decodes every item in an envelope, order preserved.
///
/// An empty items list decodes to an empty sequence, not an error.
pub fn decode_collection(envelope: &Envelope) -> Result<Vec<Record>, EnvelopeError> {
    envelope.collection.items.iter().map(decode_item).collect()
}

/// Looks up a link href by relation name.
///
/// Absence is not an error; for the "next" relation it signals the end of
/// pagination.
pub fn extract_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|link| link.rel == rel)
        .map(|link| link.href.as_str())
}

/// Parses a response body into an [`Envelope`].
pub fn parse_envelope(body: &[u8]) -> Result<Envelope, EnvelopeError> {
    serde_json::from_slice(body).map_err(|e| EnvelopeError::Json(e.to_string()))
}

/// Builds the Collection+JSON `template` write body from a field set.
///
/// The fields value must serialize to a JSON object; each entry becomes one
/// `{name, value}` pair. This is the inverse of [`decode_item`].
pub fn encode_template<T: Serialize>(fields: &T) -> Result<Value, EnvelopeError> {
    let value = serde_json::to_value(fields).map_err(|e| EnvelopeError::Json(e.to_string()))?;
    let map = match value {
        Value::Object(map) => map,
        _ => return Err(EnvelopeError::TemplateNotAnObject),
    };
    let data: Vec<Value> = map
        .into_iter()
        .map(|(name, value)| serde_json::json!({ "name": name, "value": value }))
        .collect();
    Ok(serde_json::json!({ "template": { "data": data } }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_from_pairs(pairs: &[(&str, Value)]) -> Item {
        Item {
            href: None,
            data: pairs
                .iter()
                .map(|(name, value)| FieldPair {
                    name: (*name).to_string(),
                    value: value.clone(),
                })
                .collect(),
            links: Vec::new(),
        }
    }

    #[test]
    fn decode_item_preserves_order_and_unknown_fields() {
        let item = item_from_pairs(&[
            ("id", json!(7)),
            ("first_name", json!("Ada")),
            ("some_future_field", json!({"nested": true})),
        ]);

        let record = decode_item(&item).unwrap();
        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, vec!["id", "first_name", "some_future_field"]);
        assert_eq!(record.get_i64("id"), Some(7));
        assert_eq!(record.get("some_future_field"), Some(&json!({"nested": true})));
        assert!(!record.contains("last_name"));
    }

    #[test]
    fn decode_item_rejects_duplicate_names() {
        let item = item_from_pairs(&[("id", json!(1)), ("id", json!(2))]);
        assert_eq!(
            decode_item(&item),
            Err(EnvelopeError::DuplicateField("id".to_string()))
        );
    }

    #[test]
    fn null_value_is_present_but_null() {
        let item = item_from_pairs(&[("email", Value::Null)]);
        let record = decode_item(&item).unwrap();
        assert!(record.contains("email"));
        assert_eq!(record.get("email"), Some(&Value::Null));
    }

    #[test]
    fn empty_items_decode_to_empty_sequence() {
        let envelope = parse_envelope(br#"{"collection":{"items":[]}}"#).unwrap();
        let records = decode_collection(&envelope).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn decode_collection_yields_one_record_per_item() {
        let envelope = parse_envelope(
            br#"{"collection":{"version":"3.867.0","items":[
                {"data":[{"name":"id","value":1}]},
                {"data":[{"name":"id","value":2}]},
                {"data":[{"name":"id","value":3}]}
            ]}}"#,
        )
        .unwrap();
        let records = decode_collection(&envelope).unwrap();
        assert_eq!(records.len(), 3);
        let ids: Vec<_> = records.iter().map(|r| r.get_i64("id").unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn malformed_data_shape_fails_to_parse() {
        let result = parse_envelope(br#"{"collection":{"items":[{"data":{"id":1}}]}}"#);
        assert!(matches!(result, Err(EnvelopeError::Json(_))));
    }

    #[test]
    fn extract_link_finds_rel_or_signals_absence() {
        let links = vec![
            Link {
                rel: "next".into(),
                href: "https://api.example.com/teams/search?page=2".into(),
                prompt: None,
                deprecated: false,
            },
            Link {
                rel: "team".into(),
                href: "https://api.example.com/teams/1".into(),
                prompt: None,
                deprecated: false,
            },
        ];
        assert_eq!(
            extract_link(&links, "next"),
            Some("https://api.example.com/teams/search?page=2")
        );
        assert_eq!(extract_link(&links, "prev"), None);
    }

    #[test]
    fn template_round_trips_through_decode() {
        let fields = json!({
            "name": "Practice",
            "team_id": 456,
            "is_game": false,
        });

        let body = encode_template(&fields).unwrap();
        let data = body["template"]["data"].as_array().unwrap().clone();

        let item = Item {
            href: None,
            data: data
                .into_iter()
                .map(|pair| FieldPair {
                    name: pair["name"].as_str().unwrap().to_string(),
                    value: pair["value"].clone(),
                })
                .collect(),
            links: Vec::new(),
        };

        let record = decode_item(&item).unwrap();
        for (name, value) in fields.as_object().unwrap() {
            assert_eq!(record.get(name), Some(value));
        }
        assert_eq!(record.len(), fields.as_object().unwrap().len());
    }

    #[test]
    fn encode_template_rejects_non_objects() {
        assert_eq!(
            encode_template(&json!([1, 2, 3])),
            Err(EnvelopeError::TemplateNotAnObject)
        );
    }
}
