use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::OrderId;

/// Caller-supplied fields of a registration request.
///
/// Every field is opaque to the service. Missing fields decode as empty
/// strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewOrder {
    /// Owner name.
    pub name: String,
    pub email: String,
    /// Maximum-order bound.
    pub max: String,
    /// Time limit.
    pub time: String,
}

const FIELD_NAMES: [&str; 4] = ["name", "email", "max", "time"];

impl NewOrder {
    /// Decode a registration body.
    ///
    /// Only the first JSON value in `body` is read and anything after it is
    /// ignored. A `null` body or field leaves the empty default in place.
    /// Field names match case-insensitively; an exact match wins over a
    /// folded one.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value = match serde_json::Deserializer::from_slice(body)
            .into_iter::<Value>()
            .next()
        {
            Some(value) => value?,
            // Empty body: let the decoder report its EOF error.
            None => serde_json::from_slice::<Value>(body)?,
        };

        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(fields) => serde_json::from_value(Value::Object(fold_field_names(fields))),
            other => Err(serde::de::Error::custom(format!(
                "expected an order object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Keep only the known fields, keyed by their canonical names.
fn fold_field_names(mut fields: Map<String, Value>) -> Map<String, Value> {
    let mut folded = Map::new();
    for field in FIELD_NAMES {
        let key = if fields.contains_key(field) {
            Some(field.to_owned())
        } else {
            fields.keys().find(|k| k.eq_ignore_ascii_case(field)).cloned()
        };
        if let Some(value) = key.and_then(|k| fields.remove(&k)) {
            if !value.is_null() {
                folded.insert(field.to_owned(), value);
            }
        }
    }
    folded
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A registered order. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    pub name: String,
    pub email: String,
    pub max: String,
    pub time: String,
}

impl OrderRecord {
    pub fn new(order_id: OrderId, order: NewOrder) -> Self {
        let NewOrder {
            name,
            email,
            max,
            time,
        } = order;
        Self {
            order_id,
            name,
            email,
            max,
            time,
        }
    }

    /// Whether this record carries the given caller fields unchanged.
    pub fn matches(&self, order: &NewOrder) -> bool {
        self.name == order.name
            && self.email == order.email
            && self.max == order.max
            && self.time == order.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ana() -> NewOrder {
        NewOrder {
            name: "Ana".into(),
            email: "a@x.com".into(),
            max: "10".into(),
            time: "1h".into(),
        }
    }

    #[test]
    fn new_order_decodes_wire_fields() {
        let order: NewOrder =
            serde_json::from_value(json!({"name":"Ana","email":"a@x.com","max":"10","time":"1h"}))
                .unwrap();
        assert_eq!(order, ana());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let order: NewOrder = serde_json::from_value(json!({"name": "Bo"})).unwrap();
        assert_eq!(order.name, "Bo");
        assert!(order.email.is_empty());
        assert!(order.max.is_empty());
        assert!(order.time.is_empty());
    }

    #[test]
    fn non_string_field_is_rejected() {
        let result = serde_json::from_value::<NewOrder>(json!({"max": 10}));
        assert!(result.is_err());
    }

    #[test]
    fn decode_matches_field_names_case_insensitively() {
        let order = NewOrder::decode(br#"{"Name":"Ana","EMAIL":"a@x.com","Max":"10","tImE":"1h"}"#).unwrap();
        assert_eq!(order, ana());
    }

    #[test]
    fn decode_prefers_exact_field_name() {
        let order = NewOrder::decode(br#"{"NAME":"folded","name":"exact"}"#).unwrap();
        assert_eq!(order.name, "exact");
    }

    #[test]
    fn decode_null_body_and_null_fields_give_defaults() {
        assert_eq!(NewOrder::decode(b"null").unwrap(), NewOrder::default());

        let order = NewOrder::decode(br#"{"name":null,"email":"a@x.com"}"#).unwrap();
        assert!(order.name.is_empty());
        assert_eq!(order.email, "a@x.com");
    }

    #[test]
    fn decode_reads_only_the_first_value() {
        let order = NewOrder::decode(br#"{"name":"Ana"} {"name":"Bo"} trailing"#).unwrap();
        assert_eq!(order.name, "Ana");
    }

    #[test]
    fn decode_ignores_unknown_fields_and_client_order_id() {
        let order = NewOrder::decode(br#"{"name":"Ana","orderId":"XXXXX","extra":1}"#).unwrap();
        assert_eq!(order.name, "Ana");
    }

    #[test]
    fn decode_rejects_empty_body_non_objects_and_wrong_types() {
        let err = NewOrder::decode(b"").unwrap_err();
        assert!(err.to_string().contains("EOF"), "got: {err}");

        let err = NewOrder::decode(br#"["Ana","a@x.com"]"#).unwrap_err();
        assert!(err.to_string().contains("found array"), "got: {err}");

        assert!(NewOrder::decode(br#"{"max":10}"#).is_err());
        assert!(NewOrder::decode(b"{not json").is_err());
    }

    #[test]
    fn record_serializes_with_order_id_key() {
        let record = OrderRecord::new(OrderId::from_raw("AB12Z"), ana());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"orderId":"AB12Z","name":"Ana","email":"a@x.com","max":"10","time":"1h"})
        );
    }

    #[test]
    fn record_matches_its_source_order() {
        let record = OrderRecord::new(OrderId::from_raw("AB12Z"), ana());
        assert!(record.matches(&ana()));

        let other = NewOrder {
            time: "2h".into(),
            ..ana()
        };
        assert!(!record.matches(&other));
    }
}
