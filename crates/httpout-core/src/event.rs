//! Event records as received from the ingestion pipeline.
//!
//! An [`Event`] is a JSON object. A batch is an ordered slice of events; it is
//! built fresh for every publish call and never outlives it.

use serde_json::{Map, Value};

/// A single event record: field name to arbitrary JSON value.
pub type Event = Map<String, Value>;

/// Writes every custom field into every event.
///
/// Custom fields win: an event field with the same key is overwritten.
pub fn merge_fields(events: &mut [Event], fields: &Event) {
    if fields.is_empty() {
        return;
    }
    for event in events.iter_mut() {
        for (key, value) in fields {
            event.insert(key.clone(), value.clone());
        }
    }
}

/// Converts a batch into the JSON array that replaces a placeholder.
pub fn batch_value(events: &[Event]) -> Value {
    Value::Array(events.iter().cloned().map(Value::Object).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> Event {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_custom_fields_win() {
        let mut events = vec![
            event(json!({"msg": "a", "env": "dev"})),
            event(json!({"msg": "b"})),
        ];
        let fields = event(json!({"env": "prod"}));

        merge_fields(&mut events, &fields);

        assert_eq!(events[0]["env"], "prod");
        assert_eq!(events[0]["msg"], "a");
        assert_eq!(events[1]["env"], "prod");
    }

    #[test]
    fn test_merge_without_fields_is_noop() {
        let mut events = vec![event(json!({"msg": "a"}))];
        merge_fields(&mut events, &Event::new());
        assert_eq!(events[0], event(json!({"msg": "a"})));
    }

    #[test]
    fn test_batch_value_keeps_order() {
        let events = vec![event(json!({"n": 1})), event(json!({"n": 2}))];
        assert_eq!(batch_value(&events), json!([{"n": 1}, {"n": 2}]));
        assert_eq!(batch_value(&[]), json!([]));
    }
}
