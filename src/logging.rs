use log::Level;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
}

impl LogLevel {
    pub fn to_level(self) -> Level {
        match self {
            Self::Debug => Level::Debug,
            Self::Info => Level::Info,
        }
    }
}

/// Builds the JSON object for one event: `event` first, then the caller's fields.
/// Non-object `fields` are ignored.
pub fn event_payload(event: &str, fields: Value) -> Value {
    let mut payload = Map::new();
    payload.insert("event".to_string(), Value::String(event.to_string()));

    if let Value::Object(extra) = fields {
        for (key, value) in extra {
            if key != "event" {
                payload.insert(key, value);
            }
        }
    }

    Value::Object(payload)
}

pub fn log_event(level: Level, event: &str, fields: Value) {
    if !log::log_enabled!(level) {
        return;
    }

    log::log!(level, "{}", event_payload(event, fields));
}

#[cfg(target_arch = "wasm32")]
pub fn init(level: LogLevel) {
    console_error_panic_hook::set_once();
    console_log::init_with_level(level.to_level()).expect("error initializing log");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_merges_fields_after_event_name() {
        let payload = event_payload(
            "active_section_changed",
            json!({ "from": "home", "to": "services" }),
        );

        assert_eq!(payload["event"], "active_section_changed");
        assert_eq!(payload["from"], "home");
        assert_eq!(payload["to"], "services");
    }

    #[test]
    fn payload_keeps_event_name_when_fields_collide() {
        let payload = event_payload("counter_armed", json!({ "event": "spoofed" }));
        assert_eq!(payload["event"], "counter_armed");

        let bare = event_payload("site_mounted", Value::Null);
        assert_eq!(bare, json!({ "event": "site_mounted" }));
    }

    #[test]
    fn log_level_maps_onto_log_facade() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Debug.to_level(), Level::Debug);
        assert_eq!(LogLevel::Info.to_level(), Level::Info);
    }
}
