// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat field model for device snapshots.
//!
//! Shelly devices answer every status or configuration endpoint with a nested
//! JSON document. This module flattens such a document into a map of
//! path-derived field names, for example
//!
//! ```text
//! {"relays": [{"ison": true}]}        -> settings_relays_0_ison = true
//! {"switch:0": {"id": 0}}             -> configuration_switch_0_id = 0
//! ```
//!
//! Every leaf becomes a [`PropertyField`] with a [`FieldType`], and the values
//! of one fetch form a [`Snapshot`].
//!
//! # Examples
//!
//! ```
//! use shelly_bridge::field::{parse_snapshot, FieldValue};
//!
//! let snapshot = parse_snapshot("status", r#"{"temperature": 41.5, "meters": [{"power": 12}]}"#);
//! assert_eq!(snapshot.get("status_temperature"), Some(&FieldValue::Number(41.5)));
//! assert_eq!(snapshot.get("status_meters_0_power"), Some(&FieldValue::Number(12.0)));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Values of one fetched snapshot, keyed by field name.
pub type Snapshot = BTreeMap<String, FieldValue>;

/// Caller-supplied variable namespace that polling projects values into.
pub type Variables = HashMap<String, FieldValue>;

/// Type of a discovered leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// A string leaf.
    Text,
    /// A numeric leaf (integer or float).
    Number,
    /// A boolean leaf.
    Boolean,
}

/// A leaf value taken from a device snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// String value.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Returns the type of this value.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::Text(_) => FieldType::Text,
            Self::Number(_) => FieldType::Number,
            Self::Boolean(_) => FieldType::Boolean,
        }
    }

    /// Returns the numeric value, if this is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string value, if this is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    // Integral readings print like the device sends them: 230, not 230.0
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.fract().abs() < f64::EPSILON && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// One discoverable leaf of a device snapshot.
///
/// The name carries the whole path, so it also tells capability discovery
/// which entity (relay, cover, ...) and which index the value belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyField {
    name: String,
    kind: FieldType,
}

impl PropertyField {
    /// Creates a field descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Returns the path-derived field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value type.
    #[must_use]
    pub const fn kind(&self) -> FieldType {
        self.kind
    }
}

/// Parses a response body into a snapshot.
///
/// Anything that is not a JSON object yields an empty snapshot: a device that
/// answers garbage simply exposes no fields.
#[must_use]
pub fn parse_snapshot(prefix: &str, body: &str) -> Snapshot {
    parse_object(body).map_or_else(Snapshot::new, |value| flatten(prefix, &value))
}

/// Parses the top-level scalar values of a response body.
///
/// Keys are kept exactly as the device sent them and nested values are
/// skipped. Used for identification documents such as `/shelly`, where the
/// presence of a particular key matters.
///
/// # Examples
///
/// ```
/// use shelly_bridge::field::parse_top_level;
///
/// let probe = parse_top_level(r#"{"Model": "x", "gen": 2, "auth": {"en": false}}"#);
/// assert!(probe.contains_key("Model"));
/// assert!(!probe.contains_key("model"));
/// assert!(!probe.contains_key("auth"));
/// ```
#[must_use]
pub fn parse_top_level(body: &str) -> Snapshot {
    match parse_object(body) {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, value)| FieldValue::from_json(value).map(|v| (key.clone(), v)))
            .collect(),
        _ => Snapshot::new(),
    }
}

fn parse_object(body: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Response is not a JSON object");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Response is not valid JSON");
            None
        }
    }
}

/// Flattens a JSON value into path-derived field names below `prefix`.
///
/// `null` leaves are dropped. An empty prefix starts names at the first key.
#[must_use]
pub fn flatten(prefix: &str, value: &Value) -> Snapshot {
    let mut out = Snapshot::new();
    let root = sanitize(prefix);
    flatten_into(&root, value, &mut out);
    out
}

/// Returns the field descriptors of a snapshot.
#[must_use]
pub fn fields_of(snapshot: &Snapshot) -> BTreeSet<PropertyField> {
    snapshot
        .iter()
        .map(|(name, value)| PropertyField::new(name.clone(), value.field_type()))
        .collect()
}

fn flatten_into(path: &str, value: &Value, out: &mut Snapshot) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(&join(path, &sanitize(key)), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(&join(path, &index.to_string()), child, out);
            }
        }
        leaf => {
            if let Some(v) = FieldValue::from_json(leaf) {
                out.insert(path.to_string(), v);
            }
        }
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}_{segment}")
    }
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_nested_objects_and_arrays() {
        let value = json!({
            "relays": [{"ison": true, "source": "http"}, {"ison": false}],
            "wifi_sta": {"connected": true, "ip": "192.168.1.20"}
        });
        let snapshot = flatten("settings", &value);

        assert_eq!(
            snapshot.get("settings_relays_0_ison"),
            Some(&FieldValue::Boolean(true))
        );
        assert_eq!(
            snapshot.get("settings_relays_1_ison"),
            Some(&FieldValue::Boolean(false))
        );
        assert_eq!(
            snapshot.get("settings_wifi_sta_ip"),
            Some(&FieldValue::Text("192.168.1.20".to_string()))
        );
        assert_eq!(snapshot.len(), 5);
    }

    #[test]
    fn flatten_sanitizes_rpc_component_keys() {
        let value = json!({"switch:0": {"id": 0, "name": null}, "Cover:1": {"id": 1}});
        let snapshot = flatten("configuration", &value);

        assert!(snapshot.contains_key("configuration_switch_0_id"));
        assert!(snapshot.contains_key("configuration_cover_1_id"));
        // null leaves are dropped
        assert!(!snapshot.contains_key("configuration_switch_0_name"));
    }

    #[test]
    fn flatten_without_prefix() {
        let snapshot = flatten("", &json!({"type": "SHSW-1"}));
        assert_eq!(
            snapshot.get("type"),
            Some(&FieldValue::Text("SHSW-1".to_string()))
        );
    }

    #[test]
    fn parse_snapshot_rejects_non_objects() {
        assert!(parse_snapshot("status", "not json").is_empty());
        assert!(parse_snapshot("status", "[1, 2, 3]").is_empty());
        assert!(parse_snapshot("status", "42").is_empty());
        assert!(parse_snapshot("status", "").is_empty());
    }

    #[test]
    fn top_level_keeps_key_case() {
        let probe = parse_top_level(r#"{"Model": "SNSW-001X16EU", "name": null, "type": "SHSW-1"}"#);

        assert_eq!(probe.len(), 2);
        assert!(probe.contains_key("Model"));
        assert!(!probe.contains_key("model"));
        assert_eq!(probe.get("type"), Some(&FieldValue::Text("SHSW-1".to_string())));
    }

    #[test]
    fn top_level_rejects_non_objects() {
        assert!(parse_top_level("[{\"model\": 1}]").is_empty());
        assert!(parse_top_level("<html>").is_empty());
    }

    #[test]
    fn fields_carry_value_types() {
        let snapshot = parse_snapshot("shelly", r#"{"type": "SHSW-1", "auth": false, "num_outputs": 1}"#);
        let fields = fields_of(&snapshot);

        assert!(fields.contains(&PropertyField::new("shelly_type", FieldType::Text)));
        assert!(fields.contains(&PropertyField::new("shelly_auth", FieldType::Boolean)));
        assert!(fields.contains(&PropertyField::new("shelly_num_outputs", FieldType::Number)));
    }

    #[test]
    fn number_display() {
        assert_eq!(FieldValue::Number(230.0).to_string(), "230");
        assert_eq!(FieldValue::Number(0.97).to_string(), "0.97");
        assert_eq!(FieldValue::Number(-12.0).to_string(), "-12");
        assert_eq!(FieldValue::Number(230.5).to_string(), "230.5");
        assert_eq!(FieldValue::Boolean(true).to_string(), "true");
    }

    #[test]
    fn field_value_accessors() {
        assert_eq!(FieldValue::Number(1.5).as_f64(), Some(1.5));
        assert_eq!(FieldValue::Text("on".into()).as_str(), Some("on"));
        assert_eq!(FieldValue::Boolean(false).as_bool(), Some(false));
        assert_eq!(FieldValue::Boolean(false).as_f64(), None);
    }
}
