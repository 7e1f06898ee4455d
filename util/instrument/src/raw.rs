//! The raw (foreign) design representation.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::value::CodedValue;

/// A raw identifier: an integer request, a symbolic name, or an already
/// resolved actual id.
///
/// Integers and actual ids request a concrete identifier value; how the
/// request is honoured depends on the identity strategy. Names never
/// collide with integers: the same name resolves to the same id across
/// one load, different names never share one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawId {
    Int(u64),
    Name(String),
    Actual(u64),
}

impl RawId {
    /// The requested integer value, for integer and actual ids.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            RawId::Int(value) | RawId::Actual(value) => Some(*value),
            RawId::Name(_) => None,
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RawId::Int(value) | RawId::Actual(value) => write!(f, "{value}"),
            RawId::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

impl From<u64> for RawId {
    fn from(value: u64) -> Self {
        RawId::Int(value)
    }
}

impl From<&str> for RawId {
    fn from(name: &str) -> Self {
        RawId::Name(name.to_string())
    }
}

impl Serialize for RawId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawId::Int(value) | RawId::Actual(value) => serializer.serialize_u64(*value),
            RawId::Name(name) => serializer.serialize_str(name),
        }
    }
}

struct RawIdVisitor;

impl Visitor<'_> for RawIdVisitor {
    type Value = RawId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an unsigned integer or a string identifier")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<RawId, E> {
        Ok(RawId::Int(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<RawId, E> {
        u64::try_from(value)
            .map(RawId::Int)
            .map_err(|_| E::custom("identifier must not be negative"))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<RawId, E> {
        Ok(RawId::Name(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for RawId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<RawId, D::Error> {
        deserializer.deserialize_any(RawIdVisitor)
    }
}

/// Raw structural component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawStructure {
    /// `"unstructured"`, `"node"` or `"edge"`.
    pub kind: String,
    /// Object references; exactly two for edges, none otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<RawId>,
}

impl RawStructure {
    /// A node structure.
    pub fn node() -> Self {
        RawStructure {
            kind: "node".to_string(),
            references: Vec::new(),
        }
    }

    /// An unstructured component.
    pub fn unstructured() -> Self {
        RawStructure {
            kind: "unstructured".to_string(),
            references: Vec::new(),
        }
    }

    /// An edge between two raw object references.
    pub fn edge(origin: impl Into<RawId>, target: impl Into<RawId>) -> Self {
        RawStructure {
            kind: "edge".to_string(),
            references: vec![origin.into(), target.into()],
        }
    }
}

/// One raw object snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Object type name; required by the loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Raw snapshot identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<RawId>,
    /// Raw object identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    /// Structural component; inferred from the type when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<RawStructure>,
    /// Raw reference to the parent object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<RawId>,
    /// Attribute values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, CodedValue>,
}

/// One raw frame: a list of snapshot references.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    /// Raw frame identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    /// Raw snapshot ids contained in the frame.
    #[serde(default)]
    pub snapshots: Vec<RawId>,
}

/// A named reference to a single entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawReference {
    pub name: String,
    /// Referenced entity type, e.g. `"frame"`.
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: RawId,
}

/// A named list of entity references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawList {
    pub name: String,
    /// Type of the listed entities, e.g. `"frame"`.
    pub item_type: String,
    pub ids: Vec<RawId>,
}

/// The complete raw form of a design.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDesign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metamodel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metamodel_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snapshots: Vec<RawSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<RawFrame>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_references: Vec<RawReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_references: Vec<RawReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_lists: Vec<RawList>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_lists: Vec<RawList>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ids_round_trip_as_bare_values() {
        let int: RawId = serde_json::from_str("12").unwrap();
        assert_eq!(int, RawId::Int(12));
        let name: RawId = serde_json::from_str("\"main\"").unwrap();
        assert_eq!(name, RawId::Name("main".to_string()));

        assert_eq!(serde_json::to_string(&RawId::Int(12)).unwrap(), "12");
        assert_eq!(serde_json::to_string(&RawId::Actual(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&RawId::Name("main".to_string())).unwrap(),
            "\"main\""
        );
    }

    #[test]
    fn absent_collections_default_to_empty() {
        let design: RawDesign = serde_json::from_str("{}").unwrap();
        assert!(design.snapshots.is_empty());
        assert!(design.frames.is_empty());
        assert!(design.system_references.is_empty());
    }

    #[test]
    fn snapshot_fields_are_optional() {
        let snapshot: RawSnapshot = serde_json::from_str(
            r#"{ "type_name": "Stock", "id": 10, "structure": { "kind": "node" } }"#,
        )
        .unwrap();
        assert_eq!(snapshot.type_name.as_deref(), Some("Stock"));
        assert_eq!(snapshot.id, Some(RawId::Int(10)));
        assert_eq!(snapshot.structure, Some(RawStructure::node()));
        assert_eq!(snapshot.snapshot_id, None);
    }
}
