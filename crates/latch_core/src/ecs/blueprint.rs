// blueprint.rs - Data-authored entity descriptions
//
// A Blueprint is the flat, ordered component list for one entity. A
// BlueprintTree adds ordered children, so a whole entity subgraph can be
// authored as data. Order is significant everywhere: it is the order in
// which systems see create and post-create calls.

use crate::hash::{hash, HashValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier tagging a component definition with the system that owns it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "DefKey")]
pub struct DefType(HashValue);

impl DefType {
    #[inline]
    pub const fn from_raw(raw: HashValue) -> Self {
        Self(raw)
    }

    /// Definition type for a stable name such as `"TransformDef"`.
    #[inline]
    pub const fn of(name: &str) -> Self {
        Self(hash(name))
    }

    #[inline]
    pub const fn raw(self) -> HashValue {
        self.0
    }
}

impl fmt::Display for DefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// On-disk spelling of a definition type: a name or an already hashed id.
#[derive(Deserialize)]
#[serde(untagged)]
enum DefKey {
    Id(HashValue),
    Name(String),
}

impl From<DefKey> for DefType {
    fn from(key: DefKey) -> Self {
        match key {
            DefKey::Id(raw) => DefType::from_raw(raw),
            DefKey::Name(name) => DefType::of(&name),
        }
    }
}

#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("malformed blueprint data: {0}")]
    Json(#[from] serde_json::Error),
}

/// One component definition: its type tag and the payload handed to the
/// owning system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    #[serde(rename = "def")]
    def_type: DefType,
    #[serde(default)]
    data: serde_json::Value,
}

impl ComponentDef {
    pub fn new(def_type: DefType, data: serde_json::Value) -> Self {
        Self { def_type, data }
    }

    /// Build a definition from a serializable payload.
    pub fn from_payload<T: Serialize>(
        def_type: DefType,
        payload: &T,
    ) -> Result<Self, BlueprintError> {
        Ok(Self::new(def_type, serde_json::to_value(payload)?))
    }

    #[inline]
    pub fn def_type(&self) -> DefType {
        self.def_type
    }

    #[inline]
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Deserialize the payload into the owning system's definition type.
    pub fn read<T: DeserializeOwned>(&self) -> Result<T, BlueprintError> {
        Ok(T::deserialize(&self.data)?)
    }
}

/// Transform from a blueprint into a finalized byte buffer.
pub type Finalizer = dyn Fn(&Blueprint) -> Vec<u8> + Send + Sync;

/// Ordered component definitions for a single entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blueprint {
    components: Vec<ComponentDef>,
}

impl Blueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, def_type: DefType, data: serde_json::Value) -> Self {
        self.push(ComponentDef::new(def_type, data));
        self
    }

    pub fn push(&mut self, component: ComponentDef) {
        self.components.push(component);
    }

    /// Visit every component definition in authored order.
    pub fn for_each_component<F>(&self, f: F)
    where
        F: FnMut(&ComponentDef),
    {
        self.components.iter().for_each(f);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDef> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Run `finalizer` over this blueprint.
    pub fn finalize(&self, finalizer: &Finalizer) -> Vec<u8> {
        finalizer(self)
    }
}

impl FromIterator<ComponentDef> for Blueprint {
    fn from_iter<I: IntoIterator<Item = ComponentDef>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}

/// A blueprint plus ordered child blueprints.
///
/// On disk:
/// ```json
/// { "components": [ { "def": "TransformDef", "data": { } } ],
///   "children":   [ { "components": [ ] } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintTree {
    #[serde(default)]
    components: Blueprint,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<BlueprintTree>,
}

impl BlueprintTree {
    pub fn new(blueprint: Blueprint) -> Self {
        Self {
            components: blueprint,
            children: Vec::new(),
        }
    }

    /// Builder-style child append. Children are created in insertion order.
    pub fn with_child(mut self, child: BlueprintTree) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: BlueprintTree) {
        self.children.push(child);
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.components
    }

    pub fn blueprint_mut(&mut self) -> &mut Blueprint {
        &mut self.components
    }

    pub fn children(&self) -> &[BlueprintTree] {
        &self.children
    }

    /// Number of entities described by this tree, including the root.
    pub fn entity_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(BlueprintTree::entity_count)
            .sum::<usize>()
    }
}

impl From<Blueprint> for BlueprintTree {
    fn from(blueprint: Blueprint) -> Self {
        Self::new(blueprint)
    }
}

/// Default decoder: JSON bytes to a blueprint tree.
pub fn decode_json(bytes: &[u8]) -> Result<BlueprintTree, BlueprintError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Default finalizer: a single-node tree encoded as JSON, readable by
/// [`decode_json`].
pub fn encode_json(blueprint: &Blueprint) -> Vec<u8> {
    #[derive(Serialize)]
    struct Node<'a> {
        components: &'a Blueprint,
    }

    match serde_json::to_vec(&Node {
        components: blueprint,
    }) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("failed to encode blueprint: {err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TRANSFORM: DefType = DefType::of("TransformDef");
    const RENDER: DefType = DefType::of("RenderDef");

    #[test]
    fn decodes_names_and_raw_ids() {
        let raw = RENDER.raw();
        let text = format!(
            r#"{{ "components": [
                {{ "def": "TransformDef", "data": {{ "x": 1.5 }} }},
                {{ "def": {raw} }}
            ] }}"#
        );
        let tree = decode_json(text.as_bytes()).unwrap();

        let defs: Vec<_> = tree.blueprint().iter().map(ComponentDef::def_type).collect();
        assert_eq!(defs, vec![TRANSFORM, RENDER]);
        assert_eq!(tree.blueprint().iter().nth(1).unwrap().data(), &json!(null));
        assert!(tree.children().is_empty());
    }

    #[test]
    fn children_keep_authored_order() {
        let text = br#"{
            "components": [ { "def": "TransformDef" } ],
            "children": [
                { "components": [ { "def": "RenderDef", "data": "first" } ] },
                { "components": [ { "def": "RenderDef", "data": "second" } ],
                  "children": [ { } ] }
            ]
        }"#;
        let tree = decode_json(text).unwrap();

        let labels: Vec<_> = tree
            .children()
            .iter()
            .map(|child| child.blueprint().iter().next().unwrap().data().clone())
            .collect();
        assert_eq!(labels, vec![json!("first"), json!("second")]);
        assert_eq!(tree.entity_count(), 4);
    }

    #[test]
    fn malformed_data_is_an_error() {
        assert!(matches!(
            decode_json(b"{ \"components\": 3 }"),
            Err(BlueprintError::Json(_))
        ));
    }

    #[test]
    fn typed_payload_reads_back() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct TransformDef {
            x: f32,
            y: f32,
        }

        let def = ComponentDef::from_payload(TRANSFORM, &TransformDef { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(def.read::<TransformDef>().unwrap(), TransformDef { x: 1.0, y: 2.0 });
        assert!(def.read::<Vec<u8>>().is_err());
    }

    #[test]
    fn finalized_json_reloads_as_tree() {
        let blueprint = Blueprint::new()
            .with(TRANSFORM, json!({ "x": 3 }))
            .with(RENDER, json!(null));

        let bytes = blueprint.finalize(&encode_json);
        let tree = decode_json(&bytes).unwrap();
        assert_eq!(tree.blueprint(), &blueprint);
    }
}
