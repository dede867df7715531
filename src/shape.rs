//! Structural description of a CRD spec type.
//!
//! A [`Shape`] is compiled once from the JSON schema `schemars` derives for a
//! spec struct. It then drives three things:
//!
//! - the provider schema block for the `spec` attribute ([`ObjectShape::to_block`]),
//! - the camelCase API JSON to snake_case state mapping ([`Shape::to_state`]),
//! - and back ([`Shape::from_state`]).
//!
//! Map keys (labels, template data, ...) are user data and are never renamed.

use schemars::JsonSchema;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ProviderError;
use crate::naming::to_snake_case;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Block, NestedBlock};

/// The structural type of one value inside a spec.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A string (also used for enum-like fields).
    String,
    /// An integer.
    Int,
    /// A floating point number.
    Float,
    /// A boolean.
    Bool,
    /// Free-form JSON.
    Any,
    /// A list of values.
    List(Box<Shape>),
    /// A map with user-defined string keys.
    Map(Box<Shape>),
    /// A record with a fixed set of fields.
    Object(ObjectShape),
}

/// A record with named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    /// Fields, sorted by attribute name.
    pub fields: Vec<Field>,
    /// Description from the type's doc comment.
    pub description: Option<String>,
}

/// One field of an [`ObjectShape`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The field name on the Kubernetes API (camelCase).
    pub json_name: String,
    /// The provider attribute name (snake_case).
    pub attr_name: String,
    /// The field's value shape.
    pub shape: Shape,
    /// Whether the CRD requires the field.
    pub required: bool,
    /// Description from the field's doc comment.
    pub description: Option<String>,
}

/// How a block should be exposed in a data source schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// The user writes the object: required fields are required, the rest optional.
    Manifest,
    /// The provider fills the object from the cluster: everything is computed.
    Computed,
}

impl Shape {
    /// Compile the shape of a spec type from its JSON schema.
    pub fn of<T: JsonSchema>() -> Result<Shape, ProviderError> {
        let root = serde_json::to_value(schemars::schema_for!(T))?;
        Compiler::new(&root).compile(&root)
    }

    /// The object shape, if this is a record.
    pub fn as_object(&self) -> Option<&ObjectShape> {
        match self {
            Shape::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The attribute type used when this shape is exposed as an attribute.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Shape::String => AttributeType::String,
            Shape::Int => AttributeType::Int64,
            Shape::Float => AttributeType::Float64,
            Shape::Bool => AttributeType::Bool,
            Shape::Any => AttributeType::Dynamic,
            Shape::List(inner) => AttributeType::list(inner.attribute_type()),
            Shape::Map(inner) => AttributeType::map(inner.attribute_type()),
            Shape::Object(obj) => AttributeType::object(
                obj.fields
                    .iter()
                    .map(|f| (f.attr_name.clone(), f.shape.attribute_type()))
                    .collect(),
            ),
        }
    }

    /// Map API JSON (camelCase) into provider state (snake_case).
    ///
    /// Every declared field is present in the result, null when unset.
    pub fn to_state(&self, value: &Value) -> Value {
        match (self, value) {
            (Shape::Object(obj), Value::Object(map)) => {
                let mut out = Map::new();
                for field in &obj.fields {
                    let inner = map.get(&field.json_name).unwrap_or(&Value::Null);
                    out.insert(field.attr_name.clone(), field.shape.to_state(inner));
                }
                Value::Object(out)
            },
            (Shape::List(inner), Value::Array(items)) => {
                Value::Array(items.iter().map(|item| inner.to_state(item)).collect())
            },
            (Shape::Map(inner), Value::Object(entries)) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), inner.to_state(v)))
                    .collect(),
            ),
            (_, other) => other.clone(),
        }
    }

    /// Map provider state (snake_case) back into API JSON (camelCase).
    ///
    /// Null values are dropped.
    pub fn from_state(&self, state: &Value) -> Value {
        match (self, state) {
            (Shape::Object(obj), Value::Object(map)) => {
                let mut out = Map::new();
                for field in &obj.fields {
                    let Some(inner) = map.get(&field.attr_name) else {
                        continue;
                    };
                    let converted = field.shape.from_state(inner);
                    if !converted.is_null() {
                        out.insert(field.json_name.clone(), converted);
                    }
                }
                Value::Object(out)
            },
            (Shape::List(inner), Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| inner.from_state(item))
                    .filter(|v| !v.is_null())
                    .collect(),
            ),
            (Shape::Map(inner), Value::Object(entries)) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), inner.from_state(v)))
                    .filter(|(_, v)| !v.is_null())
                    .collect(),
            ),
            (_, other) => other.clone(),
        }
    }
}

impl ObjectShape {
    /// Compile the shape of a spec type, which must be a record.
    pub fn of<T: JsonSchema>() -> Result<ObjectShape, ProviderError> {
        match Shape::of::<T>()? {
            Shape::Object(obj) => Ok(obj),
            other => Err(ProviderError::Schema(format!(
                "{} is not an object type (compiled to {:?})",
                T::schema_name(),
                other
            ))),
        }
    }

    /// Look up a field by its attribute name.
    pub fn field(&self, attr_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.attr_name == attr_name)
    }

    /// Build the provider schema block for this record.
    ///
    /// Records become single nested blocks; lists and maps of records become
    /// list and map blocks; everything else is an attribute.
    pub fn to_block(&self, mode: BlockMode) -> Block {
        let mut block = Block::new();
        if let Some(description) = &self.description {
            block = block.with_description(description.clone());
        }

        for field in &self.fields {
            let required = mode == BlockMode::Manifest && field.required;
            let nested = match &field.shape {
                Shape::Object(obj) => Some(NestedBlock::single(obj.to_block(mode))),
                Shape::List(inner) => inner
                    .as_object()
                    .map(|obj| NestedBlock::list(obj.to_block(mode))),
                Shape::Map(inner) => inner
                    .as_object()
                    .map(|obj| NestedBlock::map(obj.to_block(mode))),
                _ => None,
            };

            match nested {
                Some(mut nested) => {
                    if let Some(description) = &field.description {
                        nested.block.description = Some(description.clone());
                    }
                    if required {
                        nested = nested.with_min_items(1);
                    }
                    block = block.with_block(field.attr_name.clone(), nested);
                },
                None => {
                    let flags = match (mode, required) {
                        (BlockMode::Computed, _) => AttributeFlags::computed(),
                        (BlockMode::Manifest, true) => AttributeFlags::required(),
                        (BlockMode::Manifest, false) => AttributeFlags::optional(),
                    };
                    let mut attr = Attribute::new(field.shape.attribute_type(), flags);
                    attr.description = field.description.clone();
                    block = block.with_attribute(field.attr_name.clone(), attr);
                },
            }
        }

        block
    }
}

/// Remove null values from objects, recursively.
pub fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_nulls).collect()),
        other => other,
    }
}

struct Compiler<'a> {
    root: &'a Value,
    defs: BTreeMap<&'a str, &'a Value>,
    // References currently being expanded; a repeat means a recursive type.
    expanding: Vec<String>,
}

impl<'a> Compiler<'a> {
    fn new(root: &'a Value) -> Self {
        let mut defs = BTreeMap::new();
        for key in ["$defs", "definitions"] {
            if let Some(map) = root.get(key).and_then(Value::as_object) {
                for (name, schema) in map {
                    defs.insert(name.as_str(), schema);
                }
            }
        }
        Self {
            root,
            defs,
            expanding: vec!["#".to_string()],
        }
    }

    fn resolve(&self, reference: &str) -> Result<&'a Value, ProviderError> {
        if reference == "#" {
            return Ok(self.root);
        }
        let name = reference
            .strip_prefix("#/$defs/")
            .or_else(|| reference.strip_prefix("#/definitions/"))
            .ok_or_else(|| ProviderError::Schema(format!("unsupported $ref: {}", reference)))?;
        self.defs
            .get(name)
            .copied()
            .ok_or_else(|| ProviderError::Schema(format!("unresolved $ref: {}", reference)))
    }

    fn compile(&mut self, schema: &'a Value) -> Result<Shape, ProviderError> {
        let obj = match schema {
            Value::Object(obj) => obj,
            // `true` / `false` schemas
            _ => return Ok(Shape::Any),
        };

        if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            if self.expanding.iter().any(|r| r == reference) {
                return Ok(Shape::Any);
            }
            let target = self.resolve(reference)?;
            self.expanding.push(reference.to_string());
            let shape = self.compile(target);
            self.expanding.pop();
            return shape;
        }

        for key in ["anyOf", "oneOf", "allOf"] {
            if let Some(variants) = obj.get(key).and_then(Value::as_array) {
                // Option<T> is `anyOf: [T, null]`; string enums are `oneOf` of consts.
                return match variants.iter().find(|v| !is_null_schema(v)) {
                    Some(variant) => self.compile(variant),
                    None => Ok(Shape::Any),
                };
            }
        }

        if let Some(constant) = obj.get("const") {
            return Ok(shape_of_literal(constant));
        }
        if let Some(first) = obj
            .get("enum")
            .and_then(Value::as_array)
            .and_then(|values| values.iter().find(|v| !v.is_null()))
        {
            return Ok(shape_of_literal(first));
        }

        match primary_type(obj) {
            Some("string") => Ok(Shape::String),
            Some("integer") => Ok(Shape::Int),
            Some("number") => Ok(Shape::Float),
            Some("boolean") => Ok(Shape::Bool),
            Some("array") => {
                let items = obj.get("items").unwrap_or(&Value::Bool(true));
                Ok(Shape::List(Box::new(self.compile(items)?)))
            },
            Some("object") | None => self.compile_object(obj),
            Some(_) => Ok(Shape::Any),
        }
    }

    fn compile_object(&mut self, obj: &'a Map<String, Value>) -> Result<Shape, ProviderError> {
        let properties = match obj.get("properties").and_then(Value::as_object) {
            Some(properties) => properties,
            None => {
                return match obj.get("additionalProperties") {
                    Some(extra @ Value::Object(map)) if !map.is_empty() => {
                        Ok(Shape::Map(Box::new(self.compile(extra)?)))
                    },
                    _ => Ok(Shape::Any),
                };
            },
        };

        let required: Vec<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = Vec::with_capacity(properties.len());
        for (json_name, property) in properties {
            let shape = self.compile(property)?;
            let description = description_of(property)
                .or_else(|| shape.as_object().and_then(|o| o.description.clone()));
            fields.push(Field {
                json_name: json_name.clone(),
                attr_name: to_snake_case(json_name),
                shape,
                required: required.contains(&json_name.as_str()),
                description,
            });
        }
        fields.sort_by(|a, b| a.attr_name.cmp(&b.attr_name));

        Ok(Shape::Object(ObjectShape {
            fields,
            description: description_of_map(obj),
        }))
    }
}

fn primary_type(obj: &Map<String, Value>) -> Option<&str> {
    match obj.get("type")? {
        Value::String(t) => Some(t.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
        || schema.get("const").is_some_and(Value::is_null)
}

fn shape_of_literal(value: &Value) -> Shape {
    match value {
        Value::Bool(_) => Shape::Bool,
        Value::Number(n) if n.is_f64() => Shape::Float,
        Value::Number(_) => Shape::Int,
        Value::String(_) => Shape::String,
        _ => Shape::Any,
    }
}

fn description_of(schema: &Value) -> Option<String> {
    schema.as_object().and_then(description_of_map)
}

fn description_of_map(obj: &Map<String, Value>) -> Option<String> {
    obj.get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BlockNestingMode;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        /// Name of the target secret.
        secret_name: String,
        refresh_interval: Option<String>,
        data: Option<Vec<Entry>>,
        labels: Option<BTreeMap<String, String>>,
        target: Option<Target>,
        extra: Option<serde_json::Value>,
        length: Option<i64>,
        ratio: Option<f64>,
        namespaces: Option<Vec<String>>,
    }

    #[derive(Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct Entry {
        secret_key: String,
        remote_ref: Option<RemoteRef>,
    }

    #[derive(Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct RemoteRef {
        key: String,
        #[serde(rename = "accessKeyID")]
        access_key_id: Option<String>,
    }

    /// Where the generated secret goes.
    #[derive(Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct Target {
        name: Option<String>,
        immutable: Option<bool>,
    }

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct Node {
        name: Option<String>,
        children: Option<Vec<Node>>,
    }

    fn sample() -> ObjectShape {
        ObjectShape::of::<Sample>().unwrap()
    }

    #[test]
    fn test_compile_field_names_and_types() {
        let shape = sample();

        let names: Vec<&str> = shape.fields.iter().map(|f| f.attr_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "data",
                "extra",
                "labels",
                "length",
                "namespaces",
                "ratio",
                "refresh_interval",
                "secret_name",
                "target"
            ]
        );

        assert_eq!(shape.field("secret_name").unwrap().shape, Shape::String);
        assert_eq!(shape.field("length").unwrap().shape, Shape::Int);
        assert_eq!(shape.field("ratio").unwrap().shape, Shape::Float);
        assert_eq!(shape.field("extra").unwrap().shape, Shape::Any);
        assert_eq!(
            shape.field("labels").unwrap().shape,
            Shape::Map(Box::new(Shape::String))
        );
        assert_eq!(
            shape.field("namespaces").unwrap().shape,
            Shape::List(Box::new(Shape::String))
        );
        assert!(matches!(shape.field("target").unwrap().shape, Shape::Object(_)));
    }

    #[test]
    fn test_compile_required_and_descriptions() {
        let shape = sample();
        let secret_name = shape.field("secret_name").unwrap();
        assert!(secret_name.required);
        assert_eq!(
            secret_name.description.as_deref(),
            Some("Name of the target secret.")
        );
        assert!(!shape.field("refresh_interval").unwrap().required);

        let target = shape.field("target").unwrap();
        assert_eq!(
            target.description.as_deref(),
            Some("Where the generated secret goes.")
        );
    }

    #[test]
    fn test_compile_acronym_field() {
        let shape = sample();
        let Shape::List(entry) = &shape.field("data").unwrap().shape else {
            panic!("data should be a list");
        };
        let entry = entry.as_object().unwrap();
        let remote_ref = entry.field("remote_ref").unwrap().shape.as_object().unwrap();
        let field = remote_ref.field("access_key_id").unwrap();
        assert_eq!(field.json_name, "accessKeyID");
    }

    #[test]
    fn test_compile_recursive_type_terminates() {
        let shape = ObjectShape::of::<Node>().unwrap();
        assert!(shape.field("children").is_some());
        assert!(shape.field("name").is_some());
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        let err = ObjectShape::of::<String>().unwrap_err();
        assert!(matches!(err, ProviderError::Schema(_)));
    }

    #[test]
    fn test_manifest_block() {
        let block = sample().to_block(BlockMode::Manifest);

        let secret_name = &block.attributes["secret_name"];
        assert!(secret_name.flags.required);
        assert!(block.attributes["refresh_interval"].flags.optional);
        assert_eq!(
            block.attributes["labels"].attr_type,
            AttributeType::map(AttributeType::String)
        );
        assert_eq!(block.attributes["extra"].attr_type, AttributeType::Dynamic);

        let data = &block.blocks["data"];
        assert_eq!(data.nesting_mode, BlockNestingMode::List);
        assert!(data.block.attributes["secret_key"].flags.required);
        assert_eq!(
            data.block.blocks["remote_ref"].nesting_mode,
            BlockNestingMode::Single
        );

        let target = &block.blocks["target"];
        assert_eq!(target.min_items, 0);
        assert_eq!(
            target.block.description.as_deref(),
            Some("Where the generated secret goes.")
        );
    }

    #[test]
    fn test_computed_block() {
        let block = sample().to_block(BlockMode::Computed);
        assert!(block.attributes["secret_name"].flags.computed);
        assert!(!block.attributes["secret_name"].flags.required);
        assert!(block.blocks["data"].block.attributes["secret_key"].flags.computed);
    }

    #[test]
    fn test_to_state() {
        let shape = Shape::Object(sample());
        let api = json!({
            "secretName": "db",
            "labels": {"app.kubernetes.io/name": "web"},
            "data": [{"secretKey": "password", "remoteRef": {"key": "prod/db", "accessKeyID": "x"}}]
        });

        let state = shape.to_state(&api);
        assert_eq!(state["secret_name"], "db");
        assert_eq!(state["refresh_interval"], Value::Null);
        assert_eq!(state["target"], Value::Null);
        assert_eq!(state["labels"]["app.kubernetes.io/name"], "web");
        assert_eq!(state["data"][0]["secret_key"], "password");
        assert_eq!(state["data"][0]["remote_ref"]["access_key_id"], "x");
        assert_eq!(state.as_object().unwrap().len(), 9);
    }

    #[test]
    fn test_from_state() {
        let shape = Shape::Object(sample());
        let state = json!({
            "secret_name": "db",
            "refresh_interval": null,
            "labels": {"team_name": "core"},
            "target": {"name": "out", "immutable": null},
            "data": [{"secret_key": "password", "remote_ref": {"key": "prod/db", "access_key_id": null}}]
        });

        let api = shape.from_state(&state);
        assert_eq!(
            api,
            json!({
                "secretName": "db",
                "labels": {"team_name": "core"},
                "target": {"name": "out"},
                "data": [{"secretKey": "password", "remoteRef": {"key": "prod/db"}}]
            })
        );
    }

    #[test]
    fn test_prune_nulls() {
        let pruned = prune_nulls(json!({"a": null, "b": {"c": null, "d": 1}, "e": [{"f": null}]}));
        assert_eq!(pruned, json!({"b": {"d": 1}, "e": [{}]}));
    }
}
