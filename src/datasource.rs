//! Object and manifest data sources.
//!
//! Each [`CrdKind`] yields two data sources:
//!
//! - [`ObjectDataSource`] GETs a live object by name and maps it into state.
//! - [`ManifestDataSource`] renders the configured object to YAML without
//!   touching a cluster.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::ObjectReader;
use crate::crd::{CrdKind, Manifest, ManifestMetadata, ObjectRef, Scope};
use crate::error::ProviderError;
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};
use crate::shape::{prune_nulls, BlockMode, ObjectShape, Shape};
use crate::validation;

/// A readable data source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// The data source type name.
    fn type_name(&self) -> &str;

    /// The data source schema.
    fn schema(&self) -> &Schema;

    /// Validate a configuration, returning diagnostics.
    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        validation::validate(self.schema(), config)
    }

    /// Read the data source, returning its state.
    async fn read(&self, reader: &dyn ObjectReader, config: Value) -> Result<Value, ProviderError>;
}

// =============================================================================
// Object data source
// =============================================================================

/// Reads one live object of kind `K`.
pub struct ObjectDataSource<K: CrdKind> {
    name: String,
    schema: Schema,
    spec: Shape,
    _kind: PhantomData<fn() -> K>,
}

impl<K: CrdKind> ObjectDataSource<K> {
    /// Build the data source, compiling the spec model.
    pub fn new() -> Result<Self, ProviderError> {
        let spec = ObjectShape::of::<K::Spec>()?;

        let mut metadata = Block::new()
            .with_description("Identifies the object to read.")
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Name of the object."),
            )
            .with_attribute(
                "labels",
                Attribute::computed_string_map().with_description("Labels of the object."),
            )
            .with_attribute(
                "annotations",
                Attribute::computed_string_map().with_description("Annotations of the object."),
            );
        if K::SCOPE == Scope::Namespaced {
            metadata = metadata.with_attribute(
                "namespace",
                Attribute::required_string().with_description("Namespace of the object."),
            );
        }

        let schema = Schema::v0()
            .with_description(K::description())
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("namespace/name of the object."),
            )
            .with_attribute("api_version", Attribute::computed_string())
            .with_attribute("kind", Attribute::computed_string())
            .with_block("metadata", NestedBlock::single(metadata).with_min_items(1))
            .with_block(
                "spec",
                NestedBlock::single(spec.to_block(BlockMode::Computed)),
            );

        Ok(Self {
            name: K::object_data_source_name(),
            schema,
            spec: Shape::Object(spec),
            _kind: PhantomData,
        })
    }
}

#[async_trait]
impl<K: CrdKind> DataSource for ObjectDataSource<K> {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, reader: &dyn ObjectReader, config: Value) -> Result<Value, ProviderError> {
        let target = target_of::<K>(&config)?;
        let object = reader.get(&target).await?;

        let spec: K::Spec = match object.get("spec") {
            Some(spec) if !spec.is_null() => serde_json::from_value(spec.clone())?,
            _ => serde_json::from_value(Value::Object(Map::new()))?,
        };
        let spec = serde_json::to_value(&spec)?;

        let meta: ObjectMeta = match object.get("metadata") {
            Some(meta) if !meta.is_null() => serde_json::from_value(meta.clone())?,
            _ => ObjectMeta::default(),
        };
        let mut metadata = Map::new();
        metadata.insert("name".to_string(), Value::String(target.name.clone()));
        if let Some(ns) = &target.namespace {
            metadata.insert("namespace".to_string(), Value::String(ns.clone()));
        }
        metadata.insert("labels".to_string(), serde_json::to_value(meta.labels)?);
        metadata.insert(
            "annotations".to_string(),
            serde_json::to_value(meta.annotations)?,
        );

        debug!(data_source = %self.name, object = %target, "Object read");

        let mut state = Map::new();
        state.insert("id".to_string(), Value::String(target.id()));
        state.insert(
            "api_version".to_string(),
            object
                .get("apiVersion")
                .cloned()
                .unwrap_or_else(|| Value::String(K::api_version())),
        );
        state.insert(
            "kind".to_string(),
            object
                .get("kind")
                .cloned()
                .unwrap_or_else(|| Value::String(K::KIND.to_string())),
        );
        state.insert("metadata".to_string(), Value::Object(metadata));
        state.insert("spec".to_string(), self.spec.to_state(&spec));
        Ok(Value::Object(state))
    }
}

// =============================================================================
// Manifest data source
// =============================================================================

/// Renders an object of kind `K` to YAML.
pub struct ManifestDataSource<K: CrdKind> {
    name: String,
    schema: Schema,
    spec: Shape,
    _kind: PhantomData<fn() -> K>,
}

impl<K: CrdKind> ManifestDataSource<K> {
    /// Build the data source, compiling the spec model.
    pub fn new() -> Result<Self, ProviderError> {
        let spec = ObjectShape::of::<K::Spec>()?;

        let mut metadata = Block::new()
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Name of the object."),
            )
            .with_attribute(
                "labels",
                Attribute::optional_string_map().with_description("Labels of the object."),
            )
            .with_attribute(
                "annotations",
                Attribute::optional_string_map().with_description("Annotations of the object."),
            );
        if K::SCOPE == Scope::Namespaced {
            metadata = metadata.with_attribute(
                "namespace",
                Attribute::required_string().with_description("Namespace of the object."),
            );
        }

        let mut spec_block = NestedBlock::single(spec.to_block(BlockMode::Manifest));
        if spec.fields.iter().any(|f| f.required) {
            spec_block = spec_block.with_min_items(1);
        }

        let schema = Schema::v0()
            .with_description(format!("{} Rendered as a YAML manifest.", K::description()))
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("namespace/name of the object."),
            )
            .with_attribute(
                "yaml",
                Attribute::computed_string().with_description("The rendered manifest."),
            )
            .with_block("metadata", NestedBlock::single(metadata).with_min_items(1))
            .with_block("spec", spec_block);

        Ok(Self {
            name: K::manifest_data_source_name(),
            schema,
            spec: Shape::Object(spec),
            _kind: PhantomData,
        })
    }

    fn typed_spec(&self, config: &Value) -> Result<K::Spec, ProviderError> {
        let state = config.get("spec").cloned().unwrap_or(Value::Null);
        let api = match self.spec.from_state(&state) {
            Value::Null => Value::Object(Map::new()),
            api => api,
        };
        Ok(serde_json::from_value(api)?)
    }

    /// Render the manifest for a configuration.
    pub fn render(&self, config: &Value) -> Result<String, ProviderError> {
        let metadata = metadata_of::<K>(config)?;
        let spec = self.typed_spec(config)?;

        if let Some(diag) = K::validate_spec(&spec).into_iter().find(Diagnostic::is_error) {
            return Err(ProviderError::Validation(match diag.detail {
                Some(detail) => format!("{}: {}", diag.summary, detail),
                None => diag.summary,
            }));
        }

        let manifest = Manifest {
            api_version: K::api_version(),
            kind: K::KIND.to_string(),
            metadata,
            spec: prune_yaml_nulls(serde_yaml::to_value(&spec)?),
        };
        Ok(serde_yaml::to_string(&manifest)?)
    }
}

#[async_trait]
impl<K: CrdKind> DataSource for ManifestDataSource<K> {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = validation::validate(&self.schema, config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            return diagnostics;
        }

        match self.typed_spec(config) {
            Ok(spec) => diagnostics.extend(K::validate_spec(&spec)),
            Err(e) => diagnostics.push(
                Diagnostic::error("Invalid spec")
                    .with_detail(e.to_string())
                    .with_attribute("spec"),
            ),
        }
        diagnostics
    }

    async fn read(&self, _reader: &dyn ObjectReader, config: Value) -> Result<Value, ProviderError> {
        let target = target_of::<K>(&config)?;
        let yaml = self.render(&config)?;
        debug!(data_source = %self.name, object = %target, bytes = yaml.len(), "Manifest rendered");

        let mut state = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        state.insert("id".to_string(), Value::String(target.id()));
        state.insert("yaml".to_string(), Value::String(yaml));
        Ok(Value::Object(state))
    }
}

fn target_of<K: CrdKind>(config: &Value) -> Result<ObjectRef, ProviderError> {
    let metadata = config
        .get("metadata")
        .ok_or_else(|| ProviderError::InvalidRequest("metadata block is required".to_string()))?;
    let name = metadata
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ProviderError::InvalidRequest("metadata.name is required".to_string()))?;
    let namespace = match K::SCOPE {
        Scope::Namespaced => Some(
            metadata
                .get("namespace")
                .and_then(Value::as_str)
                .filter(|ns| !ns.is_empty())
                .ok_or_else(|| {
                    ProviderError::InvalidRequest("metadata.namespace is required".to_string())
                })?
                .to_string(),
        ),
        Scope::Cluster => None,
    };
    Ok(K::object_ref(namespace, name))
}

fn metadata_of<K: CrdKind>(config: &Value) -> Result<ManifestMetadata, ProviderError> {
    let raw = prune_nulls(config.get("metadata").cloned().unwrap_or(Value::Null));
    let mut metadata: ManifestMetadata = serde_json::from_value(raw).map_err(|e| {
        ProviderError::InvalidRequest(format!("invalid metadata block: {}", e))
    })?;
    if K::SCOPE == Scope::Cluster {
        metadata.namespace = None;
    }
    Ok(metadata)
}

fn prune_yaml_nulls(value: serde_yaml::Value) -> serde_yaml::Value {
    match value {
        serde_yaml::Value::Mapping(map) => serde_yaml::Value::Mapping(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_yaml_nulls(v)))
                .collect(),
        ),
        serde_yaml::Value::Sequence(items) => {
            serde_yaml::Value::Sequence(items.into_iter().map(prune_yaml_nulls).collect())
        },
        other => other,
    }
}

// =============================================================================
// Registry
// =============================================================================

/// All data sources the provider serves, by type name.
#[derive(Default, Clone)]
pub struct DataSourceRegistry {
    sources: BTreeMap<String, Arc<dyn DataSource>>,
}

impl DataSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the object and manifest data sources of a kind.
    pub fn register<K: CrdKind>(&mut self) -> Result<&mut Self, ProviderError> {
        self.insert(Arc::new(ObjectDataSource::<K>::new()?))?;
        self.insert(Arc::new(ManifestDataSource::<K>::new()?))?;
        Ok(self)
    }

    /// Register a single data source.
    pub fn insert(&mut self, source: Arc<dyn DataSource>) -> Result<(), ProviderError> {
        let name = source.type_name().to_string();
        if self.sources.contains_key(&name) {
            return Err(ProviderError::Schema(format!(
                "data source {} registered twice",
                name
            )));
        }
        self.sources.insert(name, source);
        Ok(())
    }

    /// Look up a data source.
    pub fn get(&self, name: &str) -> Result<&Arc<dyn DataSource>, ProviderError> {
        self.sources
            .get(name)
            .ok_or_else(|| ProviderError::UnknownDataSource(name.to_string()))
    }

    /// Data source names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Schemas of all data sources.
    pub fn schemas(&self) -> BTreeMap<String, Schema> {
        self.sources
            .iter()
            .map(|(name, source)| (name.clone(), source.schema().clone()))
            .collect()
    }

    /// Number of registered data sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no data sources are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
