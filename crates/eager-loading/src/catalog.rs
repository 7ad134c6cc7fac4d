//! The field catalog the registry indexes eager-loadable fields from.

use std::path::Path;

use indexmap::IndexMap;

/// The context fields live in when they are not scoped to a nested field layout.
pub const GLOBAL_CONTEXT: &str = "global";

/// A source of every field known to the content model.
///
/// The registry reads the full catalog once per invalidation epoch, so implementations
/// are free to be slow. Returning an empty list is not an error.
pub trait FieldCatalog: Send + Sync {
    fn fields(&self) -> Result<Vec<CatalogField>, CatalogError>;
}

impl<F> FieldCatalog for F
where
    F: Fn() -> Result<Vec<CatalogField>, CatalogError> + Send + Sync,
{
    fn fields(&self) -> Result<Vec<CatalogField>, CatalogError> {
        self()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("field catalog is unavailable: {0}")]
    Unavailable(String),
    #[error("reading field catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing field catalog: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("parsing field catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// One field of the content model, as the catalog reports it.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogField {
    /// The namespace the field is defined in.
    #[serde(default = "default_context")]
    pub context: String,
    /// The storage-facing name of the relation.
    pub handle: String,
    #[serde(default)]
    pub capability: FieldCapability,
}

fn default_context() -> String {
    GLOBAL_CONTEXT.to_string()
}

impl CatalogField {
    /// A field that can't be eager-loaded, like a plain text field.
    pub fn plain(context: impl Into<String>, handle: impl Into<String>) -> Self {
        CatalogField {
            context: context.into(),
            handle: handle.into(),
            capability: FieldCapability::None,
        }
    }

    pub fn eager_loading(context: impl Into<String>, handle: impl Into<String>) -> Self {
        CatalogField {
            context: context.into(),
            handle: handle.into(),
            capability: FieldCapability::EagerLoading,
        }
    }

    /// An eager-loadable field whose values come in several types, each mapped to a
    /// fragment entity by GraphQL type name.
    pub fn type_branching<K>(
        context: impl Into<String>,
        handle: impl Into<String>,
        entities: impl IntoIterator<Item = (K, FragmentEntity)>,
    ) -> Self
    where
        K: Into<String>,
    {
        CatalogField {
            context: context.into(),
            handle: handle.into(),
            capability: FieldCapability::TypeBranching {
                entities: entities.into_iter().map(|(name, entity)| (name.into(), entity)).collect(),
            },
        }
    }

    pub fn is_eager_loadable(&self) -> bool {
        !matches!(self.capability, FieldCapability::None)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldCapability {
    #[default]
    None,
    EagerLoading,
    /// Eager-loadable, and inline fragments on its values select a fragment entity
    /// with its own prefix and field context.
    TypeBranching {
        #[serde(default)]
        entities: IndexMap<String, FragmentEntity>,
    },
}

/// The entity behind one GraphQL type of a type-branching field, e.g. a block type
/// of a matrix field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentEntity {
    pub eager_loading_prefix: String,
    pub field_context: String,
}

impl FragmentEntity {
    pub fn new(eager_loading_prefix: impl Into<String>, field_context: impl Into<String>) -> Self {
        FragmentEntity {
            eager_loading_prefix: eager_loading_prefix.into(),
            field_context: field_context.into(),
        }
    }
}

/// An in-memory catalog, built in code or read from a TOML or JSON document.
///
/// ```toml
/// [[fields]]
/// handle = "author"
/// capability = { kind = "eager_loading" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct StaticCatalog {
    #[serde(default)]
    fields: Vec<CatalogField>,
}

impl StaticCatalog {
    pub fn new(fields: impl IntoIterator<Item = CatalogField>) -> Self {
        StaticCatalog {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Reads a catalog file, picking the format from its extension. Anything that isn't
    /// `.json` is read as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        match path.extension().and_then(|extension| extension.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }
}

impl FieldCatalog for StaticCatalog {
    fn fields(&self) -> Result<Vec<CatalogField>, CatalogError> {
        Ok(self.fields.clone())
    }
}
