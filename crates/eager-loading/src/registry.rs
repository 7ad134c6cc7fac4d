use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use indexmap::IndexMap;

use crate::catalog::{CatalogError, CatalogField, FieldCapability, FieldCatalog, FragmentEntity};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("loading eager-loadable fields: {0}")]
    Catalog(#[from] CatalogError),
}

/// An eager-loadable relation, indexed by its context and handle.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    handle: String,
    context: String,
    type_branches: Option<TypeBranches>,
}

impl FieldDescriptor {
    /// Returns `None` for fields that can't be eager-loaded.
    fn from_catalog(field: CatalogField) -> Option<Self> {
        let type_branches = match field.capability {
            FieldCapability::None => return None,
            FieldCapability::EagerLoading => None,
            FieldCapability::TypeBranching { entities } => Some(TypeBranches { entities }),
        };

        Some(FieldDescriptor {
            handle: field.handle,
            context: field.context,
            type_branches,
        })
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// The context the children of this field are looked up in.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Present when inline fragments on this field's values pick a fragment entity.
    pub fn type_branches(&self) -> Option<&TypeBranches> {
        self.type_branches.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeBranches {
    entities: IndexMap<String, FragmentEntity>,
}

impl TypeBranches {
    pub fn entity_for_type(&self, type_name: &str) -> Option<&FragmentEntity> {
        self.entities.get(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities.keys().map(String::as_str)
    }
}

/// A fully built lookup of eager-loadable fields by context and handle.
///
/// Indexes are immutable once built. The registry swaps in a new one on reload.
#[derive(Debug, Default)]
pub struct FieldIndex {
    by_context: HashMap<String, HashMap<String, FieldDescriptor>>,
}

impl FieldIndex {
    pub fn build(fields: impl IntoIterator<Item = CatalogField>) -> Self {
        let mut index = FieldIndex::default();

        for descriptor in fields.into_iter().filter_map(FieldDescriptor::from_catalog) {
            let handles = index.by_context.entry(descriptor.context.clone()).or_default();

            if let Some(previous) = handles.insert(descriptor.handle.clone(), descriptor) {
                tracing::warn!(
                    context = %previous.context,
                    handle = %previous.handle,
                    "duplicate eager-loadable field handle, keeping the last definition"
                );
            }
        }

        index
    }

    pub fn lookup(&self, context: &str, handle: &str) -> Option<&FieldDescriptor> {
        self.by_context.get(context)?.get(handle)
    }

    pub fn len(&self) -> usize {
        self.by_context.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The registry of eager-loadable fields.
///
/// The index is built from the catalog on first use and shared by every query until
/// [`invalidate`](Self::invalidate) is called, e.g. after the content model changed.
/// Readers only ever see a complete index: it is built before it gets published.
pub struct PreloadableFieldRegistry {
    catalog: Arc<dyn FieldCatalog>,
    index: RwLock<Option<Arc<FieldIndex>>>,
}

impl fmt::Debug for PreloadableFieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadableFieldRegistry")
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl PreloadableFieldRegistry {
    pub fn new(catalog: impl FieldCatalog + 'static) -> Self {
        Self::from_shared(Arc::new(catalog))
    }

    pub fn from_shared(catalog: Arc<dyn FieldCatalog>) -> Self {
        PreloadableFieldRegistry {
            catalog,
            index: RwLock::new(None),
        }
    }

    /// Returns the published index, building it first if needed. Concurrent callers
    /// build it at most once.
    pub fn ensure_loaded(&self) -> Result<Arc<FieldIndex>, RegistryError> {
        let published = self.index.read().unwrap_or_else(PoisonError::into_inner).clone();

        if let Some(index) = published {
            return Ok(index);
        }

        let mut slot = self.index.write().unwrap_or_else(PoisonError::into_inner);

        // Someone else may have built it while we waited for the lock.
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }

        let index = Arc::new(self.build()?);
        *slot = Some(Arc::clone(&index));

        Ok(index)
    }

    #[tracing::instrument(skip_all)]
    fn build(&self) -> Result<FieldIndex, RegistryError> {
        let fields = self.catalog.fields()?;
        let catalog_size = fields.len();
        let index = FieldIndex::build(fields);

        tracing::debug!(
            catalog_size,
            eager_loadable = index.len(),
            "built eager-loadable field index"
        );

        Ok(index)
    }

    /// Looks up a field, loading the registry if needed. `None` means the field is
    /// unknown or can't be eager-loaded.
    pub fn lookup(&self, context: &str, handle: &str) -> Result<Option<FieldDescriptor>, RegistryError> {
        Ok(self.ensure_loaded()?.lookup(context, handle).cloned())
    }

    /// Drops the published index. The next lookup rebuilds it from the catalog, while
    /// queries already holding the old index keep using it.
    pub fn invalidate(&self) {
        let previous = self.index.write().unwrap_or_else(PoisonError::into_inner).take();

        if previous.is_some() {
            tracing::debug!("invalidated eager-loadable field index");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.index.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}
