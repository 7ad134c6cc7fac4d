//! Derives which relations to eager-load for a GraphQL query.
//!
//! Resolving a list of entries and then their authors one entry at a time is the classic
//! N+1 problem. This crate looks at the selection set of a query root ahead of execution
//! and tells the storage layer which relations to fetch in bulk:
//!
//! 1. A [`PreloadableFieldRegistry`] indexes the eager-loadable fields of the content
//!    model by field context and handle, reading the [`FieldCatalog`] once.
//! 2. An [`EagerLoadExtractor`] walks the selections, expanding fragments, and builds an
//!    [`EagerLoadPlan`] of paths like `author.photo` or `blocks.quote:image`.
//! 3. Resolvers normalize their own arguments with an [`ArgumentNormalizer`], turning
//!    `"1,2,3"` into a list where an argument accepts one.
//!
//! The crate is side effect free apart from caching the registry index: fetching the
//! data is up to the caller.

mod arguments;
mod catalog;
mod config;
mod extract;
mod plan;
mod registry;
mod resolver;

pub use self::{
    arguments::{normalize, split_list, ArgumentNormalizer, Arguments, DEFAULT_LIST_DELIMITERS},
    catalog::{CatalogError, CatalogField, FieldCapability, FieldCatalog, FragmentEntity, StaticCatalog, GLOBAL_CONTEXT},
    config::{ConfigError, DuplicatePathPolicy, EagerLoadingConfig, DEFAULT_MAX_FRAGMENT_EXPANSIONS},
    extract::{EagerLoadExtractor, ExtractError, FragmentTable},
    plan::{EagerLoadPlan, ENTITY_SEPARATOR, NESTED_SEPARATOR},
    registry::{FieldDescriptor, FieldIndex, PreloadableFieldRegistry, RegistryError, TypeBranches},
    resolver::{OperationError, ResolveInfo, Resolver},
};
