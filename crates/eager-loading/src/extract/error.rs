use crate::registry::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("unknown fragment `{name}` spread at {path}")]
    UndefinedFragment { name: String, path: String },
    #[error("fragment `{name}` spreads itself at {path}")]
    CyclicFragment { name: String, path: String },
    #[error("fragment `{name}` spread at {path} exceeds the fragment expansion limit")]
    TooManyFragmentExpansions { name: String, path: String },
    #[error("field `{field}` has no fragment entity for type `{type_name}` at {path}")]
    UnknownFragmentType {
        field: String,
        type_name: String,
        path: String,
    },
    #[error("eager-load path `{path}` is selected more than once with different arguments")]
    AmbiguousPath { path: String },
}
