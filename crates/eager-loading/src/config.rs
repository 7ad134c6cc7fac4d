use std::path::{Path, PathBuf};

use crate::{
    arguments::{ArgumentNormalizer, DEFAULT_LIST_DELIMITERS},
    catalog::GLOBAL_CONTEXT,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing eager loading config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid eager loading config: {0}")]
    Invalid(&'static str),
}

/// How many named fragment spreads one extraction expands at most.
pub const DEFAULT_MAX_FRAGMENT_EXPANSIONS: usize = 1000;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Settings for eager-load extraction and argument normalization.
pub struct EagerLoadingConfig {
    /// The field context root selections are looked up in
    pub root_context: String,
    /// What to do when two selections produce the same eager-load path
    pub duplicate_paths: DuplicatePathPolicy,
    /// Characters separating list items given as a single string argument
    pub list_delimiters: Vec<char>,
    /// How many named fragment spreads one extraction may expand
    pub max_fragment_expansions: usize,
}

impl Default for EagerLoadingConfig {
    fn default() -> Self {
        Self {
            root_context: GLOBAL_CONTEXT.to_string(),
            duplicate_paths: Default::default(),
            list_delimiters: DEFAULT_LIST_DELIMITERS.to_vec(),
            max_fragment_expansions: DEFAULT_MAX_FRAGMENT_EXPANSIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePathPolicy {
    /// The arguments of the selection seen last are kept.
    #[default]
    LastWriteWins,
    /// Selecting the same path twice with different arguments fails extraction.
    Reject,
}

impl EagerLoadingConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.root_context.is_empty() {
            return Err(ConfigError::Invalid("root_context must not be empty"));
        }

        if self.list_delimiters.iter().any(|delimiter| delimiter.is_whitespace()) {
            return Err(ConfigError::Invalid("list_delimiters must not contain whitespace"));
        }

        if self.max_fragment_expansions == 0 {
            return Err(ConfigError::Invalid("max_fragment_expansions must be at least 1"));
        }

        Ok(())
    }

    pub fn normalizer(&self) -> ArgumentNormalizer {
        ArgumentNormalizer::new(self.list_delimiters.iter().copied())
    }
}
