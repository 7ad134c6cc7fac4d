use indexmap::IndexMap;

use crate::arguments::Arguments;

/// Separates a field path from the handle of a nested relation.
pub const NESTED_SEPARATOR: char = '.';

/// Terminates the eager-loading prefix of a fragment entity.
pub const ENTITY_SEPARATOR: char = ':';

/// Which relations to eager-load for a query, and with which arguments.
///
/// Keys are paths like `author`, `author.photo` or `blocks.quote:image`. Serializes to a
/// JSON object of path to arguments.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct EagerLoadPlan {
    paths: IndexMap<String, Arguments>,
}

impl EagerLoadPlan {
    pub fn get(&self, path: &str) -> Option<&Arguments> {
        self.paths.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.paths.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arguments)> + '_ {
        self.paths.iter().map(|(path, arguments)| (path.as_str(), arguments))
    }

    pub fn into_map(self) -> IndexMap<String, Arguments> {
        self.paths
    }

    /// Returns the arguments previously recorded under the same path.
    pub(crate) fn insert(&mut self, path: String, arguments: Arguments) -> Option<Arguments> {
        self.paths.insert(path, arguments)
    }
}

impl IntoIterator for EagerLoadPlan {
    type Item = (String, Arguments);
    type IntoIter = indexmap::map::IntoIter<String, Arguments>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}
