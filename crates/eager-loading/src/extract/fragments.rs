use std::{collections::HashMap, fmt};

use cynic_parser::{executable::FragmentDefinition, ExecutableDocument};

/// The named fragments of one query document.
#[derive(Clone, Default)]
pub struct FragmentTable<'a> {
    definitions: HashMap<&'a str, FragmentDefinition<'a>>,
}

impl<'a> FragmentTable<'a> {
    pub fn from_document(document: &'a ExecutableDocument) -> Self {
        document.fragments().collect()
    }

    pub fn get(&self, name: &str) -> Option<FragmentDefinition<'a>> {
        self.definitions.get(name).copied()
    }
}

impl<'a> FromIterator<FragmentDefinition<'a>> for FragmentTable<'a> {
    fn from_iter<T: IntoIterator<Item = FragmentDefinition<'a>>>(iter: T) -> Self {
        FragmentTable {
            definitions: iter.into_iter().map(|fragment| (fragment.name(), fragment)).collect(),
        }
    }
}

impl fmt::Debug for FragmentTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.definitions.keys()).finish()
    }
}
