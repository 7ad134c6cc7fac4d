use std::fmt;

use cynic_parser::{
    executable::{FieldSelection, OperationDefinition, Selection},
    ExecutableDocument,
};

use crate::{
    arguments::{ArgumentNormalizer, Arguments},
    extract::{EagerLoadExtractor, ExtractError, FragmentTable},
    plan::EagerLoadPlan,
};

#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("the document contains no operation")]
    NoOperation,
    #[error("an operation name is required when the document contains several operations")]
    OperationNameRequired,
    #[error("unknown operation named `{0}`")]
    UnknownOperation(String),
}

/// What a resolver knows about the field it resolves.
#[derive(Clone)]
pub struct ResolveInfo<'a> {
    /// The nodes of the field being resolved. Several nodes select the same field when
    /// it appears more than once under the same response key.
    pub field_nodes: Vec<FieldSelection<'a>>,
    pub fragments: FragmentTable<'a>,
    pub variables: Arguments,
    /// The query text the field nodes were parsed from, if the caller kept it.
    pub source: Option<&'a str>,
}

impl<'a> ResolveInfo<'a> {
    pub fn new(field_nodes: Vec<FieldSelection<'a>>, fragments: FragmentTable<'a>) -> Self {
        ResolveInfo {
            field_nodes,
            fragments,
            variables: Arguments::new(),
            source: None,
        }
    }

    pub fn with_variables(mut self, variables: Arguments) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    /// One resolve info per root field of the operation, grouped by response key.
    /// Fragments at the root of the operation aren't expanded.
    pub fn for_operation(
        document: &'a ExecutableDocument,
        operation_name: Option<&str>,
    ) -> Result<Vec<Self>, OperationError> {
        let operation = find_operation(document, operation_name)?;
        let fragments = FragmentTable::from_document(document);
        let mut infos: Vec<ResolveInfo<'a>> = Vec::new();

        for selection in operation.selection_set() {
            let Selection::Field(field) = selection else {
                continue;
            };

            let response_key = field.alias().unwrap_or(field.name());
            let existing = infos.iter_mut().find(|info| {
                info.field_nodes
                    .first()
                    .is_some_and(|node| node.alias().unwrap_or(node.name()) == response_key)
            });

            match existing {
                Some(info) => info.field_nodes.push(field),
                None => infos.push(ResolveInfo::new(vec![field], fragments.clone())),
            }
        }

        Ok(infos)
    }

    pub fn field_name(&self) -> Option<&'a str> {
        self.field_nodes.first().map(|node| node.name())
    }
}

impl fmt::Debug for ResolveInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveInfo")
            .field("field_name", &self.field_name())
            .field("field_nodes", &self.field_nodes.len())
            .field("fragments", &self.fragments)
            .field("variables", &self.variables)
            .field("source", &self.source.is_some())
            .finish()
    }
}

fn find_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<OperationDefinition<'a>, OperationError> {
    let mut operations = document.operations();

    match operation_name {
        Some(name) => operations
            .find(|operation| operation.name() == Some(name))
            .ok_or_else(|| OperationError::UnknownOperation(name.to_string())),
        None => {
            let operation = operations.next().ok_or(OperationError::NoOperation)?;

            if operations.next().is_some() {
                return Err(OperationError::OperationNameRequired);
            }

            Ok(operation)
        }
    }
}

/// The operation-level unit resolving a query field.
///
/// Implementors pick which arguments accept lists and get argument normalization and
/// eager-load extraction for free.
pub trait Resolver {
    /// Arguments that may be given as a delimited string and should become a list.
    fn arrayable_arguments(&self) -> &[&str] {
        &[]
    }

    fn normalizer(&self) -> ArgumentNormalizer {
        ArgumentNormalizer::default()
    }

    fn prepare_arguments(&self, arguments: Arguments) -> Arguments {
        self.normalizer().normalize(arguments, self.arrayable_arguments())
    }

    /// The plan for the first node of the resolved field. Call it once per query root.
    fn extract_eager_load_condition(
        &self,
        extractor: &EagerLoadExtractor<'_>,
        info: &ResolveInfo<'_>,
    ) -> Result<EagerLoadPlan, ExtractError> {
        let root = info.field_nodes.first().copied();

        match info.source {
            Some(source) => extractor.extract_with_source(source, root, &info.fragments, Some(&info.variables)),
            None => extractor.extract(root, &info.fragments, Some(&info.variables)),
        }
    }
}
