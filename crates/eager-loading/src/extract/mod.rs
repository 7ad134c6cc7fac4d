mod error;
mod fragments;
mod literals;

use cynic_parser::executable::{FieldSelection, Selection};

use self::literals::LiteralContext;
pub use self::{error::ExtractError, fragments::FragmentTable};
use crate::{
    arguments::Arguments,
    catalog::GLOBAL_CONTEXT,
    config::{DuplicatePathPolicy, EagerLoadingConfig, DEFAULT_MAX_FRAGMENT_EXPANSIONS},
    plan::{EagerLoadPlan, ENTITY_SEPARATOR, NESTED_SEPARATOR},
    registry::{FieldDescriptor, FieldIndex, PreloadableFieldRegistry},
};

/// Walks the selections under a query root and collects the eager-loadable
/// relations into an [`EagerLoadPlan`].
#[derive(Debug, Clone)]
pub struct EagerLoadExtractor<'r> {
    registry: &'r PreloadableFieldRegistry,
    root_context: String,
    duplicate_paths: DuplicatePathPolicy,
    max_fragment_expansions: usize,
}

impl<'r> EagerLoadExtractor<'r> {
    pub fn new(registry: &'r PreloadableFieldRegistry) -> Self {
        EagerLoadExtractor {
            registry,
            root_context: GLOBAL_CONTEXT.to_string(),
            duplicate_paths: DuplicatePathPolicy::default(),
            max_fragment_expansions: DEFAULT_MAX_FRAGMENT_EXPANSIONS,
        }
    }

    pub fn with_config(registry: &'r PreloadableFieldRegistry, config: &EagerLoadingConfig) -> Self {
        EagerLoadExtractor {
            registry,
            root_context: config.root_context.clone(),
            duplicate_paths: config.duplicate_paths,
            max_fragment_expansions: config.max_fragment_expansions,
        }
    }

    /// Builds the plan for the children of `root`. A missing root gives an empty plan.
    ///
    /// The registry index is fetched once, so an invalidation in the middle of the walk
    /// doesn't mix two versions of the content model.
    pub fn extract<'q>(
        &self,
        root: Option<FieldSelection<'q>>,
        fragments: &FragmentTable<'q>,
        variables: Option<&Arguments>,
    ) -> Result<EagerLoadPlan, ExtractError> {
        self.run(root, fragments, LiteralContext { variables, source: None })
    }

    /// Like [`extract`](Self::extract), with the text `root` was parsed from. Float
    /// arguments a JSON number can't hold as written are kept as that text.
    pub fn extract_with_source<'q>(
        &self,
        source: &'q str,
        root: Option<FieldSelection<'q>>,
        fragments: &FragmentTable<'q>,
        variables: Option<&Arguments>,
    ) -> Result<EagerLoadPlan, ExtractError> {
        self.run(
            root,
            fragments,
            LiteralContext {
                variables,
                source: Some(source),
            },
        )
    }

    #[tracing::instrument(skip_all, fields(root = root.map(|root| root.name())))]
    fn run<'q>(
        &self,
        root: Option<FieldSelection<'q>>,
        fragments: &FragmentTable<'q>,
        literals: LiteralContext<'_>,
    ) -> Result<EagerLoadPlan, ExtractError> {
        let mut plan = EagerLoadPlan::default();

        let Some(root) = root else {
            return Ok(plan);
        };

        let index = self.registry.ensure_loaded()?;
        let mut walker = Walker {
            index: &index,
            fragments,
            literals,
            duplicate_paths: self.duplicate_paths,
            expanding: Vec::new(),
            expansions_left: self.max_fragment_expansions,
        };

        walker.walk(root.selection_set(), "", &self.root_context, None, &mut plan)?;

        tracing::debug!(paths = plan.len(), "extracted eager-load plan");

        Ok(plan)
    }
}

struct Walker<'w, 'q> {
    index: &'w FieldIndex,
    fragments: &'w FragmentTable<'q>,
    literals: LiteralContext<'w>,
    duplicate_paths: DuplicatePathPolicy,
    /// Named fragments being expanded on the current path, outermost first.
    expanding: Vec<&'q str>,
    /// Spreads may still be expanded in this query. Bounds fragments spreading each other
    /// several times, which grows exponentially without being a cycle.
    expansions_left: usize,
}

impl<'w, 'q> Walker<'w, 'q> {
    fn walk(
        &mut self,
        selections: impl Iterator<Item = Selection<'q>>,
        prefix: &str,
        context: &str,
        parent: Option<&'w FieldDescriptor>,
        plan: &mut EagerLoadPlan,
    ) -> Result<(), ExtractError> {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    let index = self.index;

                    // Unknown fields can't lead to anything eager-loadable.
                    let Some(descriptor) = index.lookup(context, field.name()) else {
                        continue;
                    };

                    let arguments = literals::arguments(field.arguments(), self.literals);
                    self.record(plan, format!("{prefix}{}", field.name()), arguments)?;

                    if field.selection_set().len() != 0 {
                        let prefix = format!("{prefix}{}{NESTED_SEPARATOR}", descriptor.handle());
                        self.walk(
                            field.selection_set(),
                            &prefix,
                            descriptor.context(),
                            Some(descriptor),
                            plan,
                        )?;
                    }
                }
                Selection::InlineFragment(fragment) => {
                    let branch = parent
                        .and_then(|parent| Some((parent, parent.type_branches()?)))
                        .zip(fragment.type_condition());

                    let Some(((parent_field, branches), type_name)) = branch else {
                        self.walk(fragment.selection_set(), prefix, context, parent, plan)?;
                        continue;
                    };

                    let Some(entity) = branches.entity_for_type(type_name) else {
                        return Err(ExtractError::UnknownFragmentType {
                            field: parent_field.handle().to_string(),
                            type_name: type_name.to_string(),
                            path: location(prefix),
                        });
                    };

                    let prefix = format!("{prefix}{}{ENTITY_SEPARATOR}", entity.eager_loading_prefix);
                    self.walk(
                        fragment.selection_set(),
                        &prefix,
                        &entity.field_context,
                        parent,
                        plan,
                    )?;
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.fragment_name();

                    let Some(definition) = self.fragments.get(name) else {
                        return Err(ExtractError::UndefinedFragment {
                            name: name.to_string(),
                            path: location(prefix),
                        });
                    };

                    if self.expanding.contains(&name) {
                        return Err(ExtractError::CyclicFragment {
                            name: name.to_string(),
                            path: location(prefix),
                        });
                    }

                    let Some(expansions_left) = self.expansions_left.checked_sub(1) else {
                        return Err(ExtractError::TooManyFragmentExpansions {
                            name: name.to_string(),
                            path: location(prefix),
                        });
                    };
                    self.expansions_left = expansions_left;

                    self.expanding.push(name);
                    let result = self.walk(definition.selection_set(), prefix, context, parent, plan);
                    self.expanding.pop();

                    result?;
                }
            }
        }

        Ok(())
    }

    fn record(&self, plan: &mut EagerLoadPlan, path: String, arguments: Arguments) -> Result<(), ExtractError> {
        let conflicting = plan.get(&path).is_some_and(|previous| *previous != arguments);

        if conflicting {
            match self.duplicate_paths {
                DuplicatePathPolicy::Reject => return Err(ExtractError::AmbiguousPath { path }),
                DuplicatePathPolicy::LastWriteWins => {
                    tracing::debug!(path = %path, "eager-load path selected again with other arguments, keeping the last");
                }
            }
        }

        tracing::trace!(path = %path, "eager-loading");
        plan.insert(path, arguments);

        Ok(())
    }
}

/// A readable location for errors: the path of the enclosing relation.
fn location(prefix: &str) -> String {
    match prefix.trim_end_matches([NESTED_SEPARATOR, ENTITY_SEPARATOR]) {
        "" => "the query root".to_string(),
        path => format!("`{path}`"),
    }
}
