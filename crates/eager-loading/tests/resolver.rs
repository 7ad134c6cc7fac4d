#![allow(unused_crate_dependencies)]

use eager_loading::{
    ArgumentNormalizer, Arguments, CatalogField, EagerLoadExtractor, EagerLoadingConfig, OperationError,
    PreloadableFieldRegistry, ResolveInfo, Resolver, StaticCatalog, GLOBAL_CONTEXT,
};
use indoc::indoc;
use serde_json::{json, Value};

struct EntriesResolver;

impl Resolver for EntriesResolver {
    fn arrayable_arguments(&self) -> &[&str] {
        &["relatedTo", "section"]
    }
}

struct ConfiguredResolver {
    config: EagerLoadingConfig,
}

impl Resolver for ConfiguredResolver {
    fn arrayable_arguments(&self) -> &[&str] {
        &["id"]
    }

    fn normalizer(&self) -> ArgumentNormalizer {
        self.config.normalizer()
    }
}

fn arguments(value: Value) -> Arguments {
    match value {
        Value::Object(arguments) => arguments,
        _ => unreachable!("arguments are objects"),
    }
}

fn registry() -> PreloadableFieldRegistry {
    PreloadableFieldRegistry::new(StaticCatalog::new([
        CatalogField::eager_loading(GLOBAL_CONTEXT, "author"),
        CatalogField::eager_loading(GLOBAL_CONTEXT, "photo"),
    ]))
}

#[test]
fn prepare_arguments() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let prepared = EntriesResolver.prepare_arguments(arguments(json!({
        "relatedTo": "a,b,c",
        "section": "news",
        "search": "x,y",
    })));

    assert_eq!(
        Value::Object(prepared),
        json!({ "relatedTo": ["a", "b", "c"], "section": "news", "search": "x,y" })
    );
}

#[test]
fn prepare_arguments_with_configured_delimiters() {
    let resolver = ConfiguredResolver {
        config: EagerLoadingConfig::from_toml_str(r#"list_delimiters = [";"]"#).unwrap(),
    };

    let prepared = resolver.prepare_arguments(arguments(json!({ "id": "1;2", "slug": "a;b" })));

    assert_eq!(Value::Object(prepared), json!({ "id": ["1", "2"], "slug": "a;b" }));
}

#[test]
fn resolvers_without_arrayable_arguments_change_nothing() {
    struct Plain;
    impl Resolver for Plain {}

    let input = json!({ "relatedTo": "a,b" });

    assert_eq!(Value::Object(Plain.prepare_arguments(arguments(input.clone()))), input);
}

#[test]
fn extract_eager_load_condition_uses_the_first_field_node() {
    let document = cynic_parser::parse_executable_document(indoc! {r#"
        query {
          entries {
            author {
              ...Photo
            }
          }
          entries {
            photo
          }
          drafts: entries {
            photo
          }
        }

        fragment Photo on User {
          photo
        }
    "#})
    .unwrap();

    let infos = ResolveInfo::for_operation(&document, None).unwrap();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].field_nodes.len(), 2);
    assert_eq!(infos[1].field_name(), Some("entries"));

    let registry = registry();
    let extractor = EagerLoadExtractor::new(&registry);

    let plan = EntriesResolver
        .extract_eager_load_condition(&extractor, &infos[0])
        .unwrap();
    assert_eq!(plan.paths().collect::<Vec<_>>(), vec!["author", "author.photo"]);

    let plan = EntriesResolver
        .extract_eager_load_condition(&extractor, &infos[1])
        .unwrap();
    assert_eq!(plan.paths().collect::<Vec<_>>(), vec!["photo"]);
}

#[test]
fn extract_without_field_nodes() {
    let registry = registry();
    let extractor = EagerLoadExtractor::new(&registry);
    let info = ResolveInfo::new(Vec::new(), Default::default());

    let plan = EntriesResolver.extract_eager_load_condition(&extractor, &info).unwrap();

    assert!(plan.is_empty());
}

#[test]
fn operation_selection() {
    let document = cynic_parser::parse_executable_document(indoc! {r#"
        query Entries { entries { author } }
        query Users { users { photo } }
    "#})
    .unwrap();

    assert!(matches!(
        ResolveInfo::for_operation(&document, None),
        Err(OperationError::OperationNameRequired)
    ));

    let error = ResolveInfo::for_operation(&document, Some("Assets")).unwrap_err();
    assert_eq!(error.to_string(), "unknown operation named `Assets`");

    let infos = ResolveInfo::for_operation(&document, Some("Users")).unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].field_name(), Some("users"));
}

#[test]
fn documents_without_operations() {
    let document = cynic_parser::parse_executable_document("fragment Photo on User { photo }").unwrap();

    assert!(matches!(
        ResolveInfo::for_operation(&document, None),
        Err(OperationError::NoOperation)
    ));
}

#[test]
fn invalidated_registry_picks_up_catalog_changes() {
    use std::sync::{Arc, Mutex};

    let fields = Arc::new(Mutex::new(vec![CatalogField::eager_loading(GLOBAL_CONTEXT, "author")]));
    let registry = PreloadableFieldRegistry::new({
        let fields = fields.clone();
        move || -> Result<Vec<CatalogField>, eager_loading::CatalogError> { Ok(fields.lock().unwrap().clone()) }
    });
    let extractor = EagerLoadExtractor::new(&registry);

    let document = cynic_parser::parse_executable_document("query { entries { author photo } }").unwrap();
    let infos = ResolveInfo::for_operation(&document, None).unwrap();

    let plan = EntriesResolver.extract_eager_load_condition(&extractor, &infos[0]).unwrap();
    assert_eq!(plan.paths().collect::<Vec<_>>(), vec!["author"]);

    fields
        .lock()
        .unwrap()
        .push(CatalogField::eager_loading(GLOBAL_CONTEXT, "photo"));

    // still cached
    let plan = EntriesResolver.extract_eager_load_condition(&extractor, &infos[0]).unwrap();
    assert_eq!(plan.len(), 1);

    registry.invalidate();

    let plan = EntriesResolver.extract_eager_load_condition(&extractor, &infos[0]).unwrap();
    assert_eq!(plan.paths().collect::<Vec<_>>(), vec!["author", "photo"]);
}

#[test]
fn resolve_info_source_keeps_float_literals() {
    let query = "query { entries { author(weight: 2.50) } }";
    let document = cynic_parser::parse_executable_document(query).unwrap();
    let info = ResolveInfo::for_operation(&document, None)
        .unwrap()
        .remove(0)
        .with_source(query);

    let registry = registry();
    let extractor = EagerLoadExtractor::new(&registry);
    let plan = EntriesResolver.extract_eager_load_condition(&extractor, &info).unwrap();

    assert_eq!(
        Value::Object(plan.get("author").unwrap().clone()),
        json!({ "weight": "2.50" })
    );
}
