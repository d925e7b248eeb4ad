//! End-to-end flows: registry -> materializer -> repository -> display

use brawo_core::{CmsError, ContentStatus};
use brawo_schema::{
    ContentTypeRegistry, ContentTypeSchema, DynamicEntity, FieldDefinition, RouteDescriptor,
    SealedRegistry,
};
use brawo_storage::{CmsConfig, ContentRepository, InMemoryStore, SchemaMaterializer, StorageLayout};
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn registry() -> SealedRegistry {
    let mut registry = ContentTypeRegistry::new();

    registry
        .add(ContentTypeSchema::taxonomy("categories", "Categories"))
        .unwrap();

    registry
        .add(
            ContentTypeSchema::new("faqs", "FAQs")
                .with_field(FieldDefinition::string("question").required())
                .with_field(FieldDefinition::new("answer", "textarea").required())
                .with_field(FieldDefinition::select(
                    "category",
                    ["General", "Billing", "Technical"],
                ))
                .with_field(FieldDefinition::new("display_order", "integer").with_default(0))
                .with_title_field("question"),
        )
        .unwrap();

    registry
        .add(
            ContentTypeSchema::new("products", "Products")
                .with_field(FieldDefinition::string("title").required())
                .with_field(FieldDefinition::decimal("price", 10, 2))
                .with_field(FieldDefinition::reference("vendor_ids", "products"))
                .with_field(FieldDefinition::repeater(
                    "features",
                    vec![
                        FieldDefinition::string("name"),
                        FieldDefinition::string("description"),
                    ],
                )),
        )
        .unwrap();

    registry
        .add(
            ContentTypeSchema::new("blog_posts", "Blog Posts")
                .with_field(FieldDefinition::string("title").required())
                .with_field(FieldDefinition::new("body", "rich_text"))
                .with_field(FieldDefinition::taxonomy("category_id", "categories"))
                .with_routes(
                    RouteDescriptor::new()
                        .with_archive("/blog")
                        .with_single("/blog/:slug"),
                ),
        )
        .unwrap();

    registry.seal().unwrap()
}

fn setup(config: CmsConfig) -> ContentRepository<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    let registry = registry();

    let report = SchemaMaterializer::new(store.as_ref(), &config).materialize_all(&registry);
    assert!(report.is_complete(), "{:?}", report.failed);

    ContentRepository::new(store, Arc::new(registry), config)
}

fn params(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn faq_draft_gets_defaults_and_publishes() {
    let repo = setup(CmsConfig::default());
    let schema = Arc::clone(repo.schema("faqs").unwrap());

    let faq = repo
        .create("faqs", &params(json!({"question": "Why?", "answer": "Because."})))
        .unwrap();

    assert_eq!(faq.status, ContentStatus::Draft);
    assert_eq!(faq.slug, "why");
    assert_eq!(faq.get(&schema, "display_order").unwrap(), json!(0));
    assert_eq!(faq.get(&schema, "category").unwrap(), Value::Null);

    let published = repo.publish("faqs", faq.id.unwrap()).unwrap();
    assert!(published.is_published());
    assert_eq!(repo.published("faqs").unwrap().len(), 1);
}

#[test]
fn publishing_requires_required_fields() {
    let repo = setup(CmsConfig::default());
    let draft = repo
        .create("faqs", &params(json!({"question": "Half done"})))
        .unwrap();

    let err = repo.publish("faqs", draft.id.unwrap()).unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors[0].field, "answer");

    let stored = repo.find("faqs", draft.id.unwrap()).unwrap();
    assert_eq!(stored.status, ContentStatus::Draft);
}

#[test]
fn invalid_submission_is_not_persisted() {
    let repo = setup(CmsConfig::default());
    let err = repo
        .create(
            "faqs",
            &params(json!({"question": "Q", "answer": "A", "category": "Sales"})),
        )
        .unwrap_err();

    assert!(err.is_validation());
    assert!(repo.list("faqs", None).unwrap().is_empty());
}

#[test]
fn reference_submission_is_compacted() {
    let repo = setup(CmsConfig::default());
    let product = repo
        .create(
            "products",
            &params(json!({"title": "Bundle", "vendor_ids": ["3", "7", ""]})),
        )
        .unwrap();

    assert_eq!(product.get_field("vendor_ids"), Some(&json!([3, 7])));
}

#[test]
fn references_resolve_for_display() {
    let repo = setup(CmsConfig::default());
    let widget = repo
        .create("products", &params(json!({"title": "Widget"})))
        .unwrap();
    let gadget = repo
        .create("products", &params(json!({"title": "Gadget"})))
        .unwrap();

    let bundle = repo
        .create(
            "products",
            &params(json!({
                "title": "Bundle",
                "price": "19.999",
                "vendor_ids[]": [gadget.id.unwrap().to_string(), widget.id.unwrap().to_string(), "404"]
            })),
        )
        .unwrap();

    let rows = repo.display(&bundle).unwrap();
    let value = |name: &str| rows.iter().find(|r| r.name == name).unwrap().value.clone();

    assert_eq!(value("price"), "20.00");
    assert_eq!(value("vendor_ids"), "Gadget, Widget");
    assert_eq!(value("features"), "-");
}

#[test]
fn slug_collision_gets_suffix() {
    let repo = setup(CmsConfig::default());
    let first = repo
        .create("blog_posts", &params(json!({"title": "Hello World"})))
        .unwrap();
    let second = repo
        .create("blog_posts", &params(json!({"title": "Hello World"})))
        .unwrap();
    let third = repo
        .create("blog_posts", &params(json!({"title": "Hello World!"})))
        .unwrap();

    assert_eq!(first.slug, "hello-world");
    assert_eq!(second.slug, "hello-world-1");
    assert_eq!(third.slug, "hello-world-2");

    let schema = repo.schema("blog_posts").unwrap();
    assert_eq!(schema.single_path(&second.slug).as_deref(), Some("/blog/hello-world-1"));
    assert_eq!(
        repo.find_by_slug("blog_posts", "hello-world-1").unwrap().unwrap().id,
        second.id
    );
}

#[test]
fn slug_attempts_are_bounded() {
    let repo = setup(CmsConfig::default().with_max_slug_attempts(1));
    for _ in 0..2 {
        repo.create("blog_posts", &params(json!({"title": "Same"})))
            .unwrap();
    }

    let err = repo
        .create("blog_posts", &params(json!({"title": "Same"})))
        .unwrap_err();
    assert!(matches!(err, CmsError::SlugExhausted { attempts: 1, .. }));
}

#[test]
fn explicit_slug_change_avoids_collisions() {
    let repo = setup(CmsConfig::default());
    repo.create("blog_posts", &params(json!({"title": "Taken"})))
        .unwrap();
    let post = repo
        .create("blog_posts", &params(json!({"title": "Other"})))
        .unwrap();

    let renamed = repo
        .update("blog_posts", post.id.unwrap(), &params(json!({"slug": "Taken"})))
        .unwrap();
    assert_eq!(renamed.slug, "taken-1");
}

#[test]
fn dangling_taxonomy_displays_dash() {
    let repo = setup(CmsConfig::default());
    let news = repo
        .create("categories", &params(json!({"name": "News"})))
        .unwrap();

    let tagged = repo
        .create(
            "blog_posts",
            &params(json!({"title": "Tagged", "category_id": news.id.unwrap().to_string()})),
        )
        .unwrap();
    let dangling = repo
        .create(
            "blog_posts",
            &params(json!({"title": "Dangling", "category_id": "99"})),
        )
        .unwrap();

    let category = |entity: &DynamicEntity| {
        repo.display(entity)
            .unwrap()
            .into_iter()
            .find(|r| r.name == "category_id")
            .unwrap()
            .value
    };
    assert_eq!(category(&tagged), "News");
    assert_eq!(category(&dangling), "-");

    let inputs = repo.describe(&tagged).unwrap();
    let select = inputs.iter().find(|i| i.name == "category_id").unwrap();
    assert_eq!(select.options.len(), 1);
    assert_eq!(select.selected_values(), vec![news.id.unwrap().to_string().as_str()]);
}

#[test]
fn scheduled_and_archived_entities_are_not_live() {
    let repo = setup(CmsConfig::default());
    let later = repo
        .create("blog_posts", &params(json!({"title": "Later"})))
        .unwrap();
    let gone = repo
        .create("blog_posts", &params(json!({"title": "Gone"})))
        .unwrap();

    repo.publish_at("blog_posts", later.id.unwrap(), Utc::now() + Duration::days(1))
        .unwrap();
    repo.publish("blog_posts", gone.id.unwrap()).unwrap();
    repo.archive("blog_posts", gone.id.unwrap()).unwrap();

    assert!(repo.published("blog_posts").unwrap().is_empty());
    assert_eq!(
        repo.list("blog_posts", Some(ContentStatus::Archived))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn repeater_rows_survive_storage() {
    let repo = setup(CmsConfig::default());
    let product = repo
        .create(
            "products",
            &params(json!({
                "title": "Kit",
                "features": {
                    "0": {"name": "Fast", "description": ""},
                    "1": {"name": "", "description": ""}
                }
            })),
        )
        .unwrap();

    let stored = repo.find("products", product.id.unwrap()).unwrap();
    assert_eq!(
        stored.get_field("features"),
        Some(&json!([{"name": "Fast", "description": ""}]))
    );
}

#[test]
fn json_column_layout_runs_the_same_flows() {
    let repo = setup(CmsConfig::default().with_layout(StorageLayout::JsonColumn));
    assert_eq!(repo.backend().table_names().unwrap(), vec!["brawo_cms_contents"]);

    let post = repo
        .create("blog_posts", &params(json!({"title": "Hello World"})))
        .unwrap();
    let faq = repo
        .create("faqs", &params(json!({"question": "Hello World", "answer": "Hi"})))
        .unwrap();

    // Slugs are unique per content type, not per table
    assert_eq!(post.slug, "hello-world");
    assert_eq!(faq.slug, "hello-world");
    assert_eq!(repo.list("faqs", None).unwrap().len(), 1);

    repo.delete("faqs", faq.id.unwrap()).unwrap();
    assert!(repo.find("faqs", faq.id.unwrap()).unwrap_err().is_not_found());
    assert!(repo.find("blog_posts", post.id.unwrap()).is_ok());
}
