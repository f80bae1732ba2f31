use crate::core::content::{self, MutationParts};
use crate::core::syndication::SyndicationClient;
use crate::domain::model::{ContentTypeDef, MutationAction, TaxonomyDef};
use crate::domain::ports::{MutationHook, SharedStore};
use crate::utils::error::{PublisherError, Result};
use async_graphql::dynamic::{Field, InputObject, InputValue, Object, Schema, TypeRef};
use std::collections::HashMap;
use std::sync::Arc;

pub const QUERY_TYPE: &str = "Query";
pub const MUTATION_TYPE: &str = "Mutation";

/// One unit of schema-building logic. Receives the registry and hands it on.
pub type Registration = fn(SchemaRegistry) -> SchemaRegistry;

/// Rewrites the input field list of a content type's create/update mutation.
/// The first argument is the content-type name (e.g. `book`) of the affected type.
pub type InputFieldFilter = fn(&str, Vec<InputFieldDef>) -> Vec<InputFieldDef>;

pub type HookList = Arc<[Arc<dyn MutationHook>]>;

#[derive(Debug, Clone)]
pub struct InputFieldDef {
    pub name: String,
    pub type_ref: TypeRef,
    pub description: Option<String>,
}

impl InputFieldDef {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_input_value(self) -> InputValue {
        let value = InputValue::new(self.name, self.type_ref);
        match self.description {
            Some(description) => value.description(description),
            None => value,
        }
    }
}

/// Accumulates fields, types and mutation extensions while the schema is built.
///
/// Nothing here is executable until [`SchemaRegistry::freeze`] turns it into a
/// [`Schema`]; after that the registry is gone and the schema is immutable.
#[derive(Default)]
pub struct SchemaRegistry {
    root_fields: Vec<Field>,
    type_fields: HashMap<String, Vec<Field>>,
    objects: Vec<Object>,
    content_types: Vec<ContentTypeDef>,
    taxonomies: Vec<TaxonomyDef>,
    input_filters: Vec<InputFieldFilter>,
    mutation_hooks: Vec<Arc<dyn MutationHook>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_field(mut self, field: Field) -> Self {
        self.root_fields.push(field);
        self
    }

    /// Adds `field` to the object type named `type_name` (e.g. `Post`).
    pub fn type_field(mut self, type_name: &str, field: Field) -> Self {
        self.type_fields
            .entry(type_name.to_string())
            .or_default()
            .push(field);
        self
    }

    pub fn object(mut self, object: Object) -> Self {
        self.objects.push(object);
        self
    }

    /// Registering the same content-type name again replaces the earlier definition.
    pub fn content_type(mut self, def: ContentTypeDef) -> Self {
        self.content_types.retain(|d| d.name != def.name);
        self.content_types.push(def);
        self
    }

    pub fn taxonomy(mut self, def: TaxonomyDef) -> Self {
        self.taxonomies.retain(|d| d.name != def.name);
        self.taxonomies.push(def);
        self
    }

    pub fn input_filter(mut self, filter: InputFieldFilter) -> Self {
        self.input_filters.push(filter);
        self
    }

    pub fn mutation_hook(mut self, hook: impl MutationHook + 'static) -> Self {
        self.mutation_hooks.push(Arc::new(hook));
        self
    }

    pub fn content_types(&self) -> &[ContentTypeDef] {
        &self.content_types
    }

    pub fn taxonomies(&self) -> &[TaxonomyDef] {
        &self.taxonomies
    }

    pub fn mutation_hook_count(&self) -> usize {
        self.mutation_hooks.len()
    }

    /// Runs every input filter, in registration order, over `base`.
    pub fn filtered_input_fields(
        &self,
        kind: &str,
        base: Vec<InputFieldDef>,
    ) -> Vec<InputFieldDef> {
        self.input_filters
            .iter()
            .fold(base, |fields, filter| filter(kind, fields))
    }

    pub fn freeze(mut self, store: SharedStore, syndication: SyndicationClient) -> Result<Schema> {
        let hooks: HookList = std::mem::take(&mut self.mutation_hooks).into();

        let content_types: Vec<ContentTypeDef> = self
            .content_types
            .iter()
            .filter(|d| d.show_in_graphql)
            .cloned()
            .collect();
        let taxonomies: Vec<TaxonomyDef> = self
            .taxonomies
            .iter()
            .filter(|t| t.show_in_graphql)
            .cloned()
            .collect();

        let mut query = Object::new(QUERY_TYPE);
        let mut mutation = Object::new(MUTATION_TYPE);
        let mut mutation_count = 0usize;
        let mut objects: Vec<Object> = Vec::new();
        let mut inputs: Vec<InputObject> = Vec::new();

        for def in &content_types {
            let connected: Vec<TaxonomyDef> = taxonomies
                .iter()
                .filter(|t| t.applies_to(&def.name))
                .cloned()
                .collect();

            let mut object = content::content_object(def, &connected);
            for field in self.take_type_fields(&def.type_name()) {
                object = object.field(field);
            }
            objects.push(object);

            for field in content::content_root_fields(def) {
                query = query.field(field);
            }

            for action in [MutationAction::Create, MutationAction::Update] {
                let base = content::base_input_fields(action, &connected);
                let fields = self.filtered_input_fields(&def.name, base);
                let MutationParts {
                    input,
                    payload,
                    field,
                } = content::mutation_parts(def, action, &connected, fields, hooks.clone());
                inputs.push(input);
                objects.push(payload);
                mutation = mutation.field(field);
                mutation_count += 1;
            }
        }

        for tax in &taxonomies {
            let connected: Vec<ContentTypeDef> = content_types
                .iter()
                .filter(|d| tax.applies_to(&d.name))
                .cloned()
                .collect();

            let mut object = content::taxonomy_object(tax, &connected);
            for field in self.take_type_fields(&tax.type_name()) {
                object = object.field(field);
            }
            objects.push(object);

            for field in content::taxonomy_root_fields(tax) {
                query = query.field(field);
            }
        }

        for mut object in std::mem::take(&mut self.objects) {
            let type_name = object.type_name().to_string();
            for field in self.take_type_fields(&type_name) {
                object = object.field(field);
            }
            objects.push(object);
        }

        if let Some(type_name) = self.type_fields.keys().next() {
            return Err(PublisherError::SchemaError {
                message: format!("fields registered on unknown type '{}'", type_name),
            });
        }

        for field in std::mem::take(&mut self.root_fields) {
            query = query.field(field);
        }

        tracing::debug!(
            "Freezing schema: {} content types, {} taxonomies, {} object types, {} mutations",
            content_types.len(),
            taxonomies.len(),
            objects.len(),
            mutation_count
        );

        let mut builder = Schema::build(
            QUERY_TYPE,
            (mutation_count > 0).then_some(MUTATION_TYPE),
            None,
        )
        .register(query);
        if mutation_count > 0 {
            builder = builder.register(mutation);
        }
        for object in objects {
            builder = builder.register(object);
        }
        for input in inputs {
            builder = builder.register(input);
        }

        builder
            .data(store)
            .data(syndication)
            .finish()
            .map_err(|e| PublisherError::SchemaError {
                message: e.to_string(),
            })
    }

    fn take_type_fields(&mut self, type_name: &str) -> Vec<Field> {
        self.type_fields.remove(type_name).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryStore;
    use async_graphql::dynamic::FieldFuture;
    use async_graphql::Value;

    fn store() -> SharedStore {
        Arc::new(MemoryStore::new())
    }

    fn hello_field() -> Field {
        Field::new("hello", TypeRef::named_nn(TypeRef::STRING), |_| {
            FieldFuture::new(async { Ok(Some(Value::String("world".to_string()))) })
        })
    }

    fn add_rating(kind: &str, mut fields: Vec<InputFieldDef>) -> Vec<InputFieldDef> {
        if kind == "movie" {
            fields.push(InputFieldDef::new("rating", TypeRef::named(TypeRef::INT)));
        }
        fields
    }

    #[test]
    fn test_content_type_registration_replaces_same_name() {
        let registry = SchemaRegistry::new()
            .content_type(ContentTypeDef::new("movie", "Movies", "movie", "movies"))
            .content_type(ContentTypeDef::new("movie", "Films", "film", "films"));

        assert_eq!(registry.content_types().len(), 1);
        assert_eq!(registry.content_types()[0].graphql_single_name, "film");
    }

    #[test]
    fn test_input_filters_only_touch_matching_type() {
        let registry = SchemaRegistry::new().input_filter(add_rating);
        let base = vec![InputFieldDef::new("title", TypeRef::named(TypeRef::STRING))];

        let movie: Vec<_> = registry
            .filtered_input_fields("movie", base.clone())
            .into_iter()
            .map(|f| f.name)
            .collect();
        let post: Vec<_> = registry
            .filtered_input_fields("post", base)
            .into_iter()
            .map(|f| f.name)
            .collect();

        assert_eq!(movie, vec!["title", "rating"]);
        assert_eq!(post, vec!["title"]);
    }

    #[tokio::test]
    async fn test_freeze_with_only_root_fields_has_no_mutation() {
        let schema = SchemaRegistry::new()
            .root_field(hello_field())
            .freeze(store(), SyndicationClient::new(vec![]))
            .unwrap();

        let response = schema.execute("{ hello }").await;
        assert!(response.errors.is_empty());
        assert_eq!(
            response.data.into_json().unwrap(),
            serde_json::json!({"hello": "world"})
        );
        assert!(!schema.sdl().contains("type Mutation"));
    }

    #[test]
    fn test_freeze_rejects_fields_on_unknown_type() {
        let result = SchemaRegistry::new()
            .root_field(hello_field())
            .type_field("Nowhere", hello_field())
            .freeze(store(), SyndicationClient::new(vec![]));

        assert!(matches!(result, Err(PublisherError::SchemaError { .. })));
    }

    #[test]
    fn test_freeze_builds_content_type_surface() {
        let schema = SchemaRegistry::new()
            .content_type(ContentTypeDef::new("movie", "Movies", "movie", "movies"))
            .input_filter(add_rating)
            .type_field("Movie", hello_field())
            .freeze(store(), SyndicationClient::new(vec![]))
            .unwrap();

        let sdl = schema.sdl();
        assert!(sdl.contains("type Movie"));
        assert!(sdl.contains("input CreateMovieInput"));
        assert!(sdl.contains("input UpdateMovieInput"));
        assert!(sdl.contains("type UpdateMoviePayload"));
        assert!(sdl.contains("rating: Int"));
        assert!(sdl.contains("hello: String!"));
    }
}
