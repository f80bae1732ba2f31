//! Schema pieces derived from registered content types and taxonomies: the
//! object types, root lookup fields and the create/update mutations.

use crate::core::registry::{HookList, InputFieldDef};
use crate::domain::model::{
    pascal_case, ContentItem, ContentTypeDef, ItemChanges, ItemDraft, MutationAction,
    MutationEvent, MutationInput, TaxonomyDef, Term,
};
use crate::domain::ports::{ContentStore, SharedStore};
use crate::utils::error::{PublisherError, Result};
use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ObjectAccessor, TypeRef,
};
use async_graphql::{Number, Value};

/// Resolved value of a `create*`/`update*` mutation.
#[derive(Debug, Clone)]
pub struct MutationPayload {
    pub client_mutation_id: Option<String>,
    pub item: ContentItem,
}

pub struct MutationParts {
    pub input: InputObject,
    pub payload: Object,
    pub field: Field,
}

pub fn parse_id(value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| PublisherError::InvalidId {
            value: value.to_string(),
        })
}

/// Parses `ids` and checks every one names an existing term of `taxonomy`.
pub async fn resolve_term_ids(
    store: &dyn ContentStore,
    taxonomy: &str,
    ids: &[String],
) -> Result<Vec<u64>> {
    let mut resolved = Vec::with_capacity(ids.len());
    for raw in ids {
        let id = parse_id(raw)?;
        if store.get_term(taxonomy, id).await?.is_none() {
            return Err(PublisherError::NotFound {
                kind: taxonomy.to_string(),
                id,
            });
        }
        resolved.push(id);
    }
    Ok(resolved)
}

fn first_arg(args: &ObjectAccessor<'_>) -> async_graphql::Result<Option<usize>> {
    match args.get("first") {
        Some(first) if !first.is_null() => Ok(Some(first.u64()? as usize)),
        _ => Ok(None),
    }
}

fn list<T: Send + Sync + 'static>(values: Vec<T>) -> FieldValue<'static> {
    FieldValue::list(values.into_iter().map(FieldValue::owned_any))
}

fn item_field(name: &str, type_ref: TypeRef, read: fn(&ContentItem) -> Value) -> Field {
    Field::new(name, type_ref, move |ctx| {
        FieldFuture::new(async move {
            let item = ctx.parent_value.try_downcast_ref::<ContentItem>()?;
            Ok(Some(read(item)))
        })
    })
}

fn term_field(name: &str, type_ref: TypeRef, read: fn(&Term) -> Value) -> Field {
    Field::new(name, type_ref, move |ctx| {
        FieldFuture::new(async move {
            let term = ctx.parent_value.try_downcast_ref::<Term>()?;
            Ok(Some(read(term)))
        })
    })
}

/// A nullable string field on a content type backed by the metadata entry `meta_key`.
pub fn meta_field(name: &str, meta_key: &'static str) -> Field {
    Field::new(name, TypeRef::named(TypeRef::STRING), move |ctx| {
        FieldFuture::new(async move {
            let item = ctx.parent_value.try_downcast_ref::<ContentItem>()?;
            let store = ctx.data::<SharedStore>()?;
            Ok(store.get_meta(item.id, meta_key).await?.map(Value::String))
        })
    })
}

pub fn content_object(def: &ContentTypeDef, taxonomies: &[TaxonomyDef]) -> Object {
    let mut object = Object::new(def.type_name())
        .description(format!("The {} content type", def.label))
        .field(item_field("id", TypeRef::named_nn(TypeRef::ID), |i| {
            Value::String(i.id.to_string())
        }))
        .field(item_field("databaseId", TypeRef::named_nn(TypeRef::INT), |i| {
            Value::Number(Number::from(i.id))
        }))
        .field(item_field("title", TypeRef::named_nn(TypeRef::STRING), |i| {
            Value::String(i.title.clone())
        }))
        .field(item_field("content", TypeRef::named_nn(TypeRef::STRING), |i| {
            Value::String(i.content.clone())
        }))
        .field(item_field("date", TypeRef::named_nn(TypeRef::STRING), |i| {
            Value::String(i.date.to_rfc3339())
        }))
        .field(item_field("modified", TypeRef::named_nn(TypeRef::STRING), |i| {
            Value::String(i.modified.to_rfc3339())
        }));

    for tax in taxonomies {
        let taxonomy = tax.name.clone();
        object = object.field(
            Field::new(
                &tax.graphql_plural_name,
                TypeRef::named_nn_list_nn(tax.type_name()),
                move |ctx| {
                    let taxonomy = taxonomy.clone();
                    FieldFuture::new(async move {
                        let item = ctx.parent_value.try_downcast_ref::<ContentItem>()?;
                        let store = ctx.data::<SharedStore>()?;
                        Ok(Some(list(store.item_terms(item.id, &taxonomy).await?)))
                    })
                },
            )
            .description(format!("{} assigned to this item", tax.label)),
        );
    }

    object
}

/// `<single>(id: ID!)` and `<plural>(first: Int)` on the root query.
pub fn content_root_fields(def: &ContentTypeDef) -> Vec<Field> {
    let kind = def.name.clone();
    let single = Field::new(
        &def.graphql_single_name,
        TypeRef::named(def.type_name()),
        move |ctx| {
            let kind = kind.clone();
            FieldFuture::new(async move {
                let id = parse_id(ctx.args.try_get("id")?.string()?)?;
                let store = ctx.data::<SharedStore>()?;
                Ok(store.get_item(&kind, id).await?.map(FieldValue::owned_any))
            })
        },
    )
    .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID)))
    .description(format!("A single {} by ID", def.graphql_single_name));

    let kind = def.name.clone();
    let plural = Field::new(
        &def.graphql_plural_name,
        TypeRef::named_nn_list_nn(def.type_name()),
        move |ctx| {
            let kind = kind.clone();
            FieldFuture::new(async move {
                let limit = first_arg(&ctx.args)?;
                let store = ctx.data::<SharedStore>()?;
                Ok(Some(list(store.list_items(&kind, limit).await?)))
            })
        },
    )
    .argument(InputValue::new("first", TypeRef::named(TypeRef::INT)))
    .description(format!("List of {}", def.label));

    vec![single, plural]
}

pub fn taxonomy_object(tax: &TaxonomyDef, content_types: &[ContentTypeDef]) -> Object {
    let mut object = Object::new(tax.type_name())
        .description(format!("The {} taxonomy", tax.label))
        .field(term_field("id", TypeRef::named_nn(TypeRef::ID), |t| {
            Value::String(t.id.to_string())
        }))
        .field(term_field("databaseId", TypeRef::named_nn(TypeRef::INT), |t| {
            Value::Number(Number::from(t.id))
        }))
        .field(term_field("name", TypeRef::named_nn(TypeRef::STRING), |t| {
            Value::String(t.name.clone())
        }))
        .field(term_field("slug", TypeRef::named_nn(TypeRef::STRING), |t| {
            Value::String(t.slug.clone())
        }))
        .field(term_field("description", TypeRef::named_nn(TypeRef::STRING), |t| {
            Value::String(t.description.clone())
        }));

    if tax.hierarchical {
        let taxonomy = tax.name.clone();
        object = object.field(Field::new(
            "parent",
            TypeRef::named(tax.type_name()),
            move |ctx| {
                let taxonomy = taxonomy.clone();
                FieldFuture::new(async move {
                    let term = ctx.parent_value.try_downcast_ref::<Term>()?;
                    let parent = match term.parent {
                        Some(parent) => parent,
                        None => return Ok(None),
                    };
                    let store = ctx.data::<SharedStore>()?;
                    Ok(store
                        .get_term(&taxonomy, parent)
                        .await?
                        .map(FieldValue::owned_any))
                })
            },
        ));

        let taxonomy = tax.name.clone();
        object = object.field(Field::new(
            "children",
            TypeRef::named_nn_list_nn(tax.type_name()),
            move |ctx| {
                let taxonomy = taxonomy.clone();
                FieldFuture::new(async move {
                    let term = ctx.parent_value.try_downcast_ref::<Term>()?;
                    let store = ctx.data::<SharedStore>()?;
                    Ok(Some(list(store.child_terms(&taxonomy, term.id).await?)))
                })
            },
        ));
    }

    for def in content_types {
        let taxonomy = tax.name.clone();
        let kind = def.name.clone();
        object = object.field(Field::new(
            &def.graphql_plural_name,
            TypeRef::named_nn_list_nn(def.type_name()),
            move |ctx| {
                let taxonomy = taxonomy.clone();
                let kind = kind.clone();
                FieldFuture::new(async move {
                    let term = ctx.parent_value.try_downcast_ref::<Term>()?;
                    let store = ctx.data::<SharedStore>()?;
                    Ok(Some(list(store.term_items(term.id, &taxonomy, &kind).await?)))
                })
            },
        ));
    }

    object
}

pub fn taxonomy_root_fields(tax: &TaxonomyDef) -> Vec<Field> {
    let taxonomy = tax.name.clone();
    let single = Field::new(
        &tax.graphql_single_name,
        TypeRef::named(tax.type_name()),
        move |ctx| {
            let taxonomy = taxonomy.clone();
            FieldFuture::new(async move {
                let id = parse_id(ctx.args.try_get("id")?.string()?)?;
                let store = ctx.data::<SharedStore>()?;
                Ok(store.get_term(&taxonomy, id).await?.map(FieldValue::owned_any))
            })
        },
    )
    .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID)));

    let taxonomy = tax.name.clone();
    let plural = Field::new(
        &tax.graphql_plural_name,
        TypeRef::named_nn_list_nn(tax.type_name()),
        move |ctx| {
            let taxonomy = taxonomy.clone();
            FieldFuture::new(async move {
                let limit = first_arg(&ctx.args)?;
                let store = ctx.data::<SharedStore>()?;
                Ok(Some(list(store.list_terms(&taxonomy, limit).await?)))
            })
        },
    )
    .argument(InputValue::new("first", TypeRef::named(TypeRef::INT)));

    vec![single, plural]
}

/// Input fields every create/update mutation starts with, before filters run.
pub fn base_input_fields(action: MutationAction, taxonomies: &[TaxonomyDef]) -> Vec<InputFieldDef> {
    let mut fields = Vec::new();
    if action == MutationAction::Update {
        fields.push(
            InputFieldDef::new("id", TypeRef::named_nn(TypeRef::ID))
                .description("ID of the object to update"),
        );
    }
    fields.push(InputFieldDef::new(
        "clientMutationId",
        TypeRef::named(TypeRef::STRING),
    ));
    fields.push(InputFieldDef::new("title", TypeRef::named(TypeRef::STRING)));
    fields.push(InputFieldDef::new("content", TypeRef::named(TypeRef::STRING)));
    for tax in taxonomies {
        fields.push(
            InputFieldDef::new(&tax.graphql_plural_name, TypeRef::named_nn_list(TypeRef::ID))
                .description(format!("{} to assign, replacing the current ones", tax.label)),
        );
    }
    fields
}

pub fn mutation_parts(
    def: &ContentTypeDef,
    action: MutationAction,
    taxonomies: &[TaxonomyDef],
    fields: Vec<InputFieldDef>,
    hooks: HookList,
) -> MutationParts {
    let verb = match action {
        MutationAction::Create => "create",
        MutationAction::Update => "update",
    };
    let type_name = def.type_name();
    let input_name = format!("{}{}Input", pascal_case(verb), type_name);
    let payload_name = format!("{}{}Payload", pascal_case(verb), type_name);
    let field_name = format!("{}{}", verb, type_name);

    let input = fields
        .into_iter()
        .fold(InputObject::new(&input_name), |input, field| {
            input.field(field.into_input_value())
        });

    let payload = Object::new(&payload_name)
        .field(Field::new(
            "clientMutationId",
            TypeRef::named(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let payload = ctx.parent_value.try_downcast_ref::<MutationPayload>()?;
                    Ok(payload.client_mutation_id.clone().map(Value::String))
                })
            },
        ))
        .field(Field::new(
            &def.graphql_single_name,
            TypeRef::named(&type_name),
            |ctx| {
                FieldFuture::new(async move {
                    let payload = ctx.parent_value.try_downcast_ref::<MutationPayload>()?;
                    Ok(Some(FieldValue::owned_any(payload.item.clone())))
                })
            },
        ));

    let kind = def.name.clone();
    let single_name = def.graphql_single_name.clone();
    let term_inputs: Vec<(String, String)> = taxonomies
        .iter()
        .map(|t| (t.graphql_plural_name.clone(), t.name.clone()))
        .collect();

    let field = Field::new(&field_name, TypeRef::named(&payload_name), move |ctx| {
        let kind = kind.clone();
        let single_name = single_name.clone();
        let term_inputs = term_inputs.clone();
        let hooks = hooks.clone();
        FieldFuture::new(async move {
            let input = MutationInput(ctx.args.try_get("input")?.deserialize()?);
            let store = ctx.data::<SharedStore>()?;

            // Every term id must resolve before the item is written.
            let mut assignments = Vec::with_capacity(term_inputs.len());
            for (input_key, taxonomy) in &term_inputs {
                if let Some(ids) = input.id_list(input_key) {
                    let ids = resolve_term_ids(&**store, taxonomy, &ids).await?;
                    assignments.push((taxonomy, ids));
                }
            }

            let item = match action {
                MutationAction::Create => {
                    store
                        .insert_item(ItemDraft {
                            kind: kind.clone(),
                            title: input.string("title").unwrap_or_default().to_string(),
                            content: input.string("content").unwrap_or_default().to_string(),
                        })
                        .await?
                }
                MutationAction::Update => {
                    let id = parse_id(input.string("id").unwrap_or_default())?;
                    store
                        .update_item(
                            &kind,
                            id,
                            ItemChanges {
                                title: input.string("title").map(str::to_string),
                                content: input.string("content").map(str::to_string),
                            },
                        )
                        .await?
                }
            };

            for (taxonomy, ids) in &assignments {
                store.set_item_terms(item.id, taxonomy, ids).await?;
            }

            let event = MutationEvent {
                kind: &kind,
                action,
                item: &item,
                input: &input,
            };
            for hook in hooks.iter() {
                hook.after_mutation(event, &**store).await?;
            }

            tracing::debug!("{} {} {}", verb, single_name, item.id);

            Ok(Some(FieldValue::owned_any(MutationPayload {
                client_mutation_id: input.string("clientMutationId").map(str::to_string),
                item,
            })))
        })
    })
    .argument(InputValue::new("input", TypeRef::named_nn(&input_name)));

    MutationParts {
        input,
        payload,
        field,
    }
}
