//! The workshop's schema extensions, one registration per concern.

use crate::core::content::meta_field;
use crate::core::registry::{InputFieldDef, Registration, SchemaRegistry};
use crate::core::syndication::{syndicated_book_object, syndicated_books_field};
use crate::domain::model::{ContentTypeDef, MutationEvent, TaxonomyDef};
use crate::domain::ports::{ContentStore, MutationHook};
use crate::utils::error::Result;
use async_graphql::dynamic::{Field, FieldFuture, TypeRef};
use async_graphql::Value;
use async_trait::async_trait;

pub const WORD_CAMP_ROCKS: &str = "Yes, it does";
pub const BOOK_TYPE: &str = "book";
pub const COLOR_META_KEY: &str = "color";
pub const PRICE_META_KEY: &str = "price";

/// Run in this order by [`crate::core::schema::build_schema`].
pub const REGISTRATIONS: &[Registration] = &[
    register_post_type,
    register_word_camp_rocks,
    register_post_color,
    register_book_type,
    register_genre_taxonomy,
    register_book_price_field,
    register_book_price_input,
    register_book_price_hook,
    register_syndicated_books,
];

pub fn register_post_type(registry: SchemaRegistry) -> SchemaRegistry {
    registry.content_type(ContentTypeDef::new("post", "Posts", "post", "posts"))
}

pub fn register_word_camp_rocks(registry: SchemaRegistry) -> SchemaRegistry {
    registry.root_field(
        Field::new("wordCampRocks", TypeRef::named(TypeRef::STRING), |_| {
            FieldFuture::new(async { Ok(Some(Value::String(WORD_CAMP_ROCKS.to_string()))) })
        })
        .description("An example field showing how to add to the root schema"),
    )
}

pub fn register_post_color(registry: SchemaRegistry) -> SchemaRegistry {
    registry.type_field(
        "Post",
        meta_field("color", COLOR_META_KEY).description("The color of the post"),
    )
}

pub fn register_book_type(registry: SchemaRegistry) -> SchemaRegistry {
    registry.content_type(ContentTypeDef::new(BOOK_TYPE, "Books", "book", "books"))
}

pub fn register_genre_taxonomy(registry: SchemaRegistry) -> SchemaRegistry {
    registry.taxonomy(
        TaxonomyDef::new("genre", "Genres", "genre", "genres")
            .hierarchical()
            .for_object_type(BOOK_TYPE),
    )
}

pub fn register_book_price_field(registry: SchemaRegistry) -> SchemaRegistry {
    registry.type_field(
        "Book",
        meta_field("price", PRICE_META_KEY).description("The price of the book"),
    )
}

fn add_price_input(kind: &str, mut fields: Vec<InputFieldDef>) -> Vec<InputFieldDef> {
    if kind == BOOK_TYPE {
        fields.push(
            InputFieldDef::new("price", TypeRef::named(TypeRef::STRING))
                .description("The price of the book"),
        );
    }
    fields
}

pub fn register_book_price_input(registry: SchemaRegistry) -> SchemaRegistry {
    registry.input_filter(add_price_input)
}

/// Stores `input.price` as the book's `price` metadata. Empty values and
/// other types are ignored.
pub struct SaveBookPrice;

#[async_trait]
impl MutationHook for SaveBookPrice {
    async fn after_mutation(
        &self,
        event: MutationEvent<'_>,
        store: &dyn ContentStore,
    ) -> Result<()> {
        if event.kind != BOOK_TYPE {
            return Ok(());
        }
        match event.input.string(PRICE_META_KEY) {
            Some(price) if !price.is_empty() => {
                store.set_meta(event.item.id, PRICE_META_KEY, price).await
            }
            _ => Ok(()),
        }
    }
}

pub fn register_book_price_hook(registry: SchemaRegistry) -> SchemaRegistry {
    registry.mutation_hook(SaveBookPrice)
}

pub fn register_syndicated_books(registry: SchemaRegistry) -> SchemaRegistry {
    registry
        .object(syndicated_book_object())
        .root_field(syndicated_books_field())
}
