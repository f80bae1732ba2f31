use crate::domain::model::SyndicatedBook;
use crate::utils::error::{PublisherError, Result};
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, Object, TypeRef};
use async_graphql::Value;
use reqwest::Client;
use std::sync::LazyLock;

/// Remote publishers queried when no `[syndication]` section is configured.
pub const DEFAULT_ENDPOINTS: [&str; 2] = [
    "https://books.publisher-one.example/graphql",
    "https://books.publisher-two.example/graphql",
];

pub const SYNDICATED_BOOKS_QUERY: &str = "{ books { id title price sourceName } }";

pub const SYNDICATED_BOOK_TYPE: &str = "SyndicatedBook";

/// Pulls book lists from remote GraphQL endpoints and merges them.
#[derive(Debug, Clone)]
pub struct SyndicationClient {
    client: Client,
    endpoints: Vec<String>,
}

impl SyndicationClient {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    pub fn with_client(client: Client, endpoints: Vec<String>) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// One POST to `endpoint`; any transport, status or shape problem is an error.
    pub async fn fetch_endpoint(&self, endpoint: &str) -> Result<Vec<SyndicatedBook>> {
        let response = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "query": SYNDICATED_BOOKS_QUERY }))
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        let books = body
            .pointer("/data/books")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| PublisherError::UnexpectedResponse {
                endpoint: endpoint.to_string(),
                reason: "data.books is missing or not a list".to_string(),
            })?;

        Ok(books.iter().filter_map(SyndicatedBook::from_json).collect())
    }

    /// Endpoints are queried one after another. A failing endpoint adds nothing
    /// and is not reported.
    pub async fn fetch_all(&self) -> Vec<SyndicatedBook> {
        let mut books = Vec::new();
        for endpoint in &self.endpoints {
            if let Ok(found) = self.fetch_endpoint(endpoint).await {
                books.extend(found);
            }
        }
        books
    }
}

pub struct BookFieldSpec {
    pub name: &'static str,
    pub type_name: &'static str,
    pub description: &'static str,
    read: fn(&SyndicatedBook) -> Option<&str>,
}

static SYNDICATED_BOOK_FIELDS: LazyLock<Vec<BookFieldSpec>> = LazyLock::new(|| {
    vec![
        BookFieldSpec {
            name: "id",
            type_name: TypeRef::ID,
            description: "The syndicated Book ID",
            read: |b| b.id.as_deref(),
        },
        BookFieldSpec {
            name: "title",
            type_name: TypeRef::STRING,
            description: "The syndicated Book Title",
            read: |b| b.title.as_deref(),
        },
        BookFieldSpec {
            name: "price",
            type_name: TypeRef::STRING,
            description: "The syndicated Book Price",
            read: |b| b.price.as_deref(),
        },
        BookFieldSpec {
            name: "sourceName",
            type_name: TypeRef::STRING,
            description: "The name of the source where the Book exists",
            read: |b| b.source_name.as_deref(),
        },
    ]
});

/// Field set of the `SyndicatedBook` type, computed once per process.
pub fn syndicated_book_fields() -> &'static [BookFieldSpec] {
    &SYNDICATED_BOOK_FIELDS
}

pub fn syndicated_book_object() -> Object {
    let object = Object::new(SYNDICATED_BOOK_TYPE)
        .description("A book that has been syndicated from another publishing system");

    syndicated_book_fields().iter().fold(object, |object, spec| {
        let read = spec.read;
        object.field(
            Field::new(spec.name, TypeRef::named(spec.type_name), move |ctx| {
                FieldFuture::new(async move {
                    let book = ctx.parent_value.try_downcast_ref::<SyndicatedBook>()?;
                    Ok(read(book).map(|s| Value::String(s.to_string())))
                })
            })
            .description(spec.description),
        )
    })
}

/// Root field resolving to the merged remote book lists.
pub fn syndicated_books_field() -> Field {
    Field::new(
        "syndicatedBooks",
        TypeRef::named_nn_list_nn(SYNDICATED_BOOK_TYPE),
        |ctx| {
            FieldFuture::new(async move {
                let client = ctx.data::<SyndicationClient>()?;
                let books = client.fetch_all().await;
                Ok(Some(FieldValue::list(
                    books.into_iter().map(FieldValue::owned_any),
                )))
            })
        },
    )
    .description("Books syndicated from the configured remote publishers")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const UNREACHABLE: &str = "http://127.0.0.1:1/graphql";

    fn book(id: &str, title: &str, price: &str, source: &str) -> SyndicatedBook {
        SyndicatedBook {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            price: Some(price.to_string()),
            source_name: Some(source.to_string()),
        }
    }

    #[tokio::test]
    async fn test_fetch_endpoint_posts_fixed_query() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .json_body(json!({ "query": SYNDICATED_BOOKS_QUERY }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "data": {"books": [
                        {"id": "1", "title": "T1", "price": "9.99", "sourceName": "A"},
                        {"id": "2", "title": "T2", "price": "5.00", "sourceName": "A"}
                    ]}
                }));
        });

        let client = SyndicationClient::new(vec![server.url("/graphql")]);
        let books = client.fetch_endpoint(&server.url("/graphql")).await.unwrap();

        api_mock.assert();
        assert_eq!(
            books,
            vec![book("1", "T1", "9.99", "A"), book("2", "T2", "5.00", "A")]
        );
    }

    #[tokio::test]
    async fn test_fetch_endpoint_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/status");
            then.status(502);
        });
        server.mock(|when, then| {
            when.method(POST).path("/shape");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"data": {"books": {"id": "1"}}}));
        });

        let client = SyndicationClient::new(vec![]);
        assert!(matches!(
            client.fetch_endpoint(&server.url("/status")).await,
            Err(PublisherError::ApiError(_))
        ));
        assert!(matches!(
            client.fetch_endpoint(&server.url("/shape")).await,
            Err(PublisherError::UnexpectedResponse { .. })
        ));
        assert!(client.fetch_endpoint(UNREACHABLE).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_skips_unreachable_endpoint() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/a");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "data": {"books": [{"id": "1", "title": "T1", "price": "9.99", "sourceName": "A"}]}
                }));
        });

        let client =
            SyndicationClient::new(vec![server.url("/a"), UNREACHABLE.to_string()]);
        let books = client.fetch_all().await;

        assert_eq!(books, vec![book("1", "T1", "9.99", "A")]);
    }

    #[tokio::test]
    async fn test_fetch_all_with_malformed_json_is_empty() {
        let server = MockServer::start();
        let malformed = server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .header("Content-Type", "application/json")
                .body("{\"data\": {\"books\": [");
        });

        let client = SyndicationClient::new(vec![server.url("/a"), server.url("/b")]);
        let books = client.fetch_all().await;

        malformed.assert_hits(2);
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_without_endpoints_is_empty() {
        let client = SyndicationClient::new(vec![]);
        assert!(client.fetch_all().await.is_empty());
        assert!(client.endpoints().is_empty());
    }

    #[test]
    fn test_field_set_is_computed_once() {
        let first = syndicated_book_fields();
        let second = syndicated_book_fields();

        assert!(std::ptr::eq(first, second));
        let names: Vec<_> = first.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["id", "title", "price", "sourceName"]);
    }

    #[test]
    fn test_field_readers() {
        let record = book("9", "Dune", "12.00", "B");
        let values: Vec<_> = syndicated_book_fields()
            .iter()
            .map(|f| (f.read)(&record))
            .collect();
        assert_eq!(values, vec![Some("9"), Some("Dune"), Some("12.00"), Some("B")]);
    }
}
