use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored entry of some registered content type (`post`, `book`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Fields for creating a content item. The store assigns id and timestamps.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub kind: String,
    pub title: String,
    pub content: String,
}

/// Partial update; `None` leaves the attribute alone.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: u64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeDef {
    pub name: String,
    pub label: String,
    pub graphql_single_name: String,
    pub graphql_plural_name: String,
    pub show_in_graphql: bool,
}

impl ContentTypeDef {
    pub fn new(name: &str, label: &str, single: &str, plural: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            graphql_single_name: single.to_string(),
            graphql_plural_name: plural.to_string(),
            show_in_graphql: true,
        }
    }

    /// Object type name in the schema, e.g. `book` -> `Book`.
    pub fn type_name(&self) -> String {
        pascal_case(&self.graphql_single_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyDef {
    pub name: String,
    pub label: String,
    pub object_types: Vec<String>,
    pub hierarchical: bool,
    pub graphql_single_name: String,
    pub graphql_plural_name: String,
    pub show_in_graphql: bool,
}

impl TaxonomyDef {
    pub fn new(name: &str, label: &str, single: &str, plural: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            object_types: Vec::new(),
            hierarchical: false,
            graphql_single_name: single.to_string(),
            graphql_plural_name: plural.to_string(),
            show_in_graphql: true,
        }
    }

    pub fn hierarchical(mut self) -> Self {
        self.hierarchical = true;
        self
    }

    pub fn for_object_type(mut self, content_type: &str) -> Self {
        self.object_types.push(content_type.to_string());
        self
    }

    pub fn type_name(&self) -> String {
        pascal_case(&self.graphql_single_name)
    }

    pub fn applies_to(&self, content_type: &str) -> bool {
        self.object_types.iter().any(|t| t == content_type)
    }
}

/// A book as reported by a remote publisher. Read-only and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyndicatedBook {
    pub id: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub source_name: Option<String>,
}

impl SyndicatedBook {
    /// Coerces one element of a remote `data.books` list.
    ///
    /// Strings are taken as-is, numbers and booleans are rendered as text and
    /// anything else reads as null. Non-object elements yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: coerce_string(obj.get("id")),
            title: coerce_string(obj.get("title")),
            price: coerce_string(obj.get("price")),
            source_name: coerce_string(obj.get("sourceName")),
        })
    }
}

fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Create,
    Update,
}

/// Raw mutation input as sent by the client, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationInput(pub Map<String, Value>);

impl MutationInput {
    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// ID lists like `genres: ["1", "4"]`. Absent or null means "not provided".
    pub fn id_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.0.get(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|v| coerce_string(Some(v)))
                .collect(),
        )
    }
}

/// Passed to every mutation hook after the item has been written.
#[derive(Debug, Clone, Copy)]
pub struct MutationEvent<'a> {
    /// Content-type name, e.g. `book`.
    pub kind: &'a str,
    pub action: MutationAction,
    pub item: &'a ContentItem,
    pub input: &'a MutationInput,
}

pub fn pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
