use crate::domain::model::{ContentItem, ItemChanges, ItemDraft, MutationEvent, Term};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for content items, their metadata and taxonomy terms.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_item(&self, kind: &str, id: u64) -> Result<Option<ContentItem>>;
    async fn list_items(&self, kind: &str, limit: Option<usize>) -> Result<Vec<ContentItem>>;
    async fn insert_item(&self, draft: ItemDraft) -> Result<ContentItem>;
    /// Fails with `NotFound` when `id` is missing or belongs to another kind.
    async fn update_item(&self, kind: &str, id: u64, changes: ItemChanges)
        -> Result<ContentItem>;

    async fn get_meta(&self, item_id: u64, key: &str) -> Result<Option<String>>;
    async fn set_meta(&self, item_id: u64, key: &str, value: &str) -> Result<()>;

    async fn get_term(&self, taxonomy: &str, id: u64) -> Result<Option<Term>>;
    async fn list_terms(&self, taxonomy: &str, limit: Option<usize>) -> Result<Vec<Term>>;
    async fn child_terms(&self, taxonomy: &str, parent: u64) -> Result<Vec<Term>>;
    async fn insert_term(&self, taxonomy: &str, name: &str, parent: Option<u64>) -> Result<Term>;
    /// Replaces the item's assignment for `taxonomy`.
    async fn set_item_terms(&self, item_id: u64, taxonomy: &str, term_ids: &[u64]) -> Result<()>;
    async fn item_terms(&self, item_id: u64, taxonomy: &str) -> Result<Vec<Term>>;
    async fn term_items(&self, term_id: u64, taxonomy: &str, kind: &str)
        -> Result<Vec<ContentItem>>;
}

pub type SharedStore = Arc<dyn ContentStore>;

/// Side effect run after a create/update mutation has stored its item.
#[async_trait]
pub trait MutationHook: Send + Sync {
    async fn after_mutation(&self, event: MutationEvent<'_>, store: &dyn ContentStore)
        -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn listen_addr(&self) -> &str;
    fn syndication_endpoints(&self) -> &[String];
    fn graphiql_enabled(&self) -> bool;
}
