use crate::config::toml_config::SeedItem;
use crate::domain::model::{slugify, ContentItem, ItemChanges, ItemDraft, Term};
use crate::domain::ports::ContentStore;
use crate::utils::error::{PublisherError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    last_item_id: u64,
    last_term_id: u64,
    items: BTreeMap<u64, ContentItem>,
    meta: HashMap<(u64, String), String>,
    terms: BTreeMap<u64, Term>,
    assignments: HashMap<(u64, String), Vec<u64>>,
}

/// Process-local content store. Items and terms are kept in id order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the `[[seed.items]]` entries of the service file.
    pub async fn seed(&self, items: &[SeedItem]) -> Result<()> {
        for seed in items {
            let item = self
                .insert_item(ItemDraft {
                    kind: seed.kind.clone(),
                    title: seed.title.clone(),
                    content: seed.content.clone().unwrap_or_default(),
                })
                .await?;

            for (key, value) in &seed.meta {
                self.set_meta(item.id, key, value).await?;
            }

            for (taxonomy, names) in &seed.terms {
                let mut term_ids = Vec::with_capacity(names.len());
                for name in names {
                    let term = match self.find_term_by_name(taxonomy, name).await {
                        Some(term) => term,
                        None => self.insert_term(taxonomy, name, None).await?,
                    };
                    term_ids.push(term.id);
                }
                self.set_item_terms(item.id, taxonomy, &term_ids).await?;
            }
        }

        tracing::debug!("Seeded {} content items", items.len());
        Ok(())
    }

    async fn find_term_by_name(&self, taxonomy: &str, name: &str) -> Option<Term> {
        let inner = self.inner.read().await;
        inner
            .terms
            .values()
            .find(|t| t.taxonomy == taxonomy && t.name == name)
            .cloned()
    }
}

fn take_limit<T>(iter: impl Iterator<Item = T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(n) => iter.take(n).collect(),
        None => iter.collect(),
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_item(&self, kind: &str, id: u64) -> Result<Option<ContentItem>> {
        let inner = self.inner.read().await;
        Ok(inner.items.get(&id).filter(|i| i.kind == kind).cloned())
    }

    async fn list_items(&self, kind: &str, limit: Option<usize>) -> Result<Vec<ContentItem>> {
        let inner = self.inner.read().await;
        Ok(take_limit(
            inner.items.values().filter(|i| i.kind == kind).cloned(),
            limit,
        ))
    }

    async fn insert_item(&self, draft: ItemDraft) -> Result<ContentItem> {
        let mut inner = self.inner.write().await;
        inner.last_item_id += 1;
        let now = Utc::now();
        let item = ContentItem {
            id: inner.last_item_id,
            kind: draft.kind,
            title: draft.title,
            content: draft.content,
            date: now,
            modified: now,
        };
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        kind: &str,
        id: u64,
        changes: ItemChanges,
    ) -> Result<ContentItem> {
        let mut inner = self.inner.write().await;
        let item = inner
            .items
            .get_mut(&id)
            .filter(|i| i.kind == kind)
            .ok_or_else(|| PublisherError::NotFound {
                kind: kind.to_string(),
                id,
            })?;

        if let Some(title) = changes.title {
            item.title = title;
        }
        if let Some(content) = changes.content {
            item.content = content;
        }
        item.modified = Utc::now();
        Ok(item.clone())
    }

    async fn get_meta(&self, item_id: u64, key: &str) -> Result<Option<String>> {
        let inner = self.inner.read().await;
        Ok(inner.meta.get(&(item_id, key.to_string())).cloned())
    }

    async fn set_meta(&self, item_id: u64, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.items.contains_key(&item_id) {
            return Err(PublisherError::NotFound {
                kind: "item".to_string(),
                id: item_id,
            });
        }
        inner
            .meta
            .insert((item_id, key.to_string()), value.to_string());
        Ok(())
    }

    async fn get_term(&self, taxonomy: &str, id: u64) -> Result<Option<Term>> {
        let inner = self.inner.read().await;
        Ok(inner
            .terms
            .get(&id)
            .filter(|t| t.taxonomy == taxonomy)
            .cloned())
    }

    async fn list_terms(&self, taxonomy: &str, limit: Option<usize>) -> Result<Vec<Term>> {
        let inner = self.inner.read().await;
        Ok(take_limit(
            inner
                .terms
                .values()
                .filter(|t| t.taxonomy == taxonomy)
                .cloned(),
            limit,
        ))
    }

    async fn child_terms(&self, taxonomy: &str, parent: u64) -> Result<Vec<Term>> {
        let inner = self.inner.read().await;
        Ok(inner
            .terms
            .values()
            .filter(|t| t.taxonomy == taxonomy && t.parent == Some(parent))
            .cloned()
            .collect())
    }

    async fn insert_term(&self, taxonomy: &str, name: &str, parent: Option<u64>) -> Result<Term> {
        let mut inner = self.inner.write().await;
        if let Some(parent_id) = parent {
            let parent_ok = inner
                .terms
                .get(&parent_id)
                .is_some_and(|t| t.taxonomy == taxonomy);
            if !parent_ok {
                return Err(PublisherError::NotFound {
                    kind: taxonomy.to_string(),
                    id: parent_id,
                });
            }
        }

        inner.last_term_id += 1;
        let term = Term {
            id: inner.last_term_id,
            taxonomy: taxonomy.to_string(),
            name: name.to_string(),
            slug: slugify(name),
            description: String::new(),
            parent,
        };
        inner.terms.insert(term.id, term.clone());
        Ok(term)
    }

    async fn set_item_terms(&self, item_id: u64, taxonomy: &str, term_ids: &[u64]) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.items.contains_key(&item_id) {
            return Err(PublisherError::NotFound {
                kind: "item".to_string(),
                id: item_id,
            });
        }

        let mut assigned: Vec<u64> = Vec::with_capacity(term_ids.len());
        for &id in term_ids {
            if !inner.terms.get(&id).is_some_and(|t| t.taxonomy == taxonomy) {
                return Err(PublisherError::NotFound {
                    kind: taxonomy.to_string(),
                    id,
                });
            }
            if !assigned.contains(&id) {
                assigned.push(id);
            }
        }

        inner
            .assignments
            .insert((item_id, taxonomy.to_string()), assigned);
        Ok(())
    }

    async fn item_terms(&self, item_id: u64, taxonomy: &str) -> Result<Vec<Term>> {
        let inner = self.inner.read().await;
        let ids = match inner.assignments.get(&(item_id, taxonomy.to_string())) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .filter_map(|id| inner.terms.get(id).cloned())
            .collect())
    }

    async fn term_items(
        &self,
        term_id: u64,
        taxonomy: &str,
        kind: &str,
    ) -> Result<Vec<ContentItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .values()
            .filter(|item| item.kind == kind)
            .filter(|item| {
                inner
                    .assignments
                    .get(&(item.id, taxonomy.to_string()))
                    .is_some_and(|ids| ids.contains(&term_id))
            })
            .cloned()
            .collect())
    }
}
