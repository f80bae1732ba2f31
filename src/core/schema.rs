use crate::core::registrations::REGISTRATIONS;
use crate::core::registry::{Registration, SchemaRegistry};
use crate::core::syndication::SyndicationClient;
use crate::domain::ports::SharedStore;
use crate::utils::error::Result;
use async_graphql::dynamic::Schema;

/// Builds the executable schema from the standard registration list.
pub fn build_schema(store: SharedStore, syndication: SyndicationClient) -> Result<Schema> {
    build_schema_with(REGISTRATIONS, store, syndication)
}

pub fn build_schema_with(
    registrations: &[Registration],
    store: SharedStore,
    syndication: SyndicationClient,
) -> Result<Schema> {
    let registry = registrations
        .iter()
        .fold(SchemaRegistry::new(), |registry, register| register(registry));

    let schema = registry.freeze(store, syndication)?;
    tracing::info!("GraphQL schema built from {} registrations", registrations.len());
    Ok(schema)
}
