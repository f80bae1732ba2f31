use anyhow::Context;
use clap::Parser;
use publisher_graph::adapters::http;
use publisher_graph::domain::ports::{ConfigProvider, SharedStore};
use publisher_graph::utils::{logger, validation, validation::Validate};
use publisher_graph::{build_schema, CliConfig, MemoryStore, SyndicationClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load_service_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logging() {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting publisher-graph");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let memory_store = MemoryStore::new();
    memory_store
        .seed(&config.seed.items)
        .await
        .context("failed to seed content store")?;
    let store: SharedStore = Arc::new(memory_store);

    let syndication = SyndicationClient::new(config.syndication_endpoints().to_vec());
    tracing::info!(
        "Syndicating books from {} endpoint(s)",
        syndication.endpoints().len()
    );

    let schema = build_schema(store, syndication).context("failed to build GraphQL schema")?;

    if cli.print_schema {
        println!("{}", schema.sdl());
        return Ok(());
    }

    let addr = validation::validate_socket_addr("server.listen", config.listen_addr())?;
    let router = http::router(schema, config.graphiql_enabled());
    http::serve(addr, router).await?;

    Ok(())
}
