use envconfig::Envconfig;
use eyre::{Context, OptionExt};
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_watcher::config::Config;
use youtube_watcher::schema_registry::SchemaRegistryClient;
use youtube_watcher::serialization::AvroValueSerializer;
use youtube_watcher::{KafkaSink, PrintSink, YouTubeClient, run};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let config = Config::init_from_env().context("read configuration from environment")?;

    let http = reqwest::Client::new();
    let yt = YouTubeClient::new(&config.google_api_key, http.clone())
        .with_base_url(&config.youtube_api_url)
        .with_page_size(config.youtube_page_size);

    let report = if config.print_sink {
        tracing::info!("print sink enabled, nothing will be produced to Kafka");
        run(&yt, &config.youtube_playlist_id, PrintSink::default()).await?
    } else {
        let registry_url = config
            .schema_registry_url
            .as_deref()
            .ok_or_eyre("SCHEMA_REGISTRY_URL must be set unless PRINT_SINK is enabled")?;
        let mut registry = SchemaRegistryClient::new(registry_url, http);
        if let Some(credentials) = &config.schema_registry_basic_auth {
            registry = registry.with_basic_auth(credentials);
        }

        let subject = config.value_subject();
        let schema = registry
            .latest_version(&subject)
            .await
            .with_context(|| format!("fetch value schema for {subject}"))?;
        tracing::info!(
            subject,
            schema_id = schema.id,
            version = schema.version,
            "using registered value schema"
        );

        let sink = KafkaSink::new(&config.kafka, AvroValueSerializer::from(schema))
            .context("create Kafka producer")?;
        run(&yt, &config.youtube_playlist_id, sink).await?
    };

    tracing::info!(
        delivered = report.delivered,
        failed = report.failed,
        "playlist published"
    );
    Ok(())
}
