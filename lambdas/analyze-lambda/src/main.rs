use album_shared::config::{MetadataSettings, StorageSettings, VisionSettings};
use album_shared::{DynamoImageRecords, S3BlobStore, VisionClient};
use lambda_http::{run, service_fn, Error, Request};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod http_handler;

/// Clients built once per cold start, shared by every invocation
struct AppState {
    blobs: S3BlobStore,
    records: DynamoImageRecords,
    tagger: VisionClient,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    let storage = StorageSettings::from_env()?;
    let metadata = MetadataSettings::from_env();
    let vision = VisionSettings::from_env()?;
    tracing::info!(
        "Analyze Lambda starting - bucket: {} table: {} read URL expiry: {}s",
        storage.bucket,
        metadata.table_name,
        storage.read_url_expiry.as_secs()
    );

    let config = aws_config::load_from_env().await;
    let state = Arc::new(AppState {
        blobs: S3BlobStore::new(&config, &storage),
        records: DynamoImageRecords::new(&config, &metadata),
        tagger: VisionClient::new(&vision),
    });

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move {
            http_handler::function_handler(event, &state.blobs, &state.records, &state.tagger)
                .await
        }
    }))
    .await
}
