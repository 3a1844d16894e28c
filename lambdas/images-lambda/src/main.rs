use album_shared::config::MetadataSettings;
use album_shared::DynamoImageRecords;
use lambda_http::{run, service_fn, Error, Request};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    let metadata = MetadataSettings::from_env();
    tracing::info!("Images Lambda starting - table: {}", metadata.table_name);

    // Built once per cold start, shared by every invocation
    let config = aws_config::load_from_env().await;
    let records = Arc::new(DynamoImageRecords::new(&config, &metadata));

    run(service_fn(move |event: Request| {
        let records = Arc::clone(&records);
        async move { http_handler::function_handler(event, records.as_ref()).await }
    }))
    .await
}
