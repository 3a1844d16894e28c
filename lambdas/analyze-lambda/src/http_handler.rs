use album_shared::{analyze, response, BlobStore, ImageRecords, ImageTagger};
use lambda_http::{Body, Error, Request, Response, http::Method};

/// POST analyze - tags an already uploaded image and stores its record
pub(crate) async fn function_handler(
    event: Request,
    blobs: &impl BlobStore,
    records: &impl ImageRecords,
    tagger: &impl ImageTagger,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    tracing::info!(
        "🚀 Analyze Lambda invoked - Method: {} Path: {}",
        method,
        event.uri().path()
    );

    match method {
        &Method::OPTIONS => response::preflight("POST,OPTIONS"),
        &Method::POST => {
            let outcome = analyze::analyze_image(blobs, records, tagger, event.body())
                .await
                .map(|record| analyze::success_body(&record));
            response::respond("analyze", outcome)
        }
        _ => response::method_not_allowed(),
    }
}
