use album_shared::{listing, response, ImageRecords};
use lambda_http::{Body, Error, Request, RequestExt, Response, http::Method};

/// GET images?album= - lists an album's records, newest first
pub(crate) async fn function_handler(
    event: Request,
    records: &impl ImageRecords,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    tracing::info!(
        "🚀 Images Lambda invoked - Method: {} Path: {}",
        method,
        event.uri().path()
    );

    match method {
        &Method::OPTIONS => response::preflight("GET,OPTIONS"),
        &Method::GET => {
            let params = event.query_string_parameters_ref();
            let album = params.and_then(|params| params.first("album"));

            let outcome = listing::list_album_images(records, album)
                .await
                .and_then(|images| {
                    serde_json::to_value(images)
                        .map_err(|e| album_shared::ApiError::Internal(e.to_string()))
                });
            response::respond("list", outcome)
        }
        _ => response::method_not_allowed(),
    }
}
