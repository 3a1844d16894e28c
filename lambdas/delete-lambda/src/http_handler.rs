use album_shared::{delete, response, BlobStore, ImageRecords};
use lambda_http::{Body, Error, Request, Response, http::Method};

/// POST delete - removes an image blob and its metadata record
pub(crate) async fn function_handler(
    event: Request,
    blobs: &impl BlobStore,
    records: &impl ImageRecords,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    tracing::info!(
        "🚀 Delete Lambda invoked - Method: {} Path: {}",
        method,
        event.uri().path()
    );

    match method {
        &Method::OPTIONS => response::preflight("POST,OPTIONS"),
        &Method::POST => {
            let outcome = delete::delete_image(blobs, records, event.body())
                .await
                .map(|id| delete::success_body(&id));
            response::respond("delete", outcome)
        }
        _ => response::method_not_allowed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use album_shared::testing::{MemoryBlobStore, MemoryImageRecords};
    use album_shared::ImageRecord;
    use lambda_http::http::StatusCode;

    fn request(method: &str, body: &str) -> Request {
        lambda_http::http::Request::builder()
            .method(method)
            .uri("/api/delete")
            .body(Body::from(body))
            .unwrap()
    }

    fn body_json(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn cat_record() -> ImageRecord {
        ImageRecord {
            id: "myalbum::cat.jpg".to_string(),
            album: "myalbum".to_string(),
            name: "cat.jpg".to_string(),
            url: "https://photos.s3.amazonaws.com/myalbum/cat.jpg".to_string(),
            tags: vec!["cat".to_string()],
            caption: None,
            created_at: "2026-10-19T08:15:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn delete_reports_the_id() {
        let blobs = MemoryBlobStore::with_blobs(&["myalbum/cat.jpg"]);
        let records = MemoryImageRecords::with_records(vec![cat_record()]);

        let response = function_handler(
            request("POST", r#"{"album":"myalbum","name":"cat.jpg"}"#),
            &blobs,
            &records,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(&response),
            serde_json::json!({"ok": true, "deleted": "myalbum::cat.jpg"})
        );
        assert!(!blobs.contains("myalbum/cat.jpg"));
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_album_is_400_without_calls() {
        let blobs = MemoryBlobStore::default();
        let records = MemoryImageRecords::default();

        let response = function_handler(request("POST", r#"{"name":"cat.jpg"}"#), &blobs, &records)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&response),
            serde_json::json!({"error": "album + name required"})
        );
        assert!(blobs.calls().is_empty());
        assert!(records.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_record_is_500() {
        let response = function_handler(
            request("POST", r#"{"album":"myalbum","name":"ghost.jpg"}"#),
            &MemoryBlobStore::default(),
            &MemoryImageRecords::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(&response)["error"],
            "image record not found: myalbum::ghost.jpg"
        );
    }

    #[tokio::test]
    async fn preflight_and_wrong_method() {
        let blobs = MemoryBlobStore::default();
        let records = MemoryImageRecords::default();

        let response = function_handler(request("OPTIONS", ""), &blobs, &records)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = function_handler(request("DELETE", ""), &blobs, &records)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
