use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use crate::config::MetadataSettings;
use crate::types::ImageRecord;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("image record not found: {0}")]
    NotFound(String),

    #[error("image record is malformed: missing or mistyped attribute {0}")]
    Malformed(&'static str),

    #[error("metadata store error: {0}")]
    Store(String),
}

/// Metadata records, partitioned by album.
#[async_trait]
pub trait ImageRecords: Send + Sync {
    /// Inserts or fully replaces the record with the same album and id.
    async fn upsert(&self, record: &ImageRecord) -> Result<(), RecordError>;

    /// Deletes one record. A missing record is `RecordError::NotFound`.
    async fn delete(&self, album: &str, id: &str) -> Result<(), RecordError>;

    /// Every record of an album, in no particular order.
    async fn list_by_album(&self, album: &str) -> Result<Vec<ImageRecord>, RecordError>;
}

pub struct DynamoImageRecords {
    client: DynamoClient,
    table_name: String,
}

impl DynamoImageRecords {
    pub fn new(sdk_config: &aws_config::SdkConfig, settings: &MetadataSettings) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: DynamoClient::from_conf(builder.build()),
            table_name: settings.table_name.clone(),
        }
    }
}

#[async_trait]
impl ImageRecords for DynamoImageRecords {
    async fn upsert(&self, record: &ImageRecord) -> Result<(), RecordError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .map_err(|e| RecordError::Store(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn delete(&self, album: &str, id: &str) -> Result<(), RecordError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("album", AttributeValue::S(album.to_string()))
            .key("id", AttributeValue::S(id.to_string()))
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", "id")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Err(RecordError::NotFound(id.to_string()))
            }
            Err(e) => Err(RecordError::Store(DisplayErrorContext(&e).to_string())),
        }
    }

    async fn list_by_album(&self, album: &str) -> Result<Vec<ImageRecord>, RecordError> {
        let mut records = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        // Follow LastEvaluatedKey until the partition is exhausted
        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#album = :album")
                .projection_expression("#id, #album, #name, #url, #tags, #caption, #createdAt")
                .expression_attribute_names("#id", "id")
                .expression_attribute_names("#album", "album")
                .expression_attribute_names("#name", "name")
                .expression_attribute_names("#url", "url")
                .expression_attribute_names("#tags", "tags")
                .expression_attribute_names("#caption", "caption")
                .expression_attribute_names("#createdAt", "createdAt")
                .expression_attribute_values(":album", AttributeValue::S(album.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| RecordError::Store(DisplayErrorContext(&e).to_string()))?;

            for item in result.items() {
                records.push(from_item(item)?);
            }

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(records)
    }
}

/// Item layout: `album` (partition key), `id` (sort key), `tags` as an ordered list.
pub fn to_item(record: &ImageRecord) -> HashMap<String, AttributeValue> {
    let caption = match &record.caption {
        Some(caption) => AttributeValue::S(caption.clone()),
        None => AttributeValue::Null(true),
    };

    HashMap::from([
        ("id".to_string(), AttributeValue::S(record.id.clone())),
        ("album".to_string(), AttributeValue::S(record.album.clone())),
        ("name".to_string(), AttributeValue::S(record.name.clone())),
        ("url".to_string(), AttributeValue::S(record.url.clone())),
        (
            "tags".to_string(),
            AttributeValue::L(record.tags.iter().cloned().map(AttributeValue::S).collect()),
        ),
        ("caption".to_string(), caption),
        ("createdAt".to_string(), AttributeValue::S(record.created_at.clone())),
    ])
}

pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<ImageRecord, RecordError> {
    let string = |attr: &'static str| -> Result<String, RecordError> {
        item.get(attr)
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .ok_or(RecordError::Malformed(attr))
    };

    let tags = match item.get("tags") {
        Some(AttributeValue::L(values)) => values
            .iter()
            .map(|v| v.as_s().map(|s| s.to_string()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RecordError::Malformed("tags"))?,
        None => Vec::new(),
        Some(_) => return Err(RecordError::Malformed("tags")),
    };

    let caption = match item.get("caption") {
        Some(AttributeValue::S(caption)) => Some(caption.clone()),
        Some(AttributeValue::Null(_)) | None => None,
        Some(_) => return Err(RecordError::Malformed("caption")),
    };

    Ok(ImageRecord {
        id: string("id")?,
        album: string("album")?,
        name: string("name")?,
        url: string("url")?,
        tags,
        caption,
        created_at: string("createdAt")?,
    })
}
