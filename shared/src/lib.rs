pub mod types;
pub mod error;
pub mod response;
pub mod config;
pub mod connection_string;
pub mod s3;
pub mod images;
pub mod vision;
pub mod analyze;
pub mod delete;
pub mod listing;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::ApiError;
pub use images::{DynamoImageRecords, ImageRecords};
pub use s3::{BlobStore, S3BlobStore};
pub use types::{ImageKey, ImageRecord};
pub use vision::{ImageTagger, VisionClient};

