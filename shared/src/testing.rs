//! In-memory collaborators for exercising the handlers without AWS or the
//! vision service. Each fake records the calls it receives.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::images::{ImageRecords, RecordError};
use crate::s3::{BlobError, BlobStore};
use crate::types::{ImageAnalysis, ImageKey, ImageRecord, SignedBlobUrl};
use crate::vision::{ImageTagger, VisionError};

pub const BLOB_BASE_URL: &str = "https://photos.s3.us-east-1.amazonaws.com";

#[derive(Debug, Clone, PartialEq)]
pub enum BlobCall {
    Presign(String),
    Delete(String),
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<BlobCall>>,
}

impl MemoryBlobStore {
    pub fn with_blobs(paths: &[&str]) -> Self {
        Self {
            blobs: Mutex::new(paths.iter().map(|p| p.to_string()).collect()),
            calls: Mutex::default(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.lock().unwrap().contains(path)
    }

    pub fn calls(&self) -> Vec<BlobCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn presign_read(&self, key: &ImageKey) -> Result<SignedBlobUrl, BlobError> {
        let path = key.blob_path();
        self.calls.lock().unwrap().push(BlobCall::Presign(path.clone()));

        let url = format!("{}/{}", BLOB_BASE_URL, path);
        Ok(SignedBlobUrl {
            signed_url: format!("{}?X-Amz-Signature=fake", url),
            url,
        })
    }

    async fn delete_if_exists(&self, key: &ImageKey) -> Result<(), BlobError> {
        let path = key.blob_path();
        self.calls.lock().unwrap().push(BlobCall::Delete(path.clone()));
        self.blobs.lock().unwrap().remove(&path);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordCall {
    Upsert(String),
    Delete(String),
    List(String),
}

/// Keeps records keyed by (album, id). Listing returns them in insertion
/// order so callers have to do their own sorting.
#[derive(Default)]
pub struct MemoryImageRecords {
    records: Mutex<BTreeMap<(String, String), (u64, ImageRecord)>>,
    sequence: Mutex<u64>,
    calls: Mutex<Vec<RecordCall>>,
    failure: Mutex<Option<String>>,
}

impl MemoryImageRecords {
    pub fn with_records(records: Vec<ImageRecord>) -> Self {
        let store = Self::default();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Makes every subsequent call fail with a store error.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn get(&self, album: &str, id: &str) -> Option<ImageRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(album.to_string(), id.to_string()))
            .map(|(_, r)| r.clone())
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> Vec<RecordCall> {
        self.calls.lock().unwrap().clone()
    }

    fn insert(&self, record: ImageRecord) {
        let mut sequence = self.sequence.lock().unwrap();
        *sequence += 1;
        self.records
            .lock()
            .unwrap()
            .insert((record.album.clone(), record.id.clone()), (*sequence, record));
    }

    fn check_failure(&self) -> Result<(), RecordError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(RecordError::Store(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ImageRecords for MemoryImageRecords {
    async fn upsert(&self, record: &ImageRecord) -> Result<(), RecordError> {
        self.calls.lock().unwrap().push(RecordCall::Upsert(record.id.clone()));
        self.check_failure()?;
        self.insert(record.clone());
        Ok(())
    }

    async fn delete(&self, album: &str, id: &str) -> Result<(), RecordError> {
        self.calls.lock().unwrap().push(RecordCall::Delete(id.to_string()));
        self.check_failure()?;
        self.records
            .lock()
            .unwrap()
            .remove(&(album.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| RecordError::NotFound(id.to_string()))
    }

    async fn list_by_album(&self, album: &str) -> Result<Vec<ImageRecord>, RecordError> {
        self.calls.lock().unwrap().push(RecordCall::List(album.to_string()));
        self.check_failure()?;

        let mut matching: Vec<(u64, ImageRecord)> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|(_, r)| r.album == album)
            .cloned()
            .collect();
        matching.sort_by_key(|(sequence, _)| *sequence);
        Ok(matching.into_iter().map(|(_, r)| r).collect())
    }
}

/// Answers every analyze call from a queue of canned outcomes; the last one repeats.
pub struct ScriptedTagger {
    outcomes: Mutex<Vec<Result<ImageAnalysis, VisionError>>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedTagger {
    pub fn returning(analysis: ImageAnalysis) -> Self {
        Self::scripted(vec![Ok(analysis)])
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self::scripted(vec![Err(VisionError::Upstream {
            status,
            body: body.to_string(),
        })])
    }

    pub fn scripted(outcomes: Vec<Result<ImageAnalysis, VisionError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            urls: Mutex::default(),
        }
    }

    /// Image URLs the tagger was asked about, in call order.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

fn replay(outcome: &Result<ImageAnalysis, VisionError>) -> Result<ImageAnalysis, VisionError> {
    match outcome {
        Ok(analysis) => Ok(analysis.clone()),
        Err(VisionError::Upstream { status, body }) => Err(VisionError::Upstream {
            status: *status,
            body: body.clone(),
        }),
        Err(VisionError::Transport(m)) => Err(VisionError::Transport(m.clone())),
        Err(VisionError::Decode(m)) => Err(VisionError::Decode(m.clone())),
    }
}

#[async_trait]
impl ImageTagger for ScriptedTagger {
    async fn analyze(&self, image_url: &str) -> Result<ImageAnalysis, VisionError> {
        self.urls.lock().unwrap().push(image_url.to_string());

        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            return outcomes.remove(0);
        }
        outcomes
            .first()
            .map(replay)
            .unwrap_or_else(|| Err(VisionError::Transport("no scripted outcome".to_string())))
    }
}
