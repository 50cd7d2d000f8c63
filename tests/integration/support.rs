use async_trait::async_trait;
use drive::config::DriveConfig;
use drive::error::ApiError;
use drive::keys::KeyPair;
use drive::mime;
use drive::service::{FileInfo, StorageService, UploadRequest, UploadResponse};
use drive::tooling::cli::CliContext;
use drive::types::TransactionId;
use drive::Drive;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;

pub const LEDGER_TIME: &str = "Mon Nov 18 12:34:56 2024";

/// Holds content fetches until released.
#[derive(Default)]
pub struct Gate {
    pub started: Notify,
    pub release: Notify,
}

/// In-memory storage backend counting every call.
#[derive(Default)]
pub struct FakeService {
    pub uploads: AtomicUsize,
    pub fetches: AtomicUsize,
    pub lookups: AtomicUsize,
    pub fail_uploads: AtomicBool,
    stored: Mutex<HashMap<String, (FileInfo, Vec<u8>)>>,
    next_id: AtomicUsize,
    gate: Option<Arc<Gate>>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated(gate: Arc<Gate>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    /// Record a file as if someone else had uploaded it.
    pub fn seed(&self, id: &str, file_name: &str, owner_name: &str, bytes: &[u8]) {
        let info = FileInfo {
            cid: Some(format!("Qm{}", id)),
            file_name: file_name.to_string(),
            file_type: mime::extension_of(file_name).unwrap_or("unknown").to_string(),
            owner_name: owner_name.to_string(),
            owner_key: format!("{}-key", owner_name),
            creation_time: Some(LEDGER_TIME.to_string()),
            modification_time: Some(LEDGER_TIME.to_string()),
        };
        self.stored
            .lock()
            .insert(id.to_string(), (info, bytes.to_vec()));
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageService for FakeService {
    async fn store_and_record(&self, request: UploadRequest<'_>) -> Result<UploadResponse, ApiError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ApiError::ServiceRejected {
                status: 500,
                payload: "storage offline".to_string(),
            });
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("tx{:04}", n);
        let info = FileInfo {
            cid: Some(format!("Qm{}", id)),
            file_name: request.file_name.to_string(),
            file_type: mime::extension_of(request.file_name)
                .unwrap_or("unknown")
                .to_string(),
            owner_name: request.owner_name.to_string(),
            owner_key: request.owner_public_key.to_string(),
            creation_time: Some(LEDGER_TIME.to_string()),
            modification_time: Some(LEDGER_TIME.to_string()),
        };
        self.stored
            .lock()
            .insert(id.clone(), (info, request.bytes.to_vec()));
        Ok(UploadResponse {
            message: format!("Asset created and committed with transaction ID: {}", id),
            file_hash: Some(id),
            ..Default::default()
        })
    }

    async fn store_and_retrieve(&self, id: &TransactionId) -> Result<Vec<u8>, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        self.stored
            .lock()
            .get(id.as_str())
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    async fn lookup_transaction(&self, id: &TransactionId) -> Result<FileInfo, ApiError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.stored
            .lock()
            .get(id.as_str())
            .map(|(info, _)| info.clone())
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }
}

pub fn drive_with(service: &Arc<FakeService>) -> Drive {
    Drive::new("Ada", KeyPair::generate(), service.clone())
}

/// Temp layout for CLI tests: a workspace dir, a snapshot path and a downloads dir.
pub struct CliFixture {
    pub temp: TempDir,
    pub config: DriveConfig,
}

impl CliFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("workspace")).unwrap();
        let mut config = DriveConfig::default();
        config.owner_name = "Ada".to_string();
        config.storage.snapshot_path = Some(temp.path().join("state").join("snapshot.json"));
        config.storage.downloads_dir = Some(temp.path().join("downloads"));
        Self { temp, config }
    }

    pub fn workspace(&self) -> PathBuf {
        self.temp.path().join("workspace")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.temp.path().join("state").join("snapshot.json")
    }

    pub fn downloads(&self) -> PathBuf {
        self.temp.path().join("downloads")
    }

    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.workspace().join(name), content).unwrap();
    }

    pub fn context(&self, service: &Arc<FakeService>) -> CliContext {
        CliContext::with_service(self.workspace(), self.config.clone(), None, service.clone())
            .unwrap()
    }
}
