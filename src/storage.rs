use crate::errors::AppError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

const CURSOR_FILE: &str = "poll_cursor.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Visitors,
    Events,
    LoanLeads,
    DebtLeads,
    ContactLeads,
    Subscribers,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Visitors,
        Collection::LoanLeads,
        Collection::DebtLeads,
        Collection::ContactLeads,
        Collection::Events,
        Collection::Subscribers,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Visitors => "visitors",
            Self::Events => "events",
            Self::LoanLeads => "loan_leads",
            Self::DebtLeads => "debt_leads",
            Self::ContactLeads => "contact_leads",
            Self::Subscribers => "subscribers",
        }
    }
}

/// Flat-file collections, one pretty-printed JSON array per file.
///
/// Every mutation is a whole-file read-modify-write without locking, so two
/// writers racing on the same collection can lose an update. Write volume is
/// low enough that this is accepted.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorFile {
    last_update_id: i64,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.file_stem()))
    }

    /// Creates the data directory and seeds every missing collection with `[]`.
    pub async fn init(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;
        for collection in Collection::ALL {
            let path = self.path(collection);
            if !fs::try_exists(&path).await? {
                persist(&path, &Vec::<Value>::new()).await?;
            }
        }
        Ok(())
    }

    /// The whole collection in storage order. Missing or unreadable files
    /// read as empty.
    pub async fn read_all<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let path = self.path(collection);
        match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(records) => records,
                Err(err) => {
                    error!("failed to parse {}: {err}", path.display());
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                error!("failed to read {}: {err}", path.display());
                Vec::new()
            }
        }
    }

    pub async fn count(&self, collection: Collection) -> usize {
        self.read_all::<Value>(collection).await.len()
    }

    /// Appends one record and returns it unchanged.
    pub async fn append<T: Serialize>(
        &self,
        collection: Collection,
        record: T,
    ) -> Result<T, AppError> {
        let mut records = self.read_all::<Value>(collection).await;
        records.push(serde_json::to_value(&record)?);
        self.write(collection, &records).await?;
        Ok(record)
    }

    /// Overwrites the collection with `records`.
    pub async fn replace<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> Result<(), AppError> {
        self.write(collection, records).await
    }

    async fn write<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;
        persist(&self.path(collection), records).await
    }

    /// Last Telegram update id already handled, or 0 when none was recorded.
    pub async fn load_cursor(&self) -> i64 {
        let path = self.dir.join(CURSOR_FILE);
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<CursorFile>(&bytes)
                .map(|file| file.last_update_id)
                .unwrap_or_else(|err| {
                    error!("failed to parse {}: {err}", path.display());
                    0
                }),
            Err(err) => {
                debug!("no poll cursor at {}: {err}", path.display());
                0
            }
        }
    }

    pub async fn save_cursor(&self, last_update_id: i64) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;
        persist(&self.dir.join(CURSOR_FILE), &CursorFile { last_update_id }).await
    }
}

async fn persist<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
