use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Record, Value};

/// One collection blob: a UTF-8 JSON array of objects, always read and
/// written whole.
///
/// Writes go through a temporary file in the same directory which is synced
/// and renamed over the target, so readers see either the old or the new
/// array, never a prefix.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        JsonFileStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Read and parse the whole blob
    pub async fn read(&self) -> Result<Vec<Record>> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::new(
                    ErrorKind::NotFound,
                    format!("File not found: {}", self.path.display()),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        parse_records(&data).map_err(|reason| {
            Error::new(
                ErrorKind::Corrupt,
                format!("{} is not a list of records: {}", self.path.display(), reason),
            )
        })
    }

    /// Replace the blob with `bytes`
    pub async fn write(&self, bytes: Vec<u8>) -> std::io::Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(std::io::Error::other)?
    }

    /// Write an empty array if no blob exists yet. Returns true if created.
    pub async fn create_if_missing(&self) -> std::io::Result<bool> {
        if self.exists().await {
            return Ok(false);
        }
        self.write(b"[]".to_vec()).await?;
        Ok(true)
    }
}

pub fn encode_records(records: &[&Record]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

fn parse_records(data: &[u8]) -> std::result::Result<Vec<Record>, String> {
    let values: Vec<Value> = serde_json::from_slice(data).map_err(|e| e.to_string())?;

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(map) => Ok(map),
            other => Err(format!("entry {} is not an object: {}", i, other)),
        })
        .collect()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    // Make the rename itself durable
    if let Ok(dir) = std::fs::File::open(dir) {
        let _ = dir.sync_all();
    }

    Ok(())
}
