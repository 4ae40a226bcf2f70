use super::Waypoint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum_macros::Display;

/// Persisted form of the pager state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSnapshot {
    pub mission: Vec<Waypoint>,
    pub page_start: usize,
    pub page_end: usize,
}

#[derive(Debug, Display)]
pub enum StoreError {
    Io(std::io::Error),
    Encode(bincode::error::EncodeError),
    Decode(bincode::error::DecodeError),
    /// The stored bounds do not fit the stored mission.
    Corrupt,
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self { StoreError::Io(value) }
}

impl From<bincode::error::EncodeError> for StoreError {
    fn from(value: bincode::error::EncodeError) -> Self { StoreError::Encode(value) }
}

impl From<bincode::error::DecodeError> for StoreError {
    fn from(value: bincode::error::DecodeError) -> Self { StoreError::Decode(value) }
}

#[async_trait]
pub trait MissionStore: Send + Sync {
    async fn save(&self, snapshot: &MissionSnapshot) -> Result<(), StoreError>;
    /// Returns `None` when nothing was stored yet.
    async fn load(&self) -> Result<Option<MissionSnapshot>, StoreError>;
}

/// Stores the snapshot as a bincode blob in a single file.
///
/// Writes go to a sibling temporary file that is renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact.
pub struct FileMissionStore {
    path: PathBuf,
}

impl FileMissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

#[async_trait]
impl MissionStore for FileMissionStore {
    async fn save(&self, snapshot: &MissionSnapshot) -> Result<(), StoreError> {
        let bytes = bincode::serde::encode_to_vec(snapshot, bincode::config::standard())?;
        let tmp = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<MissionSnapshot>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let (snapshot, _): (MissionSnapshot, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
        if snapshot.mission.is_empty()
            || snapshot.page_start > snapshot.page_end
            || snapshot.page_end >= snapshot.mission.len()
        {
            return Err(StoreError::Corrupt);
        }
        Ok(Some(snapshot))
    }
}

/// Keeps the snapshot in memory only.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryMissionStore {
    slot: tokio::sync::Mutex<Option<MissionSnapshot>>,
}

#[cfg(test)]
#[async_trait]
impl MissionStore for MemoryMissionStore {
    async fn save(&self, snapshot: &MissionSnapshot) -> Result<(), StoreError> {
        *self.slot.lock().await = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<MissionSnapshot>, StoreError> {
        Ok(self.slot.lock().await.clone())
    }
}
