//! File-backed repository backend
//!
//! A bincode snapshot of the full record map, rewritten after every
//! mutation. Keeps the whole store in memory behind an async lock; fine for
//! the report volumes a single node serves, and the snapshot format has no
//! migration story to maintain.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    page_from_records, record_from_params, stats_from_records, CreateReportParams,
    ListReportsParams, ReportPage, ReportRecord, ReportRepository, RepositoryStats,
};
use crate::error::{Error, Result};

/// Repository persisted as a single snapshot file.
pub struct FileReportRepository {
    path: PathBuf,
    records: RwLock<HashMap<Uuid, ReportRecord>>,
}

impl FileReportRepository {
    /// Open or create a repository at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let records = if fs::try_exists(&path).await? {
            let raw = fs::read(&path).await?;
            if raw.is_empty() {
                HashMap::new()
            } else {
                bincode::deserialize(&raw).map_err(|e| Error::storage(e.to_string()))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Serialize the full map and atomically replace the snapshot.
    async fn flush(&self, records: &HashMap<Uuid, ReportRecord>) -> Result<()> {
        let raw = bincode::serialize(records).map_err(|e| Error::storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&raw).await?;
        file.sync_all().await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for FileReportRepository {
    async fn create(&self, params: CreateReportParams) -> Result<ReportRecord> {
        let record = record_from_params(params, Utc::now());
        let mut records = self.records.write().await;
        records.insert(record.id, record.clone());
        self.flush(&records).await?;
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<ReportRecord> {
        self.records
            .read()
            .await
            .get(&id)
            .filter(|r| r.is_visible())
            .cloned()
            .ok_or_else(|| Error::not_found(id.to_string()))
    }

    async fn get_content(&self, id: Uuid) -> Result<Vec<u8>> {
        self.get(id).await.map(|record| record.content)
    }

    async fn list(&self, params: &ListReportsParams) -> Result<ReportPage> {
        let matching: Vec<ReportRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.is_visible() && params.matches(r))
            .cloned()
            .collect();
        Ok(page_from_records(matching, params))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .filter(|r| r.is_visible())
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        record.deleted_at = Some(Utc::now());
        self.flush(&records).await
    }

    async fn hard_delete(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.write().await;
        records
            .remove(&id)
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        self.flush(&records).await
    }

    async fn delete_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !r.is_expired(now));
        let removed = before - records.len();
        if removed > 0 {
            self.flush(&records).await?;
        }
        Ok(removed)
    }

    async fn update_tags(
        &self,
        id: Uuid,
        tags: Vec<String>,
        replace: bool,
    ) -> Result<ReportRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .filter(|r| r.is_visible())
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        if replace {
            record.tags = tags;
        } else {
            for tag in tags {
                if !record.tags.contains(&tag) {
                    record.tags.push(tag);
                }
            }
        }
        let updated = record.clone();
        self.flush(&records).await?;
        Ok(updated)
    }

    async fn stats(&self, user_id: Option<&str>) -> Result<RepositoryStats> {
        let now = Utc::now();
        let records = self.records.read().await;
        Ok(stats_from_records(
            records
                .values()
                .filter(|r| r.is_visible())
                .filter(|r| user_id.is_none() || r.user_id.as_deref() == user_id),
            now,
        ))
    }
}
