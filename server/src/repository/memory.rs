//! In-memory repository backend

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{
    page_from_records, record_from_params, stats_from_records, CreateReportParams,
    ListReportsParams, ReportPage, ReportRecord, ReportRepository, RepositoryStats,
};
use crate::error::{Error, Result};

/// Repository over a concurrent in-process map; the default backend when no
/// snapshot path is configured. Per-record mutations are atomic through the
/// map's entry locks.
#[derive(Debug, Default)]
pub struct MemoryReportRepository {
    records: DashMap<Uuid, ReportRecord>,
}

impl MemoryReportRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records, soft-deleted included (test hook).
    pub fn raw_len(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl ReportRepository for MemoryReportRepository {
    async fn create(&self, params: CreateReportParams) -> Result<ReportRecord> {
        let record = record_from_params(params, Utc::now());
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<ReportRecord> {
        self.records
            .get(&id)
            .filter(|r| r.is_visible())
            .map(|r| r.value().clone())
            .ok_or_else(|| Error::not_found(id.to_string()))
    }

    async fn get_content(&self, id: Uuid) -> Result<Vec<u8>> {
        self.get(id).await.map(|record| record.content)
    }

    async fn list(&self, params: &ListReportsParams) -> Result<ReportPage> {
        let matching: Vec<ReportRecord> = self
            .records
            .iter()
            .filter(|r| r.is_visible() && params.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();
        Ok(page_from_records(matching, params))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        if !record.is_visible() {
            return Err(Error::not_found(id.to_string()));
        }
        record.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn hard_delete(&self, id: Uuid) -> Result<()> {
        self.records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(id.to_string()))
    }

    async fn delete_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let expired: Vec<Uuid> = self
            .records
            .iter()
            .filter(|r| r.is_expired(now))
            .map(|r| r.id)
            .collect();
        // Count actual removals so concurrent sweeps never double-count.
        let mut removed = 0;
        for id in expired {
            if self.records.remove(&id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn update_tags(
        &self,
        id: Uuid,
        tags: Vec<String>,
        replace: bool,
    ) -> Result<ReportRecord> {
        let mut record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        if !record.is_visible() {
            return Err(Error::not_found(id.to_string()));
        }
        if replace {
            record.tags = tags;
        } else {
            for tag in tags {
                if !record.tags.contains(&tag) {
                    record.tags.push(tag);
                }
            }
        }
        Ok(record.value().clone())
    }

    async fn stats(&self, user_id: Option<&str>) -> Result<RepositoryStats> {
        let now = Utc::now();
        let snapshot: Vec<ReportRecord> = self
            .records
            .iter()
            .filter(|r| r.is_visible())
            .filter(|r| user_id.is_none() || r.user_id.as_deref() == user_id)
            .map(|r| r.value().clone())
            .collect();
        Ok(stats_from_records(snapshot.iter(), now))
    }
}
