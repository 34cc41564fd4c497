//! Report repository
//!
//! Persistent store for rendered reports with TTL-based expiration,
//! soft-deletion, tag filtering, and aggregate statistics. The trait is the
//! contract; two backends implement it (in-memory and a bincode snapshot
//! file). Soft-deleted records are invisible to every read path; physical
//! removal happens through [`ReportRepository::hard_delete`] or the
//! expiration sweep.

mod file;
mod memory;
mod sweeper;

pub use file::FileReportRepository;
pub use memory::MemoryReportRepository;
pub use sweeper::spawn_sweeper;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::report::{ReportFormat, ReportType};

/// A stored report, bytes included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Report title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Optional author
    pub author: Option<String>,
    /// What the report is about
    pub report_type: ReportType,
    /// Output format
    pub format: ReportFormat,
    /// Rendered bytes
    pub content: Vec<u8>,
    /// Media type of the content
    pub content_type: String,
    /// Download filename
    pub filename: String,
    /// Content size in bytes
    pub size_bytes: u64,
    /// Owning calculation, when known
    pub calculation_id: Option<String>,
    /// Owning graph, when known
    pub graph_id: Option<String>,
    /// Owning user, when known
    pub user_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiration timestamp; `None` never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Soft-deletion timestamp; set records are invisible
    pub deleted_at: Option<DateTime<Utc>>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Caller-supplied annotations
    pub custom_fields: HashMap<String, String>,
}

impl ReportRecord {
    /// Whether the record is past its expiration.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// Whether the record is visible to reads.
    pub fn is_visible(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Metadata view of a record, without the content bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInfo {
    /// Unique identifier
    pub id: Uuid,
    /// Report title
    pub title: String,
    /// What the report is about
    pub report_type: ReportType,
    /// Output format
    pub format: ReportFormat,
    /// Media type of the content
    pub content_type: String,
    /// Download filename
    pub filename: String,
    /// Content size in bytes
    pub size_bytes: u64,
    /// Owning user, when known
    pub user_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiration timestamp
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-form tags
    pub tags: Vec<String>,
}

impl From<&ReportRecord> for ReportInfo {
    fn from(record: &ReportRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            report_type: record.report_type,
            format: record.format,
            content_type: record.content_type.clone(),
            filename: record.filename.clone(),
            size_bytes: record.size_bytes,
            user_id: record.user_id.clone(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            tags: record.tags.clone(),
        }
    }
}

/// Input to [`ReportRepository::create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateReportParams {
    /// Report title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Optional author
    pub author: Option<String>,
    /// What the report is about
    pub report_type: Option<ReportType>,
    /// Output format
    pub format: Option<ReportFormat>,
    /// Rendered bytes
    pub content: Vec<u8>,
    /// Media type of the content
    pub content_type: String,
    /// Download filename
    pub filename: String,
    /// Owning calculation
    pub calculation_id: Option<String>,
    /// Owning graph
    pub graph_id: Option<String>,
    /// Owning user
    pub user_id: Option<String>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Caller-supplied annotations
    pub custom_fields: HashMap<String, String>,
    /// Time to live in seconds; 0 never expires
    pub ttl_seconds: u64,
}

/// Sort key for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOrder {
    /// By creation timestamp
    #[default]
    CreatedAt,
    /// By content size
    Size,
    /// By title, lexicographic
    Title,
}

/// Filters and pagination for [`ReportRepository::list`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListReportsParams {
    /// Keep only this report type
    pub report_type: Option<ReportType>,
    /// Keep only this format
    pub format: Option<ReportFormat>,
    /// Keep only this calculation
    pub calculation_id: Option<String>,
    /// Keep only this graph
    pub graph_id: Option<String>,
    /// Keep only this user
    pub user_id: Option<String>,
    /// Keep records carrying at least one of these tags
    pub any_tags: Vec<String>,
    /// Keep records created at or after this instant
    pub created_after: Option<DateTime<Utc>>,
    /// Keep records created at or before this instant
    pub created_before: Option<DateTime<Utc>>,
    /// Sort key
    pub order_by: ReportOrder,
    /// Sort direction
    pub descending: bool,
    /// Page size; clamped to [1, 100], 0 means the default of 20
    pub limit: usize,
}

impl ListReportsParams {
    /// The page size after clamping.
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            20
        } else {
            self.limit.clamp(1, 100)
        }
    }

    /// Whether a visible record passes every filter.
    pub fn matches(&self, record: &ReportRecord) -> bool {
        if let Some(report_type) = self.report_type {
            if record.report_type != report_type {
                return false;
            }
        }
        if let Some(format) = self.format {
            if record.format != format {
                return false;
            }
        }
        if let Some(calculation_id) = &self.calculation_id {
            if record.calculation_id.as_deref() != Some(calculation_id.as_str()) {
                return false;
            }
        }
        if let Some(graph_id) = &self.graph_id {
            if record.graph_id.as_deref() != Some(graph_id.as_str()) {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if record.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if !self.any_tags.is_empty()
            && !self.any_tags.iter().any(|tag| record.tags.contains(tag))
        {
            return false;
        }
        if let Some(after) = self.created_after {
            if record.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if record.created_at > before {
                return false;
            }
        }
        true
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPage {
    /// Records on this page, content stripped
    pub reports: Vec<ReportInfo>,
    /// Total records matching the filters
    pub total_count: usize,
    /// Whether more than `limit` records matched
    pub has_more: bool,
}

/// Aggregate statistics over visible records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStats {
    /// Visible records
    pub total_reports: u64,
    /// Their combined size in bytes
    pub total_size_bytes: u64,
    /// Counts partitioned by report type
    pub by_type: HashMap<String, u64>,
    /// Counts partitioned by format
    pub by_format: HashMap<String, u64>,
    /// Oldest creation timestamp
    pub oldest: Option<DateTime<Utc>>,
    /// Newest creation timestamp
    pub newest: Option<DateTime<Utc>>,
    /// Records past expiration but not yet swept
    pub expired_pending_sweep: u64,
}

/// The persistence contract for rendered reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store a new report; assigns the id, timestamps, and expiration.
    async fn create(&self, params: CreateReportParams) -> Result<ReportRecord>;

    /// Fetch a record, bytes included. `NotFound` covers soft-deleted rows.
    async fn get(&self, id: Uuid) -> Result<ReportRecord>;

    /// Fetch only the rendered bytes.
    async fn get_content(&self, id: Uuid) -> Result<Vec<u8>>;

    /// List visible records matching the filters.
    async fn list(&self, params: &ListReportsParams) -> Result<ReportPage>;

    /// Soft-delete a record; deleting an already-deleted record is
    /// `NotFound`.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Physically remove a record.
    async fn hard_delete(&self, id: Uuid) -> Result<()>;

    /// Physically remove every record past its expiration; returns how many
    /// were removed. Safe to run concurrently with reads and with itself.
    async fn delete_expired(&self) -> Result<usize>;

    /// Replace or append tags; returns the record after the update.
    async fn update_tags(&self, id: Uuid, tags: Vec<String>, replace: bool) -> Result<ReportRecord>;

    /// Aggregate statistics, scoped to one user when given.
    async fn stats(&self, user_id: Option<&str>) -> Result<RepositoryStats>;
}

/// Shared listing logic over an already-filtered snapshot of records.
fn page_from_records(mut records: Vec<ReportRecord>, params: &ListReportsParams) -> ReportPage {
    let total_count = records.len();
    records.sort_by(|a, b| {
        let ordering = match params.order_by {
            ReportOrder::CreatedAt => a.created_at.cmp(&b.created_at),
            ReportOrder::Size => a.size_bytes.cmp(&b.size_bytes),
            ReportOrder::Title => a.title.cmp(&b.title),
        };
        // Stable tie-break so pagination never shuffles.
        let ordering = ordering.then_with(|| a.id.cmp(&b.id));
        if params.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let limit = params.effective_limit();
    let has_more = total_count > limit;
    records.truncate(limit);

    ReportPage {
        reports: records.iter().map(ReportInfo::from).collect(),
        total_count,
        has_more,
    }
}

/// Shared statistics logic over a snapshot of visible records.
fn stats_from_records<'a>(
    records: impl Iterator<Item = &'a ReportRecord>,
    now: DateTime<Utc>,
) -> RepositoryStats {
    let mut stats = RepositoryStats::default();
    for record in records {
        stats.total_reports += 1;
        stats.total_size_bytes += record.size_bytes;
        *stats
            .by_type
            .entry(record.report_type.as_str().to_string())
            .or_insert(0) += 1;
        *stats
            .by_format
            .entry(record.format.as_str().to_string())
            .or_insert(0) += 1;
        stats.oldest = Some(match stats.oldest {
            Some(oldest) => oldest.min(record.created_at),
            None => record.created_at,
        });
        stats.newest = Some(match stats.newest {
            Some(newest) => newest.max(record.created_at),
            None => record.created_at,
        });
        if record.is_expired(now) {
            stats.expired_pending_sweep += 1;
        }
    }
    stats
}

/// Build a record from create parameters; id and timestamps assigned here.
fn record_from_params(params: CreateReportParams, now: DateTime<Utc>) -> ReportRecord {
    let expires_at = (params.ttl_seconds > 0)
        .then(|| now + chrono::Duration::seconds(params.ttl_seconds as i64));
    let size_bytes = params.content.len() as u64;
    ReportRecord {
        id: Uuid::new_v4(),
        title: params.title,
        description: params.description,
        author: params.author,
        report_type: params.report_type.unwrap_or(ReportType::Flow),
        format: params.format.unwrap_or(ReportFormat::Json),
        content: params.content,
        content_type: params.content_type,
        filename: params.filename,
        size_bytes,
        calculation_id: params.calculation_id,
        graph_id: params.graph_id,
        user_id: params.user_id,
        created_at: now,
        expires_at,
        deleted_at: None,
        tags: params.tags,
        custom_fields: params.custom_fields,
    }
}
