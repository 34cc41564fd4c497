//! Report model and rendering pipeline
//!
//! Rendering is format-polymorphic over a normalized [`ReportData`]: each
//! renderer is a pure function from report data to bytes, selected by the
//! closed [`ReportFormat`] set. The Markdown, CSV, and JSON renderers are
//! byte-deterministic for identical inputs.

mod csv;
mod excel;
mod html;
mod json;
mod markdown;
mod pdf;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use flowgrid_optimization::analytics::{
    BottleneckReport, ComparisonReport, CostReport, EfficiencyReport, SimulationSummary,
};
use flowgrid_optimization::{FlowResult, Graph};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// The closed set of output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Markdown text
    Markdown,
    /// Comma-separated values
    Csv,
    /// Pretty-printed JSON
    Json,
    /// Self-contained HTML page
    Html,
    /// Multi-sheet XLSX workbook
    Excel,
    /// Paginated PDF document
    Pdf,
}

impl ReportFormat {
    /// Every known format, in catalog order.
    pub const ALL: [ReportFormat; 6] = [
        ReportFormat::Markdown,
        ReportFormat::Csv,
        ReportFormat::Json,
        ReportFormat::Html,
        ReportFormat::Excel,
        ReportFormat::Pdf,
    ];

    /// Stable machine-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Html => "html",
            Self::Excel => "excel",
            Self::Pdf => "pdf",
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Html => "html",
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    /// Media type served with the rendered bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Html => "text/html",
            Self::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Pdf => "application/pdf",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "excel" | "xlsx" => Ok(Self::Excel),
            "pdf" => Ok(Self::Pdf),
            other => Err(Error::invalid_argument(format!(
                "unknown report format: {other}"
            ))),
        }
    }
}

/// What a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// A solve and its flow assignment
    Flow,
    /// Cost, bottleneck, and efficiency analysis
    Analytics,
    /// Monte-Carlo simulation summary
    Simulation,
    /// Everything in one document
    Summary,
    /// Scenario comparison
    Comparison,
    /// Listing of previously stored reports
    History,
}

impl ReportType {
    /// Stable machine-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Analytics => "analytics",
            Self::Simulation => "simulation",
            Self::Summary => "summary",
            Self::Comparison => "comparison",
            Self::History => "history",
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-cutting rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Emit full edge tables.
    pub include_raw_data: bool,
    /// Emit the recommendation list.
    pub include_recommendations: bool,
    /// Persist the rendered report; `None` falls back to the configured
    /// default.
    pub save_to_storage: Option<bool>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_raw_data: true,
            include_recommendations: true,
            save_to_storage: None,
        }
    }
}

/// One row of a history report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Stored report id
    pub id: Uuid,
    /// Report title
    pub title: String,
    /// Report type tag
    pub report_type: ReportType,
    /// Output format tag
    pub format: ReportFormat,
    /// Rendered size in bytes
    pub size_bytes: u64,
    /// When the report was created
    pub created_at: DateTime<Utc>,
}

/// Normalized input to every renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// Report title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Optional author
    pub author: Option<String>,
    /// BCP-47 language tag, informational
    pub language: String,
    /// What the report is about
    pub report_type: ReportType,
    /// Generation timestamp, echoed into the output
    pub generated_at: DateTime<Utc>,
    /// The analyzed graph
    pub graph: Option<Graph>,
    /// Solver output
    pub flow: Option<FlowResult>,
    /// Cost decomposition
    pub cost: Option<CostReport>,
    /// Bottleneck analysis
    pub bottlenecks: Option<BottleneckReport>,
    /// Efficiency grading
    pub efficiency: Option<EfficiencyReport>,
    /// Simulation summary
    pub simulation: Option<SimulationSummary>,
    /// Scenario comparison
    pub comparison: Option<ComparisonReport>,
    /// Stored-report listing (history reports)
    pub history: Option<Vec<HistoryEntry>>,
    /// Rendering options
    pub options: ReportOptions,
    /// Caller-supplied key/value annotations
    pub custom_fields: HashMap<String, String>,
}

impl ReportData {
    /// Create an empty report shell.
    pub fn new(title: impl Into<String>, report_type: ReportType, generated_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            author: None,
            language: "en".to_string(),
            report_type,
            generated_at,
            graph: None,
            flow: None,
            cost: None,
            bottlenecks: None,
            efficiency: None,
            simulation: None,
            comparison: None,
            history: None,
            options: ReportOptions::default(),
            custom_fields: HashMap::new(),
        }
    }
}

/// A pure renderer for one output format.
pub trait ReportRenderer: Send + Sync {
    /// The format this renderer produces.
    fn format(&self) -> ReportFormat;

    /// Render the report data to bytes.
    fn render(&self, data: &ReportData) -> Result<Vec<u8>>;
}

/// Look up the renderer for a format.
///
/// The set is closed: every format tag has exactly one renderer and there is
/// no fallback.
pub fn renderer_for(format: ReportFormat) -> &'static dyn ReportRenderer {
    match format {
        ReportFormat::Markdown => &markdown::MarkdownRenderer,
        ReportFormat::Csv => &csv::CsvRenderer,
        ReportFormat::Json => &json::JsonRenderer,
        ReportFormat::Html => &html::HtmlRenderer,
        ReportFormat::Excel => &excel::ExcelRenderer,
        ReportFormat::Pdf => &pdf::PdfRenderer,
    }
}

/// Render report data in the requested format.
pub fn render(data: &ReportData, format: ReportFormat) -> Result<Vec<u8>> {
    renderer_for(format).render(data)
}

/// Catalog entry for `GetSupportedFormats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format tag
    pub format: ReportFormat,
    /// File extension, without the dot
    pub extension: String,
    /// Media type
    pub content_type: String,
}

/// The format catalog.
pub fn supported_formats() -> Vec<FormatInfo> {
    ReportFormat::ALL
        .iter()
        .map(|&format| FormatInfo {
            format,
            extension: format.extension().to_string(),
            content_type: format.content_type().to_string(),
        })
        .collect()
}

/// Build the storage filename `sanitize(title)_YYYYMMDD_HHMMSS.ext`.
///
/// The sanitizer keeps ASCII alphanumerics, `_` and `-`, replaces spaces
/// with underscores, drops everything else, and falls back to `report` when
/// nothing survives.
pub fn storage_filename(title: &str, format: ReportFormat, at: DateTime<Utc>) -> String {
    let mut sanitized = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            sanitized.push(c);
        } else if c == ' ' {
            sanitized.push('_');
        }
    }
    if sanitized.is_empty() {
        sanitized.push_str("report");
    }
    format!(
        "{}_{}.{}",
        sanitized,
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
