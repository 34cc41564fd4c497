//! Report service facade
//!
//! Generation calls render through the format registry and optionally
//! persist through the repository; management calls wrap the repository
//! directly. A process without a repository still serves every generation
//! call; storage-backed calls report `Unimplemented` instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use flowgrid_optimization::analytics::{
    calculate_cost, compare_scenarios, find_bottlenecks, grade_efficiency, summarize_samples,
    BottleneckOptions, CostOptions, Scenario,
};
use flowgrid_optimization::{ErrorKind, FlowResult, Graph};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::basic_defects;
use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::report::{
    render, storage_filename, supported_formats, FormatInfo, HistoryEntry, ReportData,
    ReportFormat, ReportOptions, ReportType,
};
use crate::repository::{
    CreateReportParams, ListReportsParams, ReportInfo, ReportPage, ReportRecord, ReportRepository,
    RepositoryStats,
};

/// Facade for the report RPCs.
pub struct ReportService {
    repository: Option<Arc<dyn ReportRepository>>,
    config: ReportConfig,
    reports_generated: AtomicU64,
    started: Instant,
}

/// Metadata shared by every generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Optional author
    pub author: Option<String>,
    /// BCP-47 language tag; `None` means English
    pub language: Option<String>,
    /// Tags stored with the report
    pub tags: Vec<String>,
    /// Owning calculation, when known
    pub calculation_id: Option<String>,
    /// Owning graph, when known
    pub graph_id: Option<String>,
    /// Owning user, when known
    pub user_id: Option<String>,
    /// Caller-supplied annotations
    pub custom_fields: std::collections::HashMap<String, String>,
}

/// Flow report request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFlowReportRequest {
    /// Shared metadata
    pub meta: ReportMeta,
    /// Output format
    pub format: ReportFormat,
    /// The solved graph
    pub graph: Graph,
    /// The solver output
    pub result: Option<FlowResult>,
    /// Rendering options
    pub options: ReportOptions,
}

/// Analytics report request; the analysis battery runs inside the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateAnalyticsReportRequest {
    /// Shared metadata
    pub meta: ReportMeta,
    /// Output format
    pub format: ReportFormat,
    /// The graph, flows assigned on its edges
    pub graph: Graph,
    /// Cost model; `None` uses the defaults
    pub cost_options: Option<CostOptions>,
    /// Detection options; `None` uses the defaults
    pub bottleneck_options: Option<BottleneckOptions>,
    /// Rendering options
    pub options: ReportOptions,
}

/// Simulation report request over pre-computed samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSimulationReportRequest {
    /// Shared metadata
    pub meta: ReportMeta,
    /// Output format
    pub format: ReportFormat,
    /// Pre-computed samples (e.g. max-flow values of perturbed solves)
    pub samples: Vec<f64>,
    /// Confidence level for the interval; 0 means 0.95
    pub confidence_level: f64,
    /// Rendering options
    pub options: ReportOptions,
}

/// Summary report request: everything in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSummaryReportRequest {
    /// Shared metadata
    pub meta: ReportMeta,
    /// Output format
    pub format: ReportFormat,
    /// The solved graph
    pub graph: Graph,
    /// The solver output
    pub result: Option<FlowResult>,
    /// Cost model; `None` uses the defaults
    pub cost_options: Option<CostOptions>,
    /// Detection options; `None` uses the defaults
    pub bottleneck_options: Option<BottleneckOptions>,
    /// Optional simulation samples
    pub samples: Vec<f64>,
    /// Confidence level for the interval; 0 means 0.95
    pub confidence_level: f64,
    /// Rendering options
    pub options: ReportOptions,
}

/// Comparison report request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateComparisonReportRequest {
    /// Shared metadata
    pub meta: ReportMeta,
    /// Output format
    pub format: ReportFormat,
    /// The baseline graph, flows assigned
    pub baseline: Graph,
    /// The scenarios to compare against it
    pub scenarios: Vec<Scenario>,
    /// Rendering options
    pub options: ReportOptions,
}

/// History report request: renders the repository listing itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateHistoryReportRequest {
    /// Shared metadata
    pub meta: ReportMeta,
    /// Output format
    pub format: ReportFormat,
    /// Which stored reports to include
    pub filter: ListReportsParams,
    /// Rendering options
    pub options: ReportOptions,
}

/// Generation response envelope; the rendered bytes are always returned,
/// persisted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReportResponse {
    /// Whether rendering succeeded
    pub success: bool,
    /// Diagnostic when it did not, or a persistence warning when it did
    pub error_message: Option<String>,
    /// Taxonomy kind of the diagnostic
    pub error_kind: Option<ErrorKind>,
    /// Id of the stored record, when persisted
    pub report_id: Option<Uuid>,
    /// Download filename
    pub filename: String,
    /// Media type of the content
    pub content_type: String,
    /// Rendered bytes
    pub content: Vec<u8>,
    /// Content size in bytes
    pub size_bytes: u64,
    /// Whether the report was persisted
    pub saved: bool,
}

impl GenerateReportResponse {
    fn failure(message: String, kind: ErrorKind) -> Self {
        Self {
            success: false,
            error_message: Some(message),
            error_kind: Some(kind),
            report_id: None,
            filename: String::new(),
            content_type: String::new(),
            content: Vec::new(),
            size_bytes: 0,
            saved: false,
        }
    }
}

/// Record fetch response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReportResponse {
    /// Whether the record was found
    pub success: bool,
    /// Diagnostic when it was not
    pub error_message: Option<String>,
    /// Taxonomy kind of the diagnostic
    pub error_kind: Option<ErrorKind>,
    /// The record, bytes included
    pub report: Option<ReportRecord>,
}

/// Metadata fetch response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReportInfoResponse {
    /// Whether the record was found
    pub success: bool,
    /// Diagnostic when it was not
    pub error_message: Option<String>,
    /// The metadata, bytes stripped
    pub info: Option<ReportInfo>,
}

/// Listing response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListReportsResponse {
    /// Whether the listing ran
    pub success: bool,
    /// Unused, kept for envelope uniformity
    pub error_message: Option<String>,
    /// The page
    pub page: ReportPage,
}

/// Deletion response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteReportResponse {
    /// Whether the record was deleted
    pub success: bool,
    /// Diagnostic when it was not
    pub error_message: Option<String>,
    /// Taxonomy kind of the diagnostic
    pub error_kind: Option<ErrorKind>,
}

/// Tag update response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReportTagsResponse {
    /// Whether the update ran
    pub success: bool,
    /// Diagnostic when it did not
    pub error_message: Option<String>,
    /// The record metadata after the update
    pub info: Option<ReportInfo>,
}

/// Statistics response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRepositoryStatsResponse {
    /// Whether the aggregation ran
    pub success: bool,
    /// Unused, kept for envelope uniformity
    pub error_message: Option<String>,
    /// The statistics
    pub stats: RepositoryStats,
}

/// Format catalog response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSupportedFormatsResponse {
    /// Always true; the catalog is static
    pub success: bool,
    /// Unused, kept for envelope uniformity
    pub error_message: Option<String>,
    /// The catalog
    pub formats: Vec<FormatInfo>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHealthResponse {
    /// Liveness flag
    pub healthy: bool,
    /// Crate version
    pub version: String,
    /// Seconds since the facade was created
    pub uptime_seconds: u64,
    /// Reports generated by this process
    pub reports_generated: u64,
    /// Whether a repository is configured
    pub storage_configured: bool,
}

impl ReportService {
    /// Create the facade; `repository` is optional.
    pub fn new(config: ReportConfig, repository: Option<Arc<dyn ReportRepository>>) -> Self {
        Self {
            repository,
            config,
            reports_generated: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Render a flow report.
    #[instrument(skip_all, fields(format = %request.format, title = %request.meta.title))]
    pub async fn generate_flow_report(
        &self,
        request: GenerateFlowReportRequest,
    ) -> Result<GenerateReportResponse> {
        if let Some(defects) = basic_defects(&request.graph) {
            return Ok(GenerateReportResponse::failure(
                defects,
                ErrorKind::InvalidGraph,
            ));
        }
        let mut data = self.shell(&request.meta, ReportType::Flow, request.options);
        data.flow = request.result;
        data.graph = Some(request.graph);
        self.finish(data, request.format, &request.meta, ReportType::Flow)
            .await
    }

    /// Run the analysis battery and render it.
    #[instrument(skip_all, fields(format = %request.format, title = %request.meta.title))]
    pub async fn generate_analytics_report(
        &self,
        request: GenerateAnalyticsReportRequest,
    ) -> Result<GenerateReportResponse> {
        if let Some(defects) = basic_defects(&request.graph) {
            return Ok(GenerateReportResponse::failure(
                defects,
                ErrorKind::InvalidGraph,
            ));
        }
        let mut data = self.shell(&request.meta, ReportType::Analytics, request.options);
        data.cost = Some(calculate_cost(
            &request.graph,
            &request.cost_options.unwrap_or_default(),
        ));
        data.bottlenecks = Some(find_bottlenecks(
            &request.graph,
            &request.bottleneck_options.unwrap_or_default(),
        ));
        data.efficiency = Some(grade_efficiency(&request.graph));
        data.graph = Some(request.graph);
        self.finish(data, request.format, &request.meta, ReportType::Analytics)
            .await
    }

    /// Summarize pre-computed samples and render them.
    #[instrument(skip_all, fields(format = %request.format, samples = request.samples.len()))]
    pub async fn generate_simulation_report(
        &self,
        request: GenerateSimulationReportRequest,
    ) -> Result<GenerateReportResponse> {
        let confidence = if request.confidence_level > 0.0 {
            request.confidence_level
        } else {
            0.95
        };
        let summary = match summarize_samples(&request.samples, confidence) {
            Ok(summary) => summary,
            Err(error) => {
                return Ok(GenerateReportResponse::failure(
                    error.to_string(),
                    error.kind(),
                ));
            }
        };
        let mut data = self.shell(&request.meta, ReportType::Simulation, request.options);
        data.simulation = Some(summary);
        self.finish(data, request.format, &request.meta, ReportType::Simulation)
            .await
    }

    /// Render everything about one solved graph in a single document.
    #[instrument(skip_all, fields(format = %request.format, title = %request.meta.title))]
    pub async fn generate_summary_report(
        &self,
        request: GenerateSummaryReportRequest,
    ) -> Result<GenerateReportResponse> {
        if let Some(defects) = basic_defects(&request.graph) {
            return Ok(GenerateReportResponse::failure(
                defects,
                ErrorKind::InvalidGraph,
            ));
        }
        let mut data = self.shell(&request.meta, ReportType::Summary, request.options);
        data.cost = Some(calculate_cost(
            &request.graph,
            &request.cost_options.unwrap_or_default(),
        ));
        data.bottlenecks = Some(find_bottlenecks(
            &request.graph,
            &request.bottleneck_options.unwrap_or_default(),
        ));
        data.efficiency = Some(grade_efficiency(&request.graph));
        if !request.samples.is_empty() {
            let confidence = if request.confidence_level > 0.0 {
                request.confidence_level
            } else {
                0.95
            };
            match summarize_samples(&request.samples, confidence) {
                Ok(summary) => data.simulation = Some(summary),
                Err(error) => {
                    return Ok(GenerateReportResponse::failure(
                        error.to_string(),
                        error.kind(),
                    ));
                }
            }
        }
        data.flow = request.result;
        data.graph = Some(request.graph);
        self.finish(data, request.format, &request.meta, ReportType::Summary)
            .await
    }

    /// Compare scenarios and render the outcome.
    #[instrument(skip_all, fields(format = %request.format, scenarios = request.scenarios.len()))]
    pub async fn generate_comparison_report(
        &self,
        request: GenerateComparisonReportRequest,
    ) -> Result<GenerateReportResponse> {
        if let Some(defects) = basic_defects(&request.baseline) {
            return Ok(GenerateReportResponse::failure(
                format!("baseline: {defects}"),
                ErrorKind::InvalidGraph,
            ));
        }
        let mut data = self.shell(&request.meta, ReportType::Comparison, request.options);
        data.comparison = Some(compare_scenarios(&request.baseline, &request.scenarios));
        self.finish(data, request.format, &request.meta, ReportType::Comparison)
            .await
    }

    /// Render the repository listing itself.
    #[instrument(skip_all, fields(format = %request.format))]
    pub async fn generate_history_report(
        &self,
        request: GenerateHistoryReportRequest,
    ) -> Result<GenerateReportResponse> {
        let Some(repository) = &self.repository else {
            return Ok(GenerateReportResponse::failure(
                Error::Unimplemented.to_string(),
                ErrorKind::Unimplemented,
            ));
        };
        let page = match repository.list(&request.filter).await {
            Ok(page) => page,
            Err(error) => {
                return Ok(GenerateReportResponse::failure(
                    error.to_string(),
                    error.kind(),
                ));
            }
        };
        let mut data = self.shell(&request.meta, ReportType::History, request.options);
        data.history = Some(
            page.reports
                .iter()
                .map(|info| HistoryEntry {
                    id: info.id,
                    title: info.title.clone(),
                    report_type: info.report_type,
                    format: info.format,
                    size_bytes: info.size_bytes,
                    created_at: info.created_at,
                })
                .collect(),
        );
        self.finish(data, request.format, &request.meta, ReportType::History)
            .await
    }

    /// Fetch a stored report, bytes included.
    #[instrument(skip(self))]
    pub async fn get_report(&self, id: Uuid) -> GetReportResponse {
        match self.fetch(id).await {
            Ok(record) => GetReportResponse {
                success: true,
                error_message: None,
                error_kind: None,
                report: Some(record),
            },
            Err(error) => GetReportResponse {
                success: false,
                error_message: Some(error.to_string()),
                error_kind: Some(error.kind()),
                report: None,
            },
        }
    }

    /// Fetch stored report metadata.
    #[instrument(skip(self))]
    pub async fn get_report_info(&self, id: Uuid) -> GetReportInfoResponse {
        match self.fetch(id).await {
            Ok(record) => GetReportInfoResponse {
                success: true,
                error_message: None,
                info: Some(ReportInfo::from(&record)),
            },
            Err(error) => GetReportInfoResponse {
                success: false,
                error_message: Some(error.to_string()),
                info: None,
            },
        }
    }

    /// List stored reports. Repository failures here are call-level.
    #[instrument(skip_all)]
    pub async fn list_reports(&self, params: ListReportsParams) -> Result<ListReportsResponse> {
        let page = self.repo()?.list(&params).await?;
        Ok(ListReportsResponse {
            success: true,
            error_message: None,
            page,
        })
    }

    /// Soft-delete a stored report.
    #[instrument(skip(self))]
    pub async fn delete_report(&self, id: Uuid) -> DeleteReportResponse {
        let outcome = match self.repo() {
            Ok(repository) => repository.delete(id).await,
            Err(error) => Err(error),
        };
        match outcome {
            Ok(()) => DeleteReportResponse {
                success: true,
                error_message: None,
                error_kind: None,
            },
            Err(error) => DeleteReportResponse {
                success: false,
                error_message: Some(error.to_string()),
                error_kind: Some(error.kind()),
            },
        }
    }

    /// Replace or append a stored report's tags.
    #[instrument(skip(self, tags))]
    pub async fn update_report_tags(
        &self,
        id: Uuid,
        tags: Vec<String>,
        replace: bool,
    ) -> UpdateReportTagsResponse {
        let outcome = match self.repo() {
            Ok(repository) => repository.update_tags(id, tags, replace).await,
            Err(error) => Err(error),
        };
        match outcome {
            Ok(record) => UpdateReportTagsResponse {
                success: true,
                error_message: None,
                info: Some(ReportInfo::from(&record)),
            },
            Err(error) => UpdateReportTagsResponse {
                success: false,
                error_message: Some(error.to_string()),
                info: None,
            },
        }
    }

    /// Aggregate repository statistics. Repository failures here are
    /// call-level.
    #[instrument(skip(self))]
    pub async fn get_repository_stats(
        &self,
        user_id: Option<String>,
    ) -> Result<GetRepositoryStatsResponse> {
        let stats = self.repo()?.stats(user_id.as_deref()).await?;
        Ok(GetRepositoryStatsResponse {
            success: true,
            error_message: None,
            stats,
        })
    }

    /// The format catalog.
    pub async fn get_supported_formats(&self) -> GetSupportedFormatsResponse {
        GetSupportedFormatsResponse {
            success: true,
            error_message: None,
            formats: supported_formats(),
        }
    }

    /// Liveness probe.
    pub async fn health(&self) -> ReportHealthResponse {
        ReportHealthResponse {
            healthy: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started.elapsed().as_secs(),
            reports_generated: self.reports_generated.load(Ordering::Relaxed),
            storage_configured: self.repository.is_some(),
        }
    }

    /// Build the report shell shared by every generation call.
    fn shell(&self, meta: &ReportMeta, report_type: ReportType, options: ReportOptions) -> ReportData {
        let mut data = ReportData::new(meta.title.clone(), report_type, Utc::now());
        data.description = meta.description.clone();
        data.author = meta.author.clone();
        if let Some(language) = &meta.language {
            data.language = language.clone();
        }
        data.custom_fields = meta.custom_fields.clone();
        data.options = options;
        data
    }

    /// Render, count, and optionally persist.
    async fn finish(
        &self,
        data: ReportData,
        format: ReportFormat,
        meta: &ReportMeta,
        report_type: ReportType,
    ) -> Result<GenerateReportResponse> {
        let content = render(&data, format)?;
        self.reports_generated.fetch_add(1, Ordering::Relaxed);

        let filename = storage_filename(&data.title, format, data.generated_at);
        let size_bytes = content.len() as u64;
        let mut report_id = None;
        let mut saved = false;
        let mut error_message = None;

        let save = data.options.save_to_storage.unwrap_or(self.config.save_to_storage);
        if save {
            match &self.repository {
                Some(repository) => {
                    let params = CreateReportParams {
                        title: meta.title.clone(),
                        description: meta.description.clone(),
                        author: meta.author.clone(),
                        report_type: Some(report_type),
                        format: Some(format),
                        content: content.clone(),
                        content_type: format.content_type().to_string(),
                        filename: filename.clone(),
                        calculation_id: meta.calculation_id.clone(),
                        graph_id: meta.graph_id.clone(),
                        user_id: meta.user_id.clone(),
                        tags: meta.tags.clone(),
                        custom_fields: meta.custom_fields.clone(),
                        ttl_seconds: self.config.default_ttl_seconds,
                    };
                    // Persistence failures never fail the call; the caller
                    // still gets the rendered bytes.
                    match repository.create(params).await {
                        Ok(record) => {
                            report_id = Some(record.id);
                            saved = true;
                        }
                        Err(error) => {
                            warn!(%error, "failed to persist report");
                            error_message = Some(format!("report not persisted: {error}"));
                        }
                    }
                }
                None => {
                    error_message =
                        Some("report not persisted: no repository configured".to_string());
                }
            }
        }

        Ok(GenerateReportResponse {
            success: true,
            error_message,
            error_kind: None,
            report_id,
            filename,
            content_type: format.content_type().to_string(),
            content,
            size_bytes,
            saved,
        })
    }

    /// The repository, or `Unimplemented` when the process runs without one.
    fn repo(&self) -> Result<&dyn ReportRepository> {
        self.repository.as_deref().ok_or(Error::Unimplemented)
    }

    /// Fetch a record through the repository gate.
    async fn fetch(&self, id: Uuid) -> Result<ReportRecord> {
        self.repo()?.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryReportRepository;
    use flowgrid_optimization::{Edge, Node};

    fn flowing_chain() -> Graph {
        let mut graph = Graph::new(1, 3);
        for id in 1..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::new(1, 2, 10.0, 1.0).with_flow(8.0))
            .add_edge(Edge::new(2, 3, 10.0, 1.0).with_flow(8.0));
        graph
    }

    fn meta(title: &str) -> ReportMeta {
        ReportMeta {
            title: title.to_string(),
            author: Some("tests".to_string()),
            ..Default::default()
        }
    }

    fn service_with_repo() -> (ReportService, Arc<MemoryReportRepository>) {
        let repo = Arc::new(MemoryReportRepository::new());
        let service = ReportService::new(
            ReportConfig::default(),
            Some(repo.clone() as Arc<dyn ReportRepository>),
        );
        (service, repo)
    }

    #[tokio::test]
    async fn test_generate_and_persist_flow_report() {
        let (service, _repo) = service_with_repo();
        let response = service
            .generate_flow_report(GenerateFlowReportRequest {
                meta: meta("Chain Flow"),
                format: ReportFormat::Markdown,
                graph: flowing_chain(),
                result: None,
                options: ReportOptions::default(),
            })
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.saved);
        let id = response.report_id.unwrap();
        assert!(response.filename.starts_with("Chain_Flow_"));
        assert_eq!(response.content_type, "text/markdown");

        let fetched = service.get_report(id).await;
        assert!(fetched.success);
        assert_eq!(fetched.report.unwrap().content, response.content);
    }

    #[tokio::test]
    async fn test_generation_without_repository_still_returns_bytes() {
        let service = ReportService::new(ReportConfig::default(), None);
        let response = service
            .generate_analytics_report(GenerateAnalyticsReportRequest {
                meta: meta("No Storage"),
                format: ReportFormat::Json,
                graph: flowing_chain(),
                cost_options: None,
                bottleneck_options: None,
                options: ReportOptions::default(),
            })
            .await
            .unwrap();

        assert!(response.success);
        assert!(!response.saved);
        assert!(!response.content.is_empty());
        assert!(response
            .error_message
            .unwrap()
            .contains("no repository configured"));
    }

    #[tokio::test]
    async fn test_invalid_graph_rejected_in_envelope() {
        let (service, _repo) = service_with_repo();
        let mut graph = flowing_chain();
        graph.sink_id = 1;
        let response = service
            .generate_flow_report(GenerateFlowReportRequest {
                meta: meta("Broken"),
                format: ReportFormat::Json,
                graph,
                result: None,
                options: ReportOptions::default(),
            })
            .await
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::InvalidGraph));
    }

    #[tokio::test]
    async fn test_simulation_report_needs_samples() {
        let (service, _repo) = service_with_repo();
        let response = service
            .generate_simulation_report(GenerateSimulationReportRequest {
                meta: meta("Empty"),
                format: ReportFormat::Csv,
                samples: Vec::new(),
                confidence_level: 0.95,
                options: ReportOptions::default(),
            })
            .await
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::InvalidArgument));
    }

    #[tokio::test]
    async fn test_history_report_renders_listing() {
        let (service, _repo) = service_with_repo();
        for i in 0..3 {
            service
                .generate_flow_report(GenerateFlowReportRequest {
                    meta: meta(&format!("Stored {i}")),
                    format: ReportFormat::Json,
                    graph: flowing_chain(),
                    result: None,
                    options: ReportOptions::default(),
                })
                .await
                .unwrap();
        }

        let response = service
            .generate_history_report(GenerateHistoryReportRequest {
                meta: meta("History"),
                format: ReportFormat::Markdown,
                filter: ListReportsParams::default(),
                options: ReportOptions::default(),
            })
            .await
            .unwrap();
        assert!(response.success);
        let text = String::from_utf8(response.content).unwrap();
        assert!(text.contains("## Stored Reports"));
        assert!(text.contains("Stored 0"));
    }

    #[tokio::test]
    async fn test_management_calls_without_repository() {
        let service = ReportService::new(ReportConfig::default(), None);

        let get = service.get_report(Uuid::new_v4()).await;
        assert!(!get.success);
        assert_eq!(get.error_kind, Some(ErrorKind::Unimplemented));

        let list = service.list_reports(ListReportsParams::default()).await;
        assert!(matches!(list, Err(Error::Unimplemented)));

        let stats = service.get_repository_stats(None).await;
        assert!(matches!(stats, Err(Error::Unimplemented)));
    }

    #[tokio::test]
    async fn test_delete_and_tags_round_trip() {
        let (service, _repo) = service_with_repo();
        let generated = service
            .generate_flow_report(GenerateFlowReportRequest {
                meta: meta("Tagged"),
                format: ReportFormat::Json,
                graph: flowing_chain(),
                result: None,
                options: ReportOptions::default(),
            })
            .await
            .unwrap();
        let id = generated.report_id.unwrap();

        let tagged = service
            .update_report_tags(id, vec!["q2".to_string()], false)
            .await;
        assert!(tagged.success);
        assert_eq!(tagged.info.unwrap().tags, vec!["q2"]);

        assert!(service.delete_report(id).await.success);
        let second = service.delete_report(id).await;
        assert!(!second.success);
        assert_eq!(second.error_kind, Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_health_counts_reports() {
        let (service, _repo) = service_with_repo();
        let before = service.health().await;
        assert_eq!(before.reports_generated, 0);
        assert!(before.storage_configured);

        service
            .generate_flow_report(GenerateFlowReportRequest {
                meta: meta("Counted"),
                format: ReportFormat::Json,
                graph: flowing_chain(),
                result: None,
                options: ReportOptions::default(),
            })
            .await
            .unwrap();

        let after = service.health().await;
        assert_eq!(after.reports_generated, 1);
    }

    #[tokio::test]
    async fn test_supported_formats_catalog() {
        let service = ReportService::new(ReportConfig::default(), None);
        let response = service.get_supported_formats().await;
        assert_eq!(response.formats.len(), 6);
        assert!(response
            .formats
            .iter()
            .any(|f| f.extension == "xlsx"
                && f.content_type.contains("spreadsheetml")));
    }
}
