//! FlowGrid CLI
//!
//! Drives the service facades from the command line: solve a graph file,
//! validate it, render a report, or print the algorithm catalog. Graphs are
//! JSON documents matching the `Graph` schema.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use flowgrid_optimization::validation::ValidationLevel;
use flowgrid_optimization::{Algorithm, CancelToken, Graph, SolveOptions};
use flowgrid_server::config::ServerConfig;
use flowgrid_server::report::{ReportFormat, ReportOptions};
use flowgrid_server::repository::{FileReportRepository, ReportRepository, spawn_sweeper};
use flowgrid_server::service::report::{GenerateSummaryReportRequest, ReportMeta};
use flowgrid_server::service::solver::SolveRequest;
use flowgrid_server::service::validation::ValidateGraphRequest;
use flowgrid_server::service::{ReportService, SolverService, ValidationService};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// FlowGrid - flow optimization services
#[derive(Parser)]
#[command(name = "flowgrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a graph file
    Solve {
        /// Graph JSON file
        input: PathBuf,

        /// Algorithm to use
        #[arg(short, long, default_value = "edmonds_karp")]
        algorithm: Algorithm,

        /// Iteration limit (0 = unlimited)
        #[arg(long, default_value = "0")]
        max_iterations: u64,

        /// Timeout in seconds (0 = none)
        #[arg(long, default_value = "0")]
        timeout: f64,

        /// Include augmenting paths in the output
        #[arg(long)]
        paths: bool,
    },

    /// Validate a graph file
    Validate {
        /// Graph JSON file
        input: PathBuf,

        /// Validation level
        #[arg(short, long)]
        level: Option<ValidationLevel>,
    },

    /// Render a summary report for a graph file
    Report {
        /// Graph JSON file
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "markdown")]
        format: ReportFormat,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report title
        #[arg(short, long, default_value = "FlowGrid Report")]
        title: String,

        /// Algorithm used to produce the reported flow
        #[arg(short, long, default_value = "edmonds_karp")]
        algorithm: Algorithm,

        /// Persist the report into the configured repository
        #[arg(long)]
        save: bool,
    },

    /// List the solver algorithm catalog
    Algorithms,

    /// Remove expired reports from the configured repository
    Sweep,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    match cli.command {
        Commands::Solve {
            input,
            algorithm,
            max_iterations,
            timeout,
            paths,
        } => {
            let graph = load_graph(&input)?;
            let service = SolverService::new(config.solver.clone());
            let response = service
                .solve(
                    SolveRequest {
                        graph,
                        algorithm,
                        options: Some(SolveOptions {
                            max_iterations,
                            timeout_seconds: timeout,
                            return_paths: paths,
                            epsilon: config.solver.default_epsilon,
                        }),
                    },
                    CancelToken::new(),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Validate { input, level } => {
            let graph = load_graph(&input)?;
            let service = ValidationService::new(config.validation.clone());
            let response = service
                .validate_graph(ValidateGraphRequest {
                    graph,
                    level,
                    capacity_ceiling: None,
                })
                .await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Report {
            input,
            format,
            output,
            title,
            algorithm,
            save,
        } => {
            let mut graph = load_graph(&input)?;

            // Solve first so the report covers an actual assignment.
            let solver = SolverService::new(config.solver.clone());
            let solved = solver
                .solve(
                    SolveRequest {
                        graph: graph.clone(),
                        algorithm,
                        options: None,
                    },
                    CancelToken::new(),
                )
                .await?;
            let result = match solved.result {
                Some(result) => {
                    for (edge, flow) in graph.edges.iter_mut().zip(&result.edge_flows) {
                        edge.current_flow = flow.flow;
                    }
                    Some(result)
                }
                None => {
                    anyhow::bail!(
                        "solve failed: {}",
                        solved.error_message.unwrap_or_default()
                    );
                }
            };

            let repository = open_repository(&config).await?;
            let service = ReportService::new(config.report.clone(), repository);
            let response = service
                .generate_summary_report(GenerateSummaryReportRequest {
                    meta: ReportMeta {
                        title,
                        ..Default::default()
                    },
                    format,
                    graph,
                    result,
                    cost_options: None,
                    bottleneck_options: None,
                    samples: Vec::new(),
                    confidence_level: 0.0,
                    options: ReportOptions {
                        save_to_storage: Some(save),
                        ..Default::default()
                    },
                })
                .await?;
            if !response.success {
                anyhow::bail!(
                    "report generation failed: {}",
                    response.error_message.unwrap_or_default()
                );
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, &response.content)?;
                    info!(path = %path.display(), bytes = response.size_bytes, "report written");
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&response.content)?;
                }
            }
            if let Some(id) = response.report_id {
                info!(%id, filename = %response.filename, "report persisted");
            }
        }

        Commands::Algorithms => {
            let service = SolverService::new(config.solver.clone());
            let response = service.get_algorithms().await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Sweep => {
            let Some(repository) = open_repository(&config).await? else {
                anyhow::bail!("no report storage path configured");
            };
            // One immediate pass through the same task the long-running
            // deployment would keep alive.
            let handle = spawn_sweeper(repository.clone(), config.report.cleanup_interval());
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            handle.abort();
            let stats = repository.stats(None).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

fn load_graph(path: &PathBuf) -> anyhow::Result<Graph> {
    let raw = std::fs::read_to_string(path)?;
    Ok(Graph::from_json(&raw)?)
}

async fn open_repository(
    config: &ServerConfig,
) -> anyhow::Result<Option<Arc<dyn ReportRepository>>> {
    match &config.report.storage_path {
        Some(path) => {
            let repository = FileReportRepository::open(path).await?;
            Ok(Some(Arc::new(repository) as Arc<dyn ReportRepository>))
        }
        None => Ok(None),
    }
}
