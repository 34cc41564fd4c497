//! Solver service facade

use flowgrid_optimization::solver::{
    algorithm_catalog, solve, solve_with_progress, AlgorithmInfo, ProgressFrame,
};
use flowgrid_optimization::{
    Algorithm, CancelToken, ErrorKind, FlowResult, Graph, SolveContext, SolveOptions,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, instrument, warn};

use crate::config::SolverConfig;
use crate::error::{Error, Result};

/// Facade for the solver RPCs.
pub struct SolverService {
    config: SolverConfig,
}

/// Solve request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    /// The graph to solve
    pub graph: Graph,
    /// Chosen algorithm
    pub algorithm: Algorithm,
    /// Solve options; `None` takes the configured defaults
    pub options: Option<SolveOptions>,
}

/// Solve response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    /// Whether the solve produced a result
    pub success: bool,
    /// Diagnostic when it did not
    pub error_message: Option<String>,
    /// Taxonomy kind of the diagnostic
    pub error_kind: Option<ErrorKind>,
    /// The result, on success
    pub result: Option<FlowResult>,
}

impl SolveResponse {
    fn ok(result: FlowResult) -> Self {
        Self {
            success: true,
            error_message: None,
            error_kind: None,
            result: Some(result),
        }
    }

    fn fail(error: &flowgrid_optimization::Error) -> Self {
        Self {
            success: false,
            error_message: Some(error.to_string()),
            error_kind: Some(error.kind()),
            result: None,
        }
    }
}

/// One element of the solve stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveStreamFrame {
    /// Whether the stream is still healthy
    pub success: bool,
    /// Diagnostic on the terminal error frame
    pub error_message: Option<String>,
    /// The progress frame
    pub frame: Option<ProgressFrame>,
}

impl SolveStreamFrame {
    fn progress(frame: ProgressFrame) -> Self {
        Self {
            success: true,
            error_message: None,
            frame: Some(frame),
        }
    }

    fn completed(result: FlowResult) -> Self {
        Self {
            success: true,
            error_message: None,
            frame: Some(ProgressFrame::completed(result)),
        }
    }

    fn error(error: &Error) -> Self {
        Self {
            success: false,
            error_message: Some(error.to_string()),
            frame: None,
        }
    }
}

/// Algorithm catalog response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAlgorithmsResponse {
    /// Always true; the catalog is static
    pub success: bool,
    /// Unused, kept for envelope uniformity
    pub error_message: Option<String>,
    /// The catalog
    pub algorithms: Vec<AlgorithmInfo>,
}

impl SolverService {
    /// Create the facade with the given defaults.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    fn resolve_options(&self, options: Option<SolveOptions>) -> SolveOptions {
        options.unwrap_or(SolveOptions {
            epsilon: self.config.default_epsilon,
            ..Default::default()
        })
    }

    /// Solve a flow problem.
    ///
    /// The solve runs on a blocking thread; the request's cancellation token
    /// is polled inside the solver. Graph- and algorithm-shaped failures
    /// come back in the envelope; runtime failures are call-level.
    #[instrument(
        skip_all,
        fields(
            algorithm = %request.algorithm,
            nodes = request.graph.node_count(),
            edges = request.graph.edge_count(),
        )
    )]
    pub async fn solve(&self, request: SolveRequest, cancel: CancelToken) -> Result<SolveResponse> {
        let options = self.resolve_options(request.options);
        let graph = request.graph;
        let algorithm = request.algorithm;
        let context = SolveContext::new().with_cancel(cancel);

        let outcome =
            tokio::task::spawn_blocking(move || solve(&graph, algorithm, &options, &context))
                .await
                .map_err(|e| Error::internal(e.to_string()))?;

        match outcome {
            Ok(result) => {
                debug!(max_flow = result.max_flow, "solve succeeded");
                Ok(SolveResponse::ok(result))
            }
            Err(error) if is_envelope_error(&error) => {
                debug!(%error, "solve rejected");
                Ok(SolveResponse::fail(&error))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Solve while streaming progress frames.
    ///
    /// The stream ends with a completed frame carrying the full result, or
    /// with an error frame. Dropping the receiver aborts the solve.
    #[instrument(skip_all, fields(algorithm = %request.algorithm))]
    pub async fn solve_stream(
        &self,
        request: SolveRequest,
        cancel: CancelToken,
    ) -> ReceiverStream<SolveStreamFrame> {
        let (tx, rx) = mpsc::channel(32);
        let options = self.resolve_options(request.options);
        let graph = request.graph;
        let algorithm = request.algorithm;
        let context = SolveContext::new().with_cancel(cancel);

        tokio::task::spawn_blocking(move || {
            let progress_tx = tx.clone();
            let mut sink = move |frame: ProgressFrame| {
                progress_tx
                    .blocking_send(SolveStreamFrame::progress(frame))
                    .is_ok()
            };

            match solve_with_progress(&graph, algorithm, &options, &context, &mut sink) {
                Ok(result) => {
                    let _ = tx.blocking_send(SolveStreamFrame::completed(result));
                }
                Err(flowgrid_optimization::Error::Cancelled { iterations }) => {
                    // Consumer abandonment or caller cancellation; nobody is
                    // listening for further frames either way.
                    debug!(iterations, "streaming solve aborted");
                }
                Err(error) => {
                    warn!(%error, "streaming solve failed");
                    let _ = tx.blocking_send(SolveStreamFrame::error(&error.into()));
                }
            }
        });

        ReceiverStream::new(rx)
    }

    /// The algorithm catalog.
    #[instrument(skip_all)]
    pub async fn get_algorithms(&self) -> GetAlgorithmsResponse {
        GetAlgorithmsResponse {
            success: true,
            error_message: None,
            algorithms: algorithm_catalog(),
        }
    }
}

/// Failures the caller can fix by changing the request travel in the
/// envelope; everything else is call-level.
fn is_envelope_error(error: &flowgrid_optimization::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::InvalidGraph
            | ErrorKind::AlgorithmMismatch
            | ErrorKind::InvalidArgument
            | ErrorKind::Infeasible
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_optimization::{Edge, Node};
    use tokio_stream::StreamExt;

    fn diamond() -> Graph {
        let mut graph = Graph::new(1, 4);
        for id in 1..=4 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::new(1, 2, 10.0, 1.0))
            .add_edge(Edge::new(1, 3, 10.0, 1.0))
            .add_edge(Edge::new(2, 4, 10.0, 1.0))
            .add_edge(Edge::new(3, 4, 10.0, 1.0));
        graph
    }

    fn service() -> SolverService {
        SolverService::new(SolverConfig::default())
    }

    #[tokio::test]
    async fn test_solve_success_envelope() {
        let response = service()
            .solve(
                SolveRequest {
                    graph: diamond(),
                    algorithm: Algorithm::EdmondsKarp,
                    options: None,
                },
                CancelToken::new(),
            )
            .await
            .unwrap();
        assert!(response.success);
        let result = response.result.unwrap();
        assert_eq!(result.max_flow, 20.0);
        assert_eq!(result.total_cost, 40.0);
    }

    #[tokio::test]
    async fn test_negative_cost_lands_in_envelope() {
        let mut graph = diamond();
        graph.edges[0].cost = -1.0;
        let response = service()
            .solve(
                SolveRequest {
                    graph,
                    algorithm: Algorithm::SuccessiveShortestPaths,
                    options: None,
                },
                CancelToken::new(),
            )
            .await
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::AlgorithmMismatch));
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn test_iteration_limit_is_call_level() {
        let error = service()
            .solve(
                SolveRequest {
                    graph: diamond(),
                    algorithm: Algorithm::EdmondsKarp,
                    options: Some(SolveOptions::default().with_max_iterations(1)),
                },
                CancelToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::IterationLimit);
    }

    #[tokio::test]
    async fn test_stream_ends_with_completed_frame() {
        let stream = service()
            .solve_stream(
                SolveRequest {
                    graph: diamond(),
                    algorithm: Algorithm::EdmondsKarp,
                    options: None,
                },
                CancelToken::new(),
            )
            .await;
        let frames: Vec<SolveStreamFrame> = stream.collect().await;

        assert!(!frames.is_empty());
        let last = frames.last().unwrap();
        assert!(last.success);
        let frame = last.frame.as_ref().unwrap();
        assert_eq!(
            frame.status,
            flowgrid_optimization::solver::StreamStatus::Completed
        );
        assert_eq!(frame.result.as_ref().unwrap().max_flow, 20.0);
        for window in frames.windows(2) {
            let a = window[0].frame.as_ref().unwrap().iteration;
            let b = window[1].frame.as_ref().unwrap().iteration;
            assert!(a <= b);
        }
    }

    #[tokio::test]
    async fn test_get_algorithms() {
        let response = service().get_algorithms().await;
        assert!(response.success);
        assert_eq!(response.algorithms.len(), 5);
    }
}
