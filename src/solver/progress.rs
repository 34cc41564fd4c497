//! Progress reporting for streaming solves
//!
//! The streaming driver wraps the same strategies as the unary solve and
//! hands frames to a [`ProgressSink`]. A sink that refuses a frame tells the
//! solver its consumer is gone; the solve is aborted and no further frames
//! are produced.

use serde::{Deserialize, Serialize};

use crate::types::{Flow, FlowResult};

/// Stream lifecycle tag carried by every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    /// Solve still running
    InProgress,
    /// Terminal frame with the full result attached
    Completed,
    /// Terminal frame after a solver error
    Error,
}

/// One progress frame of a streaming solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressFrame {
    /// Outer iterations completed so far
    pub iteration: u64,
    /// Flow value accumulated so far
    pub partial_max_flow: Flow,
    /// Frame status
    pub status: StreamStatus,
    /// Full result, present on the completed frame only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FlowResult>,
}

impl ProgressFrame {
    /// An in-progress frame
    pub fn in_progress(iteration: u64, partial_max_flow: Flow) -> Self {
        Self {
            iteration,
            partial_max_flow,
            status: StreamStatus::InProgress,
            result: None,
        }
    }

    /// The terminal frame carrying the full result
    pub fn completed(result: FlowResult) -> Self {
        Self {
            iteration: result.iterations,
            partial_max_flow: result.max_flow,
            status: StreamStatus::Completed,
            result: Some(result),
        }
    }

    /// A terminal error frame
    pub fn error(iteration: u64, partial_max_flow: Flow) -> Self {
        Self {
            iteration,
            partial_max_flow,
            status: StreamStatus::Error,
            result: None,
        }
    }
}

/// Consumer of progress frames
///
/// Implemented for every `FnMut(ProgressFrame) -> bool` closure; a closure
/// that always returns `true` is a frame-discarding sink.
pub trait ProgressSink {
    /// Deliver a frame; return `false` when the consumer is gone
    fn emit(&mut self, frame: ProgressFrame) -> bool;
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressFrame) -> bool,
{
    fn emit(&mut self, frame: ProgressFrame) -> bool {
        self(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |frame: ProgressFrame| {
                seen.push(frame.iteration);
                true
            };
            assert!(sink.emit(ProgressFrame::in_progress(1, 0.0)));
            assert!(sink.emit(ProgressFrame::in_progress(2, 5.0)));
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_frame_constructors() {
        let frame = ProgressFrame::in_progress(3, 12.0);
        assert_eq!(frame.status, StreamStatus::InProgress);
        assert!(frame.result.is_none());

        let err = ProgressFrame::error(4, 12.0);
        assert_eq!(err.status, StreamStatus::Error);
    }
}
