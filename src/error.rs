use thiserror::Error;

/// Fatal configuration error raised by the subtask-graph analyzer.
///
/// Any of these aborts the whole judge run before a single testcase is evaluated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
  #[error("subtask {subtask} depends on unknown subtask {dependency}")]
  UnknownDependency { subtask: usize, dependency: usize },

  #[error("subtask {subtask} has dependencies but is not a Minimum subtask (found {found:?})")]
  DependentNotMinimum {
    subtask: usize,
    found: crate::model::ScoringMode,
  },

  #[error(
    "subtask {subtask} depends on subtask {dependency}, which is not a Minimum subtask (found {found:?})"
  )]
  DependencyNotMinimum {
    subtask: usize,
    dependency: usize,
    found: crate::model::ScoringMode,
  },

  #[error("loop detected in subtask dependency graph")]
  LoopDetected,
}

/// Error surfaced when `preprocessTestData` (e.g. compiling a special judge or interactor) fails.
#[derive(Debug, Error)]
#[error("test data preprocessing failed: {0}")]
pub struct PreprocessError(pub String);

/// Per-case transport/runner error.
#[derive(Debug, Error, Clone)]
#[error("runner transport error: {0}")]
pub struct TransportError(pub String);

/// Top level error returned by the orchestrator entry point.
///
/// Only configuration errors and preprocessing failures are terminal; everything else is encoded
/// in the returned `JudgeResult` instead of being raised.
#[derive(Debug, Error)]
pub enum JudgeError {
  #[error("configuration error: {0}")]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Preprocess(#[from] PreprocessError),
}
