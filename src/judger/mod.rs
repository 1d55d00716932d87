pub mod answer;
pub mod interactive;
pub mod standard;

pub use self::{answer::AnswerSubmissionJudger, interactive::InteractiveJudger, standard::StandardJudger};

use async_trait::async_trait;
use std::{sync::Arc, time};

use crate::{
  compiler::CompilerService,
  compiler::CompilationResult,
  error::{PreprocessError, TransportError},
  model::{SourceCode, TestData, TestcaseJudge},
  preview::PreviewReader,
  result::TestcaseDetails,
  runner::RunnerTransport,
};

/// Abstract seam the orchestrator drives, specialized per problem type.
///
/// Every method takes `&self`: the orchestrator may call `judge_testcase` concurrently, so implementations hide any mutable compile-time state (the compiled
/// executable handle, say) behind interior mutability set up once by `compile`/
/// `compile_with_diagnostics` and read thereafter.
#[async_trait]
pub trait Judger: Send + Sync {
  /// Optional one-time setup, e.g. compiling a special judge or interactor. May fail the whole
  /// run.
  async fn preprocess_test_data(&self) -> Result<(), PreprocessError>;

  /// Compile the submission. Must be called and succeed before `judge_testcase`.
  async fn compile(&self) -> CompilationResult;

  /// Recompile with the instrumented language variant, for the diagnostics driver. Only
  /// ever called when `support_diagnostics` is `true`. On success, the instrumented executable
  /// becomes the one `judge_testcase` runs against for every call that follows — the diagnostics
  /// driver relies on this to re-judge a case "through the same testcase path" without a separate
  /// entry point.
  async fn compile_with_diagnostics(&self) -> CompilationResult;

  /// Whether an instrumented variant exists for this submission's language.
  fn support_diagnostics(&self) -> bool;

  /// Judge a single testcase. The sole per-case primitive: encapsulates all transport to the
  /// runner and all file-preview extraction. `started` must be invoked at most once, before this
  /// returns, at the moment execution actually begins.
  async fn judge_testcase(
    &self,
    case: &TestcaseJudge,
    started: Box<dyn FnOnce() + Send>,
  ) -> Result<TestcaseDetails, TransportError>;

  /// Scoped release of any transient resources (uploaded files, compiled executables, …).
  async fn cleanup(&self);
}

/// Shared construction context for the three specializations: the submission, the test
/// data it is judged against, and the external collaborators every specialization drives
/// the same way.
pub struct JudgeContext {
  pub test_data: TestData,
  pub submission: SourceCode,

  /// Default RPC priority, forwarded to every runner/compile call.
  pub priority: i32,

  /// Resource limits for the submission itself, supplied by the caller alongside the source;
  /// distinct from `JudgeCfg::{time_limit,memory_limit}`, which bound auxiliary programs
  /// (spj, interactor).
  pub time_limit: time::Duration,
  pub memory_limit: u64,

  pub data_display_limit: usize,

  pub runner: Arc<dyn RunnerTransport>,
  pub compiler: Arc<dyn CompilerService>,
  pub preview: Arc<dyn PreviewReader>,
}

impl JudgeContext {
  /// Truncate a directly-captured string (runner stdout/stderr, checker message) to the
  /// configured preview byte limit. Distinct from `PreviewReader`, which reads case files from
  /// disk; this operates on text the runner already handed back in-process.
  pub fn truncate(&self, s: &str) -> String {
    crate::preview::truncate_bytes(s, self.data_display_limit)
  }
}
