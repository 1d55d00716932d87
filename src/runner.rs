use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time;

use crate::error::TransportError;

/// Opaque reference to test data, uploaded input/answer, and executables the runner needs to
/// locate to run one command.
///
/// The core only ever forwards this verbatim; it never inspects or constructs file contents.
/// `user_output_ref` pairs with `spj_executable_name` for the compare dispatch: a
/// reference previously handed back in `TaskResult::output_ref`, standing in for a second,
/// already-captured program's stdout the runner copies in alongside the checker the same way the
/// teacher's `checker::check` copies in a cached `FileHandle` rather than re-running the program.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaskPayload {
  pub test_data_name: String,
  pub input_data: Option<String>,
  pub answer_data: Option<String>,
  pub time: time::Duration,
  pub memory: u64,
  pub file_io_input: Option<String>,
  pub file_io_output: Option<String>,
  pub user_executable_name: String,
  pub spj_executable_name: Option<String>,
  pub user_output_ref: Option<String>,

  /// When set, `user_executable_name` and `spj_executable_name` (here, the interactor) run as a
  /// live pair wired stdout-to-stdin both ways, the runner-side equivalent of the teacher's
  /// `sandbox::Request::RunPiped` — as opposed to the default "run, then separately hand the
  /// captured output to a checker" semantics.
  pub interactive: bool,
}

/// Run-level verdict a runner assigns after measuring one execution against its resource limits.
///
/// Resource measurement and the limit check itself are the runner's responsibility, not the
/// core's — the core only ever branches on the verdict it is handed back.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
  Accepted,
  RuntimeError,
  TimeLimitExceeded,
  MemoryLimitExceeded,
  OutputLimitExceeded,
  FileError,
}

/// Result of one runner task.
#[derive(Debug, Clone)]
pub struct TaskResult {
  pub status: RunStatus,
  pub time: time::Duration,
  pub memory: u64,
  pub stdout: String,
  pub stderr: String,

  /// Opaque reference to the full captured stdout, present whenever `status` is `Accepted`.
  /// Feeds back into a later `TaskPayload::user_output_ref` so a checker can inspect it without
  /// the judger ever holding (or re-uploading) the raw bytes itself.
  pub output_ref: Option<String>,
}

/// The seam the core drives to reach the remote runner.
///
/// A real implementation submits `payload` to a priority task queue and awaits the asynchronous reply; the wire format of that queue is
/// explicitly out of scope and is not modeled here. The only two contractual guarantees the
/// core relies on: `run_task` delivers exactly one result or one transport error, and `started` is
/// invoked at most once, strictly before the result is returned.
#[async_trait]
pub trait RunnerTransport: Send + Sync {
  async fn run_task(
    &self,
    payload: TaskPayload,
    priority: i32,
    started: Box<dyn FnOnce() + Send>,
  ) -> Result<TaskResult, TransportError>;
}
