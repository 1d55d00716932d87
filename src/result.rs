use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Verdict of judging a single testcase.
#[derive(
  Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum CaseType {
  Accepted,
  WrongAnswer,
  PartiallyCorrect,
  RuntimeError,
  TimeLimitExceeded,
  MemoryLimitExceeded,
  OutputLimitExceeded,
  FileError,
  JudgementFailed,
  InvalidInteraction,
}

/// A truncated preview of an input/output file.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FilePreview {
  pub name: String,
  pub content: String,
}

impl FilePreview {
  /// Truncate `content` to at most `limit` bytes, matching `readFileLength`'s contract.
  pub fn new(name: impl Into<String>, content: &str, limit: usize) -> Self {
    Self {
      name: name.into(),
      content: crate::preview::truncate_bytes(content, limit),
    }
  }
}

/// Result of judging one testcase.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TestcaseDetails {
  #[serde(rename = "type")]
  pub kind: CaseType,

  /// Milliseconds.
  pub time: u64,

  /// KiB.
  pub memory: u64,

  pub scoring_rate: f64,

  pub user_error: String,
  pub user_output: String,
  pub spj_message: String,
  pub system_message: String,

  pub input: Option<FilePreview>,
  pub output: Option<FilePreview>,

  /// Filled only by the diagnostics driver.
  pub diagnostics: Option<String>,
}

impl TestcaseDetails {
  /// `scoringRate` is null/NaN/zero under the skip rule.
  pub fn should_skip_rest(&self) -> bool {
    self.scoring_rate.is_nan() || self.scoring_rate <= 0.0
  }
}

/// Lifecycle status of a single case within a judge run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CaseStatus {
  Waiting,
  Running,
  Done,
  Skipped,
  Failed,
}

/// Progress/final record of one case.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaseResult {
  pub status: CaseStatus,
  pub result: Option<TestcaseDetails>,
  pub error_message: Option<String>,
}

impl CaseResult {
  pub fn waiting() -> Self {
    Self {
      status: CaseStatus::Waiting,
      result: None,
      error_message: None,
    }
  }

  pub fn running() -> Self {
    Self {
      status: CaseStatus::Running,
      result: None,
      error_message: None,
    }
  }

  pub fn done(result: TestcaseDetails) -> Self {
    Self {
      status: CaseStatus::Done,
      result: Some(result),
      error_message: None,
    }
  }

  pub fn skipped() -> Self {
    Self {
      status: CaseStatus::Skipped,
      result: None,
      error_message: None,
    }
  }

  pub fn failed(message: impl Into<String>) -> Self {
    Self {
      status: CaseStatus::Failed,
      result: None,
      error_message: Some(message.into()),
    }
  }

  /// The scoring rate a freshly-initialized case contributes before it is actually judged: `1` for skippable modes' optimistic baseline, `0` for summation, used only by
  /// the score calculator to seed subtask scores prior to any case running.
  pub fn baseline_rate(mode: crate::model::ScoringMode) -> f64 {
    match mode {
      crate::model::ScoringMode::Minimum | crate::model::ScoringMode::Multiple => 1.0,
      crate::model::ScoringMode::Summation => 0.0,
    }
  }
}

/// Lifecycle status of a subtask, mirrored from its cases for convenience.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SubtaskStatus {
  Waiting,
  Running,
  Done,
}

/// Aggregated result of one subtask.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtaskResult {
  pub cases: Vec<CaseResult>,
  pub status: SubtaskStatus,

  /// `NaN` iff any case in `cases` has status `Failed`.
  pub score: f64,
}

/// Full snapshot of a judge run.
///
/// Every `reportProgress` call ships a complete, independent snapshot — never a diff — so
/// out-of-order delivery across subtasks can never corrupt the picture the caller sees. Within one
/// case's lifecycle the sequence of statuses observed over successive snapshots is monotonic:
/// `Waiting -> Running -> {Done | Skipped | Failed}`, never backwards.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JudgeResult {
  pub subtasks: Vec<SubtaskResult>,
}

/// Caller-supplied progress sink. May itself suspend (e.g. forwarding over
/// a socket); the orchestrator awaits each call before continuing.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
  async fn report(&self, result: JudgeResult);
}
