use std::{sync::Arc, time};

use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
  judger::Judger,
  model::{Subtask, TestcaseJudge},
  result::{CaseResult, CaseType, ProgressReporter, SubtaskResult},
  CONFIG,
};

#[derive(Debug, Error)]
pub(crate) enum DiagnosticsError {
  #[error("instrumented compile failed: {0}")]
  Compile(String),
  #[error("rerun failed: {0}")]
  Rerun(#[from] crate::error::TransportError),
}

/// Component F. Runs only if diagnostics is enabled and the judger advertises support; picks the
/// first eligible failed case, reruns it with an instrumented compile, and attaches stderr to
/// that case's `diagnostics` field. Any failure here is logged and otherwise has no effect on the
/// primary verdict.
pub async fn maybe_run(
  judger: &dyn Judger,
  subtasks: &[Subtask],
  results: &Arc<Mutex<Vec<SubtaskResult>>>,
  reporter: &dyn ProgressReporter,
  submission_time_limit: time::Duration,
  submission_memory_limit: u64,
) -> Result<(), String> {
  if !CONFIG.diagnostics.enabled || !judger.support_diagnostics() {
    return Ok(());
  }

  let Some((subtask_index, case_index, case)) = find_eligible_case(subtasks, results, submission_time_limit, submission_memory_limit).await else {
    return Ok(());
  };

  run_diagnostics(judger, results, reporter, subtask_index, case_index, &case)
    .await
    .map_err(|e| e.to_string())
}

/// Eligibility scan: first subtask in declared order, then first case in declared order,
/// whose recorded result is `WrongAnswer`/`RuntimeError` and within the diagnostics time/memory
/// ceilings.
pub(crate) async fn find_eligible_case(
  subtasks: &[Subtask],
  results: &Arc<Mutex<Vec<SubtaskResult>>>,
  submission_time_limit: time::Duration,
  submission_memory_limit: u64,
) -> Option<(usize, usize, TestcaseJudge)> {
  let diag = &CONFIG.diagnostics;
  let max_time = (diag.max_time_ratio * submission_time_limit.as_millis() as f64).min(diag.max_time as f64) as u64;
  // `submission_memory_limit` is bytes; diagnostics limits are expressed in MiB (ratio of a MiB
  // value) while recorded `TestcaseDetails.memory` is KiB — convert the submission limit to MiB
  // before applying the ratio, then to KiB before comparing
  let memory_limit_mib = submission_memory_limit as f64 / (1024.0 * 1024.0);
  let max_memory = (diag.max_memory_ratio * memory_limit_mib * 1024.0).min(diag.max_memory as f64) as u64;

  let results = results.lock().await;
  for (subtask_index, subtask) in subtasks.iter().enumerate() {
    let Some(subtask_result) = results.get(subtask_index) else {
      continue;
    };
    for (case_index, case) in subtask.cases.iter().enumerate() {
      let Some(CaseResult {
        result: Some(details), ..
      }) = subtask_result.cases.get(case_index)
      else {
        continue;
      };
      let eligible_kind = matches!(details.kind, CaseType::WrongAnswer | CaseType::RuntimeError);
      if eligible_kind && details.time <= max_time && details.memory <= max_memory {
        return Some((subtask_index, case_index, case.clone()));
      }
    }
  }
  None
}

pub(crate) async fn run_diagnostics(
  judger: &dyn Judger,
  results: &Arc<Mutex<Vec<SubtaskResult>>>,
  reporter: &dyn ProgressReporter,
  subtask_index: usize,
  case_index: usize,
  case: &TestcaseJudge,
) -> Result<(), DiagnosticsError> {
  let compile_result = judger.compile_with_diagnostics().await;
  if !compile_result.is_success() {
    return Err(DiagnosticsError::Compile(match compile_result {
      crate::compiler::CompilationResult::Failure { message } => message,
      _ => unreachable!(),
    }));
  }

  let rerun = judger.judge_testcase(case, Box::new(|| {})).await?;

  let mut guard = results.lock().await;
  if let Some(slot) = guard
    .get_mut(subtask_index)
    .and_then(|s| s.cases.get_mut(case_index))
  {
    if let Some(details) = &mut slot.result {
      details.diagnostics = Some(rerun.user_error);
    }
  }
  let subtasks = guard.clone();
  drop(guard);

  reporter.report(crate::result::JudgeResult { subtasks }).await;
  Ok(())
}
