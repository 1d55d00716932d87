use std::{sync::Arc, time};

use tokio::sync::{watch, Mutex};

use crate::{
  compiler::CompilationResult,
  dedup::Deduplicator,
  diagnostics,
  error::JudgeError,
  graph,
  judger::Judger,
  model::{Subtask, TestData},
  result::{JudgeResult, ProgressReporter, SubtaskResult, SubtaskStatus},
  subtask_runner::SubtaskRunner,
};

/// What `run` produced, distinguishing a primary compile failure from a
/// completed judge run.
pub enum JudgeOutcome {
  CompileFailed(CompilationResult),
  Judged(JudgeResult),
}

/// Full judge-run lifecycle: preprocess, compile, schedule every subtask
/// honoring the dependency DAG, then the diagnostics driver. The sole entry point the rest of the
/// crate (and `main`) drives.
pub async fn run(
  judger: Arc<dyn Judger>,
  test_data: &TestData,
  reporter: Arc<dyn ProgressReporter>,
  submission_time_limit: time::Duration,
  submission_memory_limit: u64,
) -> Result<JudgeOutcome, JudgeError> {
  judger.preprocess_test_data().await?;

  let compile_result = judger.compile().await;
  if !compile_result.is_success() {
    return Ok(JudgeOutcome::CompileFailed(compile_result));
  }

  let order = graph::topological_order(&test_data.subtasks)?;

  let result = schedule(judger.clone(), &test_data.subtasks, &order, reporter.clone()).await;

  if let Err(e) = diagnostics::maybe_run(
    judger.as_ref(),
    &test_data.subtasks,
    &result,
    reporter.as_ref(),
    submission_time_limit,
    submission_memory_limit,
  )
  .await
  {
    log::warn!("diagnostics driver failed, ignoring: {e}");
  }

  judger.cleanup().await;

  Ok(JudgeOutcome::Judged(JudgeResult {
    subtasks: result.lock().await.clone(),
  }))
}

/// Component E: allocate baseline results, spawn one task per subtask in topological order, each
/// awaiting its own dependencies before running.
async fn schedule(
  judger: Arc<dyn Judger>,
  subtasks: &[Subtask],
  order: &[usize],
  reporter: Arc<dyn ProgressReporter>,
) -> Arc<Mutex<Vec<SubtaskResult>>> {
  let n = subtasks.len();
  let baseline: Vec<SubtaskResult> = subtasks
    .iter()
    .map(|s| SubtaskResult {
      cases: Vec::new(),
      status: SubtaskStatus::Waiting,
      score: baseline_score(s),
    })
    .collect();
  let results = Arc::new(Mutex::new(baseline));
  reporter
    .report(JudgeResult {
      subtasks: results.lock().await.clone(),
    })
    .await;

  let dedup = Arc::new(Deduplicator::new());
  let subtask_scores: Vec<f64> = subtasks.iter().map(|s| s.score).collect();

  let mut done_txs = Vec::with_capacity(n);
  let mut done_rxs = Vec::with_capacity(n);
  for _ in 0..n {
    let (tx, rx) = watch::channel(false);
    done_txs.push(Some(tx));
    done_rxs.push(rx);
  }

  let mut handles = Vec::with_capacity(n);
  for &index in order {
    let subtask = subtasks[index].clone();
    let dependency_rx = subtask.dependencies.iter().map(|&dep| done_rxs[dep].clone()).collect();
    let done_tx = done_txs[index].take().expect("each subtask scheduled exactly once");

    let runner = SubtaskRunner {
      index,
      results: results.clone(),
      reporter: reporter.clone(),
      judger: judger.clone(),
      dedup: dedup.clone(),
      subtask_scores: subtask_scores.clone(),
    };

    handles.push(tokio::spawn(async move {
      runner.run(&subtask, dependency_rx, done_tx).await;
    }));
  }

  for handle in handles {
    let _ = handle.await;
  }

  results
}

/// Optimistic baseline before any case has run: full weight for skippable modes,
/// zero for summation.
fn baseline_score(subtask: &Subtask) -> f64 {
  if subtask.kind.is_skippable() {
    subtask.score
  } else {
    0.0
  }
}

