use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{watch, Mutex};

use crate::{
  dedup::{Deduplicator, EvalResult},
  judger::Judger,
  model::{ScoringMode, Subtask, TestcaseJudge},
  result::{CaseResult, JudgeResult, ProgressReporter, SubtaskResult, SubtaskStatus},
  score,
};

/// Drives one subtask: awaits its dependencies, applies min-propagation clamping, runs its
/// cases (sequential + skippable, or parallel for `Summation`), and reports progress throughout.
pub struct SubtaskRunner {
  pub index: usize,
  pub results: Arc<Mutex<Vec<SubtaskResult>>>,
  pub reporter: Arc<dyn ProgressReporter>,
  pub judger: Arc<dyn Judger>,
  pub dedup: Arc<Deduplicator>,

  /// Full weight (`Subtask::score`) of every subtask, indexed the same as `results`; used to turn
  /// a dependency's absolute score back into a ratio for min-propagation.
  pub subtask_scores: Vec<f64>,
}

impl SubtaskRunner {
  async fn snapshot_and_report(&self) {
    let subtasks = self.results.lock().await.clone();
    self.reporter.report(JudgeResult { subtasks }).await;
  }

  /// `dependency_rx` is this subtask's dependency-completion watchers, one per entry in
  /// `subtask.dependencies`, in the same order. `done_tx` signals this subtask's own completion
  /// to whichever subtasks depend on it.
  pub async fn run(
    &self,
    subtask: &Subtask,
    mut dependency_rx: Vec<watch::Receiver<bool>>,
    done_tx: watch::Sender<bool>,
  ) {
    for rx in &mut dependency_rx {
      // Initial value is `false`; wait until the dependency flips it. This is what guarantees
      // a dependent never observes a dependency's cases mid-flight.
      if !*rx.borrow() {
        let _ = rx.changed().await;
      }
    }

    let min_score = self.dependency_min_score(subtask).await;

    if let Some(min_score) = min_score {
      if min_score <= 0.0 {
        let mut results = self.results.lock().await;
        results[self.index].cases = subtask.cases.iter().map(|_| CaseResult::skipped()).collect();
        results[self.index].status = SubtaskStatus::Done;
        results[self.index].score = 0.0;
        drop(results);
        self.snapshot_and_report().await;
        let _ = done_tx.send(true);
        return;
      }
    }

    {
      let mut results = self.results.lock().await;
      results[self.index].cases = subtask.cases.iter().map(|_| CaseResult::waiting()).collect();
      results[self.index].status = SubtaskStatus::Running;
    }
    self.snapshot_and_report().await;

    let (ratios, has_failed) = if subtask.kind.is_skippable() {
      self.run_sequential(subtask, min_score).await
    } else {
      self.run_parallel(subtask, min_score).await
    };

    let final_score = self.partial_score(subtask, &ratios, has_failed, min_score);

    {
      let mut results = self.results.lock().await;
      results[self.index].status = SubtaskStatus::Done;
      results[self.index].score = final_score;
    }
    self.snapshot_and_report().await;
    let _ = done_tx.send(true);
  }

  /// Running score from the cases completed so far, same formula `run` uses at completion. Called
  /// after every case transition so progress snapshots refine monotonically instead of sitting at
  /// the initial baseline until the subtask finishes.
  fn partial_score(&self, subtask: &Subtask, ratios: &[f64], has_failed: bool, min_score: Option<f64>) -> f64 {
    if has_failed {
      return f64::NAN;
    }
    let raw = if ratios.is_empty() {
      CaseResult::baseline_rate(subtask.kind) * subtask.score
    } else {
      score::combine(subtask.kind, ratios) * subtask.score
    };
    match min_score {
      Some(min_score) => raw.min(min_score),
      None => raw,
    }
  }

  /// Min-propagation from dependencies, only meaningful for a `Minimum` subtask with
  /// dependencies. A dependency whose final score is `NaN` (poisoned by a `Failed` case) cannot
  /// bound anything; treated conservatively as ratio `0`, which skips this subtask entirely below.
  async fn dependency_min_score(&self, subtask: &Subtask) -> Option<f64> {
    if subtask.kind != ScoringMode::Minimum || subtask.dependencies.is_empty() {
      return None;
    }

    let results = self.results.lock().await;
    let min_ratio = subtask
      .dependencies
      .iter()
      .map(|&dep| {
        let dep_score = results[dep].score;
        if dep_score.is_nan() {
          0.0
        } else {
          dep_score / self.subtask_scores[dep]
        }
      })
      .fold(1.0_f64, f64::min);
    Some(min_ratio * subtask.score)
  }

  /// Evaluate a single case through the deduplicator, updating this subtask's slot to `Running`
  /// the instant the underlying evaluation actually begins and reporting on every
  /// transition.
  async fn judge_case(&self, case_index: usize, case: &TestcaseJudge) -> EvalResult {
    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();

    let results = self.results.clone();
    let reporter = self.reporter.clone();
    let index = self.index;
    let watcher = tokio::spawn(async move {
      if started_rx.await.is_ok() {
        if let Some(slot) = results.lock().await.get_mut(index) {
          slot.cases[case_index] = CaseResult::running();
        }
        report(&results, reporter.as_ref()).await;
      }
    });

    let started: Box<dyn FnOnce() + Send> = Box::new(move || {
      let _ = started_tx.send(());
    });

    let judger = self.judger.clone();
    let case = case.clone();
    let result = self
      .dedup
      .evaluate(&case.name, started, move |started| async move {
        judger.judge_testcase(&case, started).await
      })
      .await;

    let _ = watcher.await;
    result
  }

  /// `Minimum`/`Multiple`: strict declared order, stopping evaluation (not just reporting)
  /// the instant a case's ratio is zero/NaN.
  async fn run_sequential(&self, subtask: &Subtask, min_score: Option<f64>) -> (Vec<f64>, bool) {
    let mut ratios = Vec::with_capacity(subtask.cases.len());
    let mut skipped = false;
    let mut has_failed = false;

    for (i, case) in subtask.cases.iter().enumerate() {
      if skipped {
        self.results.lock().await[self.index].cases[i] = CaseResult::skipped();
        self.snapshot_and_report().await;
        continue;
      }

      match self.judge_case(i, case).await {
        Ok(details) => {
          let rate = details.scoring_rate;
          let skip_now = details.should_skip_rest();
          self.results.lock().await[self.index].cases[i] = CaseResult::done(details);
          ratios.push(rate);
          let partial = self.partial_score(subtask, &ratios, has_failed, min_score);
          self.results.lock().await[self.index].score = partial;
          self.snapshot_and_report().await;
          if skip_now {
            skipped = true;
          }
        }
        Err(err) => {
          self.results.lock().await[self.index].cases[i] = CaseResult::failed(err.0);
          has_failed = true;
          let partial = self.partial_score(subtask, &ratios, has_failed, min_score);
          self.results.lock().await[self.index].score = partial;
          self.snapshot_and_report().await;
        }
      }
    }

    (ratios, has_failed)
  }

  /// `Summation`: every case launches concurrently; no skipping. Every completion recomputes the
  /// running score over whichever cases have reported so far, under a shared slot vector since
  /// completions can arrive in any order.
  async fn run_parallel(&self, subtask: &Subtask, min_score: Option<f64>) -> (Vec<f64>, bool) {
    let progress: Arc<Mutex<Vec<Option<Result<f64, ()>>>>> =
      Arc::new(Mutex::new(vec![None; subtask.cases.len()]));

    let futures = subtask.cases.iter().enumerate().map(|(i, case)| {
      let progress = progress.clone();
      async move {
        let outcome = self.judge_case(i, case).await;

        let ratio = match &outcome {
          Ok(details) => Some(details.scoring_rate),
          Err(_) => None,
        };

        {
          let mut results = self.results.lock().await;
          results[self.index].cases[i] = match outcome {
            Ok(details) => CaseResult::done(details),
            Err(err) => CaseResult::failed(err.0),
          };
        }

        let (ratios_so_far, has_failed_so_far) = {
          let mut slots = progress.lock().await;
          slots[i] = Some(ratio.ok_or(()));
          let has_failed = slots.iter().any(|s| matches!(s, Some(Err(()))));
          let ratios: Vec<f64> = slots
            .iter()
            .filter_map(|s| match s {
              Some(Ok(r)) => Some(*r),
              _ => None,
            })
            .collect();
          (ratios, has_failed)
        };
        let partial = self.partial_score(subtask, &ratios_so_far, has_failed_so_far, min_score);
        self.results.lock().await[self.index].score = partial;

        self.snapshot_and_report().await;

        ratio
      }
    });

    let outcomes = join_all(futures).await;
    let has_failed = outcomes.iter().any(|r| r.is_none());
    let ratios = outcomes.into_iter().flatten().collect();
    (ratios, has_failed)
  }
}

async fn report(results: &Arc<Mutex<Vec<SubtaskResult>>>, reporter: &dyn ProgressReporter) {
  let subtasks = results.lock().await.clone();
  reporter.report(JudgeResult { subtasks }).await;
}
