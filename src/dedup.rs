use std::{collections::HashMap, future::Future};

use tokio::sync::{watch, Mutex};

use crate::{error::TransportError, result::TestcaseDetails};

/// Outcome of judging one (deduplicated) testcase.
pub type EvalResult = Result<TestcaseDetails, TransportError>;

/// Per-run testcase deduplicator.
///
/// Guarantees at-most-one underlying evaluation per `case.name`, shared by every subtask that
/// references it — including subtasks scheduled concurrently. The map must live for exactly one
/// judge run; construct a fresh one per run.
pub struct Deduplicator {
  entries: Mutex<HashMap<String, watch::Receiver<Option<EvalResult>>>>,
}

impl Default for Deduplicator {
  fn default() -> Self {
    Self::new()
  }
}

impl Deduplicator {
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
    }
  }

  /// Evaluate `name` at most once across this deduplicator's lifetime.
  ///
  /// `judge` and `started` are only ever invoked for the first caller observing `name`: `judge` is
  /// handed `started` to forward into the actual evaluation, so it fires exactly when the
  /// underlying runner task begins, not when `evaluate` is entered. Every later caller for the
  /// same `name` — whether arriving before or after the first evaluation completes — never has
  /// `judge` or its own `started` invoked at all, and observes the first caller's result directly.
  pub async fn evaluate<Judge, Fut>(
    &self,
    name: &str,
    started: Box<dyn FnOnce() + Send>,
    judge: Judge,
  ) -> EvalResult
  where
    Judge: FnOnce(Box<dyn FnOnce() + Send>) -> Fut + Send + 'static,
    Fut: Future<Output = EvalResult> + Send,
  {
    let mut rx = {
      let mut entries = self.entries.lock().await;
      if let Some(rx) = entries.get(name) {
        rx.clone()
      } else {
        let (tx, rx) = watch::channel(None);
        entries.insert(name.to_string(), rx.clone());
        drop(entries);

        let result = judge(started).await;
        // Ignore send errors: every receiver (including our own `rx` below) is still alive.
        let _ = tx.send(Some(result.clone()));
        return result;
      }
    };

    loop {
      if let Some(result) = rx.borrow().clone() {
        return result;
      }
      if rx.changed().await.is_err() {
        // The first caller's sender was dropped without ever sending — only possible if it
        // panicked mid-evaluation. Surface that as a transport failure rather than hanging.
        return Err(TransportError(format!(
          "evaluation of testcase {name} was abandoned"
        )));
      }
    }
  }
}
