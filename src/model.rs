use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::lang::Lang;

/// Scoring mode of a subtask.
///
/// `Minimum` and `Multiple` are skippable; `Summation` never skips.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScoringMode {
  Minimum,
  Multiple,
  Summation,
}

impl ScoringMode {
  /// Whether a zero/NaN scoring rate on a case short-circuits the rest of the subtask.
  pub fn is_skippable(&self) -> bool {
    matches!(self, Self::Minimum | Self::Multiple)
  }
}

/// A single testcase reference inside a subtask.
///
/// `name` is the deduplication key: two `TestcaseJudge`s with the same `name`, anywhere in
/// `TestData`, refer to the same underlying evaluation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TestcaseJudge {
  pub name: String,

  /// File name relative to the test-data directory, or `None` (e.g. generated input).
  pub input: Option<String>,

  /// File name relative to the test-data directory, or `None` (e.g. output-only problems).
  pub output: Option<String>,
}

/// A named group of testcases sharing a scoring rule and weight.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Subtask {
  #[serde(rename = "type")]
  pub kind: ScoringMode,

  /// Full weight of this subtask; final score is in `[0, score]`.
  pub score: f64,

  pub cases: Vec<TestcaseJudge>,

  /// Indices into the owning `TestData::subtasks`. Any DAG; no ordering constraint required.
  pub dependencies: Vec<usize>,
}

/// Source code plus the language it is written in.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceCode {
  pub lang: Lang,
  pub code: String,
}

/// Immutable input to a single judge run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TestData {
  /// Identifier used to resolve the test-data directory (resolution itself is out of core scope).
  pub name: String,

  pub subtasks: Vec<Subtask>,

  /// Special judge source, if the problem uses one.
  pub spj: Option<SourceCode>,

  /// Extra helper files to attach when compiling/running, keyed by language name.
  pub extra_source_files: HashMap<String, Vec<String>>,
}

impl TestData {
  /// Look up a testcase by name across every subtask. Used by tests and by the deduplicator's
  /// callers to sanity-check fixtures; the orchestrator itself never needs this.
  pub fn find_case(&self, name: &str) -> Option<&TestcaseJudge> {
    self
      .subtasks
      .iter()
      .flat_map(|s| s.cases.iter())
      .find(|c| c.name == name)
  }
}
