use crate::model::ScoringMode;

/// Pure scoring function: scoring-mode × per-case ratios → unscaled ratio in `[0, 1]`.
///
/// Callers are responsible for multiplying by `subtask.score` and for mapping a `Failed` case to
/// `NaN` — this function only ever sees ratios, never case statuses.
///
/// # Panics
///
/// `Minimum` panics on an empty slice; callers guarantee subtasks have at least one case.
pub fn combine(mode: ScoringMode, ratios: &[f64]) -> f64 {
  match mode {
    ScoringMode::Minimum => {
      debug_assert!(!ratios.is_empty(), "Minimum subtask with no cases is undefined input");
      ratios.iter().copied().fold(f64::INFINITY, f64::min)
    }
    ScoringMode::Multiple => ratios.iter().copied().product(),
    ScoringMode::Summation => {
      if ratios.is_empty() {
        0.0
      } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
      }
    }
  }
}
