use crate::{
  error::GraphError,
  model::{ScoringMode, Subtask},
};

/// Validate the subtask dependency DAG and compute a topological order.
///
/// Validation happens while computing in-degrees, before Kahn's algorithm runs: every dependency
/// index must be in bounds, and any subtask with a non-empty `dependencies` (and every subtask it
/// depends on) must be `Minimum`. Ties in the topological order break by ascending
/// original index — the queue is seeded in index order — which is what makes the order observable
/// and reproducible in logs.
pub fn topological_order(subtasks: &[Subtask]) -> Result<Vec<usize>, GraphError> {
  let n = subtasks.len();

  for (i, subtask) in subtasks.iter().enumerate() {
    if subtask.dependencies.is_empty() {
      continue;
    }
    if subtask.kind != ScoringMode::Minimum {
      return Err(GraphError::DependentNotMinimum {
        subtask: i,
        found: subtask.kind,
      });
    }
    for &dep in &subtask.dependencies {
      if dep >= n {
        return Err(GraphError::UnknownDependency {
          subtask: i,
          dependency: dep,
        });
      }
      if subtasks[dep].kind != ScoringMode::Minimum {
        return Err(GraphError::DependencyNotMinimum {
          subtask: i,
          dependency: dep,
          found: subtasks[dep].kind,
        });
      }
    }
  }

  // An edge `subtask -> dep` means `subtask` must run after `dep`, so `subtask`'s in-degree is
  // simply the length of its own dependency list.
  let mut in_degree: Vec<usize> = subtasks.iter().map(|s| s.dependencies.len()).collect();

  let mut queue: std::collections::VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
  let mut order = Vec::with_capacity(n);

  // Adjacency: dependents[dep] = subtasks that depend on `dep`.
  let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
  for (i, subtask) in subtasks.iter().enumerate() {
    for &dep in &subtask.dependencies {
      dependents[dep].push(i);
    }
  }

  while let Some(node) = queue.pop_front() {
    order.push(node);
    // Newly-zeroed dependents are appended in ascending index order because `dependents[node]`
    // was built by iterating subtasks in ascending index order above.
    for &dependent in &dependents[node] {
      in_degree[dependent] -= 1;
      if in_degree[dependent] == 0 {
        queue.push_back(dependent);
      }
    }
  }

  if order.len() < n {
    return Err(GraphError::LoopDetected);
  }

  Ok(order)
}
