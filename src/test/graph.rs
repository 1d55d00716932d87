use crate::{
  error::GraphError,
  graph,
  model::ScoringMode,
  test::fakes::{case, subtask},
};

#[test]
fn topological_order_respects_dependency_edges() {
  let subtasks = vec![
    subtask(ScoringMode::Minimum, 50.0, vec![case("a1")], vec![]),
    subtask(ScoringMode::Minimum, 100.0, vec![case("b1")], vec![0]),
  ];

  let order = graph::topological_order(&subtasks).unwrap();
  assert_eq!(order, vec![0, 1]);
}

#[test]
fn independent_subtasks_keep_ascending_index_order() {
  let subtasks = vec![
    subtask(ScoringMode::Summation, 10.0, vec![case("a")], vec![]),
    subtask(ScoringMode::Summation, 10.0, vec![case("b")], vec![]),
    subtask(ScoringMode::Summation, 10.0, vec![case("c")], vec![]),
  ];

  assert_eq!(graph::topological_order(&subtasks).unwrap(), vec![0, 1, 2]);
}

#[test]
fn cycle_is_rejected() {
  let subtasks = vec![
    subtask(ScoringMode::Minimum, 50.0, vec![case("a")], vec![1]),
    subtask(ScoringMode::Minimum, 50.0, vec![case("b")], vec![0]),
  ];

  assert_eq!(graph::topological_order(&subtasks), Err(GraphError::LoopDetected));
}

#[test]
fn dependent_must_be_minimum() {
  let subtasks = vec![
    subtask(ScoringMode::Minimum, 50.0, vec![case("a")], vec![]),
    subtask(ScoringMode::Summation, 50.0, vec![case("b")], vec![0]),
  ];

  assert_eq!(
    graph::topological_order(&subtasks),
    Err(GraphError::DependentNotMinimum {
      subtask: 1,
      found: ScoringMode::Summation,
    })
  );
}

#[test]
fn dependency_must_be_minimum() {
  let subtasks = vec![
    subtask(ScoringMode::Summation, 50.0, vec![case("a")], vec![]),
    subtask(ScoringMode::Minimum, 50.0, vec![case("b")], vec![0]),
  ];

  assert_eq!(
    graph::topological_order(&subtasks),
    Err(GraphError::DependencyNotMinimum {
      subtask: 1,
      dependency: 0,
      found: ScoringMode::Summation,
    })
  );
}

#[test]
fn unknown_dependency_is_rejected() {
  let subtasks = vec![subtask(ScoringMode::Minimum, 50.0, vec![case("a")], vec![7])];

  assert_eq!(
    graph::topological_order(&subtasks),
    Err(GraphError::UnknownDependency { subtask: 0, dependency: 7 })
  );
}
