use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
  diagnostics,
  judger::{Judger, StandardJudger},
  model::ScoringMode,
  orchestrator::{self, JudgeOutcome},
  result::{CaseStatus, CaseType, SubtaskResult, SubtaskStatus, TestcaseDetails},
  runner::RunnerTransport,
  test::fakes::{case, context, subtask, test_data, test_data_with_spj, FakeReporter, FakeRunnerTransport, ScriptedRun},
};

fn time_limit() -> Duration {
  Duration::from_secs(1)
}

const MEMORY_LIMIT: u64 = 256 * 1024 * 1024;

async fn judge(
  test_data: crate::model::TestData,
  runner: Arc<FakeRunnerTransport>,
) -> (JudgeOutcome, Arc<FakeReporter>) {
  let ctx = context(test_data.clone(), runner.clone() as Arc<dyn RunnerTransport>);
  let judger: Arc<dyn Judger> = Arc::new(StandardJudger::new(ctx));
  let reporter = Arc::new(FakeReporter::new());

  let outcome = orchestrator::run(judger, &test_data, reporter.clone(), time_limit(), MEMORY_LIMIT)
    .await
    .unwrap();

  (outcome, reporter)
}

#[tokio::test]
async fn s1_single_subtask_summation_all_accepted() {
  let cases = vec![case("c1"), case("c2"), case("c3"), case("c4")];
  let scripted = cases
    .iter()
    .map(|c| (c.name.clone(), ScriptedRun::accepted(c.name.clone())))
    .collect();
  let data = test_data(vec![subtask(ScoringMode::Summation, 100.0, cases, vec![])]);
  let runner = Arc::new(FakeRunnerTransport::new(scripted));

  let (outcome, _reporter) = judge(data, runner).await;

  let JudgeOutcome::Judged(result) = outcome else {
    panic!("expected a judged outcome");
  };
  assert_eq!(result.subtasks[0].score, 100.0);
  assert!(result.subtasks[0].cases.iter().all(|c| c.status == CaseStatus::Done));
}

#[tokio::test]
async fn s2_skip_on_zero_ratio() {
  let data = test_data(vec![subtask(
    ScoringMode::Minimum,
    100.0,
    vec![case("c1"), case("c2"), case("c3")],
    vec![],
  )]);
  let scripted = HashMap::from([
    ("c1".to_string(), ScriptedRun::accepted("c1")),
    ("c2".to_string(), ScriptedRun::wrong_answer()),
    ("c3".to_string(), ScriptedRun::accepted("c3")),
  ]);
  let runner = Arc::new(FakeRunnerTransport::new(scripted));

  let (outcome, _reporter) = judge(data, runner).await;

  let JudgeOutcome::Judged(result) = outcome else {
    panic!("expected a judged outcome");
  };
  let cases = &result.subtasks[0].cases;
  assert_eq!(cases[0].status, CaseStatus::Done);
  assert_eq!(cases[0].result.as_ref().unwrap().scoring_rate, 1.0);
  assert_eq!(cases[1].status, CaseStatus::Done);
  assert_eq!(cases[1].result.as_ref().unwrap().scoring_rate, 0.0);
  assert_eq!(cases[2].status, CaseStatus::Skipped);
  assert_eq!(result.subtasks[0].score, 0.0);
}

#[tokio::test]
async fn s3_deduplicates_a_shared_testcase_across_subtasks() {
  let data = test_data(vec![
    subtask(ScoringMode::Summation, 50.0, vec![case("shared")], vec![]),
    subtask(ScoringMode::Summation, 50.0, vec![case("shared")], vec![]),
  ]);
  let scripted = HashMap::from([("shared".to_string(), ScriptedRun::accepted("shared"))]);
  let runner = Arc::new(FakeRunnerTransport::new(scripted));

  let (outcome, _reporter) = judge(data, runner.clone()).await;

  let JudgeOutcome::Judged(result) = outcome else {
    panic!("expected a judged outcome");
  };
  assert_eq!(result.subtasks[0].score, 50.0);
  assert_eq!(result.subtasks[1].score, 50.0);
  // One payload for the shared case's single underlying evaluation; the second subtask's
  // reference to the same name never reaches the runner at all.
  assert_eq!(runner.call_count().await, 1);
}

#[tokio::test]
async fn s4_dependency_min_propagation_clamps_the_dependent() {
  let data = test_data_with_spj(vec![
    subtask(ScoringMode::Minimum, 50.0, vec![case("a1")], vec![]),
    subtask(ScoringMode::Minimum, 100.0, vec![case("b1")], vec![0]),
  ]);
  let scripted = HashMap::from([
    ("a1".to_string(), ScriptedRun::accepted("a1")),
    ("b1".to_string(), ScriptedRun::accepted("b1")),
  ]);
  let compare = HashMap::from([("a1".to_string(), "partially correct (0.4)\n".to_string())]);
  let runner = Arc::new(FakeRunnerTransport::with_compare(scripted, compare));

  let (outcome, _reporter) = judge(data, runner).await;

  let JudgeOutcome::Judged(result) = outcome else {
    panic!("expected a judged outcome");
  };
  assert_eq!(result.subtasks[0].score, 20.0);
  assert_eq!(result.subtasks[1].score, 40.0);
}

#[tokio::test]
async fn s5_dependency_skip_short_circuits_the_dependent() {
  let data = test_data_with_spj(vec![
    subtask(ScoringMode::Minimum, 50.0, vec![case("a1")], vec![]),
    subtask(ScoringMode::Minimum, 100.0, vec![case("b1")], vec![0]),
  ]);
  let scripted = HashMap::from([
    ("a1".to_string(), ScriptedRun::accepted("a1")),
    ("b1".to_string(), ScriptedRun::accepted("b1")),
  ]);
  let compare = HashMap::from([("a1".to_string(), "points (0)\n".to_string())]);
  let runner = Arc::new(FakeRunnerTransport::with_compare(scripted, compare));

  let (outcome, _reporter) = judge(data, runner.clone()).await;

  let JudgeOutcome::Judged(result) = outcome else {
    panic!("expected a judged outcome");
  };
  assert_eq!(result.subtasks[0].score, 0.0);
  assert_eq!(result.subtasks[1].score, 0.0);
  assert!(result.subtasks[1].cases.iter().all(|c| c.status == CaseStatus::Skipped));
  // A's primary run plus its compare dispatch; B never reaches the runner.
  assert_eq!(runner.call_count().await, 2);
}

#[tokio::test]
async fn s6_cycle_is_rejected_before_any_case_runs() {
  let data = test_data(vec![
    subtask(ScoringMode::Minimum, 50.0, vec![case("a1")], vec![1]),
    subtask(ScoringMode::Minimum, 50.0, vec![case("b1")], vec![0]),
  ]);
  let runner = Arc::new(FakeRunnerTransport::new(HashMap::new()));
  let ctx = context(data.clone(), runner.clone() as Arc<dyn RunnerTransport>);
  let judger: Arc<dyn Judger> = Arc::new(StandardJudger::new(ctx));
  let reporter = Arc::new(FakeReporter::new());

  let err = orchestrator::run(judger, &data, reporter, time_limit(), MEMORY_LIMIT)
    .await
    .unwrap_err();

  assert!(matches!(err, crate::error::JudgeError::Graph(_)));
  assert_eq!(runner.call_count().await, 0);
}

#[tokio::test]
async fn s7_diagnostics_rerun_attaches_stderr_without_changing_the_verdict() {
  let original = TestcaseDetails {
    kind: CaseType::WrongAnswer,
    time: 50,
    memory: 8192,
    scoring_rate: 0.0,
    user_error: String::new(),
    user_output: String::new(),
    spj_message: String::new(),
    system_message: String::new(),
    input: None,
    output: None,
    diagnostics: None,
  };
  let subtasks = vec![subtask(ScoringMode::Summation, 100.0, vec![case("c1")], vec![])];
  let results = Arc::new(tokio::sync::Mutex::new(vec![SubtaskResult {
    cases: vec![crate::result::CaseResult::done(original)],
    status: SubtaskStatus::Done,
    score: 0.0,
  }]));

  let eligible = diagnostics::find_eligible_case(&subtasks, &results, time_limit(), MEMORY_LIMIT)
    .await
    .expect("a WrongAnswer case within the diagnostics ceilings is eligible");
  assert_eq!(eligible, (0, 0, case("c1")));

  let scripted = HashMap::from([(
    "c1".to_string(),
    ScriptedRun::wrong_answer_with_stderr("AddressSanitizer: heap-buffer-overflow"),
  )]);
  let runner = Arc::new(FakeRunnerTransport::new(scripted));
  let ctx = context(test_data(subtasks.clone()), runner.clone() as Arc<dyn RunnerTransport>);
  let judger = StandardJudger::new(ctx);
  let reporter = Arc::new(FakeReporter::new());

  diagnostics::run_diagnostics(&judger, &results, reporter.as_ref(), 0, 0, &case("c1"))
    .await
    .unwrap();

  let guard = results.lock().await;
  let details = guard[0].cases[0].result.as_ref().unwrap();
  assert_eq!(details.kind, CaseType::WrongAnswer);
  assert_eq!(details.diagnostics.as_deref(), Some("AddressSanitizer: heap-buffer-overflow"));
}
