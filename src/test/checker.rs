use crate::{checker::CheckResult, result::CaseType};

#[test]
fn parses_ok() {
  let r = CheckResult::parse("ok you win\n3 steps.");
  assert_eq!(r.kind, CaseType::Accepted);
  assert_eq!(r.scoring_rate, 1.0);
}

#[test]
fn parses_wrong_answer() {
  let r = CheckResult::parse("wrong answer you lose\n12 steps.");
  assert_eq!(r.kind, CaseType::WrongAnswer);
  assert_eq!(r.scoring_rate, 0.0);
}

#[test]
fn parses_fail() {
  let r = CheckResult::parse("FAIL checker crashed");
  assert_eq!(r.kind, CaseType::JudgementFailed);
}

#[test]
fn parses_wrong_output_format() {
  let r = CheckResult::parse("wrong output format \t \textra spaces\n\t\t");
  assert_eq!(r.kind, CaseType::WrongAnswer);
}

#[test]
fn parses_partially_correct_in_between() {
  let r = CheckResult::parse("points 0.12 you used 12 / 100 moves");
  assert_eq!(r.kind, CaseType::PartiallyCorrect);
  assert_eq!(r.scoring_rate, 0.12);
}

#[test]
fn partially_correct_clamps_to_accepted_at_one() {
  let r = CheckResult::parse("partially correct (1) full marks");
  assert_eq!(r.kind, CaseType::Accepted);
  assert_eq!(r.scoring_rate, 1.0);
}

#[test]
fn partially_correct_clamps_to_wrong_answer_at_zero() {
  let r = CheckResult::parse("points (0) no marks");
  assert_eq!(r.kind, CaseType::WrongAnswer);
  assert_eq!(r.scoring_rate, 0.0);
}

#[test]
fn custom_status_and_score_override_the_parsed_verdict() {
  let r = CheckResult::parse("status(time_limit_exceeded)\nscore(1)");
  assert_eq!(r.kind, CaseType::TimeLimitExceeded);
  assert_eq!(r.scoring_rate, 1.0);
}

#[test]
fn exact_match_ignores_whitespace_layout() {
  let r = CheckResult::exact_match("1 2   3\n", "1 2 3");
  assert_eq!(r.kind, CaseType::Accepted);
  assert_eq!(r.scoring_rate, 1.0);
}

#[test]
fn exact_match_rejects_differing_tokens() {
  let r = CheckResult::exact_match("1 2 3", "1 2 4");
  assert_eq!(r.kind, CaseType::WrongAnswer);
  assert_eq!(r.scoring_rate, 0.0);
}
