use std::str::FromStr;

use regex::Regex;

use crate::result::CaseType;

/// Parsed testlib-style checker output.
#[derive(Debug, PartialEq, Clone)]
pub struct CheckResult {
  pub kind: CaseType,
  pub message: String,
  pub scoring_rate: f64,
}

impl CheckResult {
  /// Parse a testlib checker's stderr.
  ///
  /// - `ok` -> Accepted, rate 1.
  /// - `wrong answer` -> WrongAnswer, rate 0.
  /// - `FAIL` -> JudgementFailed, rate 0.
  /// - `wrong output format` -> WrongAnswer, rate 0.
  /// - `partially correct (s)` / `points (s)`: `s <= 0` -> WrongAnswer/0, `s >= 1` ->
  ///   Accepted/1, else PartiallyCorrect/s.
  ///
  /// A line matching `status(...)` or `score(...)` overrides the parsed verdict, the same escape
  /// hatch the teacher's checker supports for checkers that don't speak plain testlib.
  pub fn parse(output: &str) -> Self {
    lazy_static! {
      static ref AC_PAT: Regex = Regex::new(r"(?s)\Aok\s*(.*?)\s*\z").unwrap();
      static ref WA_PAT: Regex = Regex::new(r"(?s)\Awrong answer\s*(.*?)\s*\z").unwrap();
      static ref FAIL_PAT: Regex = Regex::new(r"(?s)\AFAIL\s*(.*?)\s*\z").unwrap();
      static ref PE_PAT: Regex = Regex::new(r"(?s)\Awrong output format\s*(.*?)\s*\z").unwrap();
      static ref PC_PAT: Regex =
        Regex::new(r"(?s)\A(?:partially correct|points) \(?([0-9]*\.?[0-9]*)\)?\s*(.*?)\s*\z")
          .unwrap();
      static ref CUSTOM_PAT: Regex =
        Regex::new(r"(?m)^[ \t]*(status|score)\(([\w.]+)\)[ \t]*(.*?)\s*$").unwrap();
    }

    let mut kind = CaseType::JudgementFailed;
    let mut rate = 0.0;

    if AC_PAT.is_match(output) {
      kind = CaseType::Accepted;
      rate = 1.0;
    } else if WA_PAT.is_match(output) {
      kind = CaseType::WrongAnswer;
      rate = 0.0;
    } else if FAIL_PAT.is_match(output) {
      kind = CaseType::JudgementFailed;
      rate = 0.0;
    } else if PE_PAT.is_match(output) {
      kind = CaseType::WrongAnswer;
      rate = 0.0;
    } else if let Some(cap) = PC_PAT.captures(output) {
      if let Ok(score) = cap[1].parse::<f64>() {
        if score >= 1.0 {
          kind = CaseType::Accepted;
          rate = 1.0;
        } else if score <= 0.0 {
          kind = CaseType::WrongAnswer;
          rate = 0.0;
        } else {
          kind = CaseType::PartiallyCorrect;
          rate = score;
        }
      }
    }

    for cap in CUSTOM_PAT.captures_iter(output) {
      match &cap[1] {
        "status" => {
          if let Ok(stat) = CaseType::from_str(&cap[2]) {
            kind = stat;
          }
        }
        "score" => {
          if let Ok(s) = cap[2].parse::<f64>() {
            rate = s.clamp(0.0, 1.0);
          }
        }
        _ => {}
      }
    }

    Self {
      kind,
      scoring_rate: rate,
      message: output.chars().take(4096).collect(),
    }
  }

  /// Exact-match comparator used when a problem has no special judge: token-split equality,
  /// ignoring leading/trailing whitespace per line and trailing blank lines, the conventional
  /// "default checker" semantics most judges fall back to.
  pub fn exact_match(user_output: &str, expected: &str) -> Self {
    let normalize = |s: &str| -> Vec<&str> { s.split_whitespace().collect() };
    if normalize(user_output) == normalize(expected) {
      Self {
        kind: CaseType::Accepted,
        scoring_rate: 1.0,
        message: "ok exact match".to_string(),
      }
    } else {
      Self {
        kind: CaseType::WrongAnswer,
        scoring_rate: 0.0,
        message: "wrong answer".to_string(),
      }
    }
  }
}
