use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time};

use crate::ARGS;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
/// Judge daemon config.
pub struct Cfg {
  /// Submission source, out of core scope.
  pub server_url: String,

  /// Submission source auth, out of core scope.
  pub server_token: Option<String>,

  /// Runner transport endpoint, out of core scope.
  pub rabbit_mq_url: String,

  /// Runner transport endpoint, out of core scope.
  pub redis_url: String,

  /// Root directory of test-data packages.
  pub test_data: String,

  /// Default RPC priority passed through to the runner transport.
  pub priority: i32,

  /// Scratch space for preview reads and compile artifacts.
  pub temp_directory: String,

  /// Byte cap for `input.content`/`output.content` previews.
  pub data_display_limit: usize,

  pub diagnostics: DiagnosticsCfg,

  pub lang: HashMap<String, LangCfg>,

  pub judge: JudgeCfg,
}

impl Default for Cfg {
  fn default() -> Self {
    Self {
      server_url: "http://localhost:8080".to_string(),
      server_token: None,
      rabbit_mq_url: "amqp://localhost:5672".to_string(),
      redis_url: "redis://localhost:6379".to_string(),
      test_data: "/var/lib/judge/testdata".to_string(),
      priority: 0,
      temp_directory: "/tmp/judge".to_string(),
      data_display_limit: 4096,
      diagnostics: DiagnosticsCfg::default(),
      lang: HashMap::from([
        (
          "c".to_string(),
          LangCfg {
            compile_cmd: ["/usr/bin/gcc", "foo.c", "-o", "foo", "-O2", "-w", "-DONLINE_JUDGE"]
              .iter()
              .map(|&s| s.into())
              .collect(),
            run_cmd: vec!["foo".to_string()],
            source: "foo.c".to_string(),
            exec: "foo".to_string(),
            diagnostics: None,
          },
        ),
        (
          "cpp".to_string(),
          LangCfg {
            compile_cmd: [
              "/usr/bin/g++",
              "foo.cpp",
              "-o",
              "foo",
              "-O2",
              "-w",
              "-DONLINE_JUDGE",
            ]
            .iter()
            .map(|&s| s.into())
            .collect(),
            run_cmd: vec!["foo".to_string()],
            source: "foo.cpp".to_string(),
            exec: "foo".to_string(),
            diagnostics: Some(DiagnosticsLangCfg {
              compile_cmd: [
                "/usr/bin/g++",
                "foo.cpp",
                "-o",
                "foo",
                "-Og",
                "-g",
                "-fsanitize=address,undefined",
                "-DONLINE_JUDGE",
              ]
              .iter()
              .map(|&s| s.into())
              .collect(),
            }),
          },
        ),
      ]),
      judge: JudgeCfg {
        env: vec![
          "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin".to_string(),
          "HOME=/w".to_string(),
          "ONLINE_JUDGE=true".to_string(),
        ],
        time_limit: time::Duration::from_secs(10),
        memory_limit: 1024 * 1024 * 1024,
        process_limit: 16,
      },
    }
  }
}

/// Diagnostics eligibility limits.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DiagnosticsCfg {
  pub enabled: bool,

  /// Eligibility time ceiling is `min(max_time_ratio * case.time_limit, max_time)`, in ms.
  pub max_time_ratio: f64,
  pub max_time: u64,

  /// Eligibility memory ceiling is `min(max_memory_ratio * case.memory_limit_mib * 1024,
  /// max_memory)`, in KiB.
  pub max_memory_ratio: f64,
  pub max_memory: u64,
}

impl Default for DiagnosticsCfg {
  fn default() -> Self {
    Self {
      enabled: false,
      max_time_ratio: 2.0,
      max_time: 10_000,
      max_memory_ratio: 2.0,
      max_memory: 2 * 1024 * 1024,
    }
  }
}

/// Instrumented-variant compile command, used only by the diagnostics driver.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiagnosticsLangCfg {
  pub compile_cmd: Vec<String>,
}

/// Programming language config.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LangCfg {
  pub compile_cmd: Vec<String>,

  pub run_cmd: Vec<String>,

  /// Name of source file.
  pub source: String,

  /// Name of executable file.
  pub exec: String,

  /// Instrumented variant for diagnostics reruns, if the language supports it.
  pub diagnostics: Option<DiagnosticsLangCfg>,
}

/// Judge-wide defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JudgeCfg {
  /// Environment variables passed to every compiled/run program.
  pub env: Vec<String>,

  /// Default CPU time limit for non-solution programs (checkers, interactors, spj).
  pub time_limit: time::Duration,

  /// Default memory limit for non-solution programs, in bytes.
  pub memory_limit: u64,

  /// Default process count limit.
  pub process_limit: u64,
}

impl Cfg {
  /// Create and load the config.
  pub fn load(search_paths: &Vec<String>) -> Self {
    let mut builder = config::Config::builder()
      .add_source(config::File::with_name("/etc/judge-core/config").required(false));

    for p in search_paths {
      builder = builder.add_source(config::File::with_name(p.as_str()).required(false));
    }

    builder = builder.add_source(config::Environment::with_prefix("JUDGE").separator("_"));

    builder.build().unwrap().try_deserialize::<Self>().unwrap()
  }
}

lazy_static! {
  /// Global config, read-only after process start.
  pub static ref CONFIG: Cfg = Cfg::load(&ARGS.config_search_path);
}
