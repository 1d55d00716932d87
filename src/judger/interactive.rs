use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
  compiler::{CompilationResult, ExecutableHandle},
  error::PreprocessError,
  judger::{JudgeContext, Judger},
  model::TestcaseJudge,
  result::{CaseType, FilePreview, TestcaseDetails},
  runner::{RunStatus, TaskPayload, TransportError},
};

/// Interactive judging: the user executable and a problem-supplied interactor
/// run as a live pair, piped to each other; the interactor's exit status and final message line
/// are the verdict.
pub struct InteractiveJudger {
  ctx: JudgeContext,
  user_executable: RwLock<Option<ExecutableHandle>>,
  interactor_executable: RwLock<Option<ExecutableHandle>>,
}

impl InteractiveJudger {
  pub fn new(ctx: JudgeContext) -> Self {
    Self {
      ctx,
      user_executable: RwLock::new(None),
      interactor_executable: RwLock::new(None),
    }
  }
}

#[async_trait]
impl Judger for InteractiveJudger {
  async fn preprocess_test_data(&self) -> Result<(), PreprocessError> {
    let interactor = self
      .ctx
      .test_data
      .spj
      .as_ref()
      .ok_or_else(|| PreprocessError("interactive problem is missing an interactor".to_string()))?;

    match self
      .ctx
      .compiler
      .compile(&interactor.code, &interactor.lang, &Default::default(), self.ctx.priority, false)
      .await
    {
      CompilationResult::Success { executable, .. } => {
        *self.interactor_executable.write().await = Some(executable);
        Ok(())
      }
      CompilationResult::Failure { message } => {
        Err(PreprocessError(format!("interactor compilation failed: {message}")))
      }
    }
  }

  async fn compile(&self) -> CompilationResult {
    let result = self
      .ctx
      .compiler
      .compile(&self.ctx.submission.code, &self.ctx.submission.lang, &Default::default(), self.ctx.priority, false)
      .await;

    if let CompilationResult::Success { ref executable, .. } = result {
      *self.user_executable.write().await = Some(executable.clone());
    }
    result
  }

  async fn compile_with_diagnostics(&self) -> CompilationResult {
    let result = self
      .ctx
      .compiler
      .compile(&self.ctx.submission.code, &self.ctx.submission.lang, &Default::default(), self.ctx.priority, true)
      .await;

    if let CompilationResult::Success { ref executable, .. } = result {
      *self.user_executable.write().await = Some(executable.clone());
    }
    result
  }

  fn support_diagnostics(&self) -> bool {
    self.ctx.submission.lang.supports_diagnostics()
  }

  async fn judge_testcase(
    &self,
    case: &TestcaseJudge,
    started: Box<dyn FnOnce() + Send>,
  ) -> Result<TestcaseDetails, TransportError> {
    let exec = self
      .user_executable
      .read()
      .await
      .clone()
      .ok_or_else(|| TransportError("judge_testcase called before a successful compile".to_string()))?;
    let interactor = self
      .interactor_executable
      .read()
      .await
      .clone()
      .ok_or_else(|| TransportError("judge_testcase called before preprocess_test_data".to_string()))?;

    let payload = TaskPayload {
      test_data_name: self.ctx.test_data.name.clone(),
      input_data: case.input.clone(),
      answer_data: case.output.clone(),
      time: self.ctx.time_limit,
      memory: self.ctx.memory_limit,
      file_io_input: None,
      file_io_output: None,
      user_executable_name: exec.0.clone(),
      spj_executable_name: Some(interactor.0.clone()),
      user_output_ref: None,
      interactive: true,
    };

    let run_result = self.ctx.runner.run_task(payload, self.ctx.priority, started).await?;

    let input_preview = self.ctx.preview.read_file_length(case.input.as_deref(), self.ctx.data_display_limit).await;

    // The interactor's final message line carries the verdict when it ran at all; a
    // non-Accepted run status short-circuits straight to the corresponding case type.
    let (kind, scoring_rate) = if run_result.status == RunStatus::Accepted {
      let check = crate::checker::CheckResult::parse(&run_result.stdout);
      (check.kind, check.scoring_rate)
    } else {
      let kind = match run_result.status {
        RunStatus::RuntimeError => CaseType::RuntimeError,
        RunStatus::TimeLimitExceeded => CaseType::TimeLimitExceeded,
        RunStatus::MemoryLimitExceeded => CaseType::MemoryLimitExceeded,
        RunStatus::OutputLimitExceeded => CaseType::OutputLimitExceeded,
        RunStatus::FileError => CaseType::InvalidInteraction,
        RunStatus::Accepted => unreachable!(),
      };
      (kind, 0.0)
    };

    Ok(TestcaseDetails {
      kind,
      time: run_result.time.as_millis() as u64,
      memory: run_result.memory,
      scoring_rate,
      user_error: self.ctx.truncate(&run_result.stderr),
      user_output: self.ctx.truncate(&run_result.stdout),
      spj_message: self.ctx.truncate(&run_result.stdout),
      system_message: String::new(),
      input: case.input.as_ref().map(|n| FilePreview::new(n.clone(), &input_preview, self.ctx.data_display_limit)),
      output: None,
      diagnostics: None,
    })
  }

  async fn cleanup(&self) {
    *self.user_executable.write().await = None;
    *self.interactor_executable.write().await = None;
  }
}
