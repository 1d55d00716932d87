use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
  checker::CheckResult,
  compiler::{CompilationResult, ExecutableHandle},
  error::PreprocessError,
  judger::{JudgeContext, Judger},
  model::TestcaseJudge,
  result::{CaseType, FilePreview, TestcaseDetails},
  runner::{RunStatus, TaskPayload, TransportError},
};

/// Batch/traditional judging: run the compiled submission against a case's
/// input, then compare its output against the expected output, either byte/token-exact or via a
/// compiled special judge.
pub struct StandardJudger {
  ctx: JudgeContext,
  user_executable: RwLock<Option<ExecutableHandle>>,
  spj_executable: RwLock<Option<ExecutableHandle>>,
}

impl StandardJudger {
  pub fn new(ctx: JudgeContext) -> Self {
    Self {
      ctx,
      user_executable: RwLock::new(None),
      spj_executable: RwLock::new(None),
    }
  }

  fn run_status_to_case(status: RunStatus) -> CaseType {
    match status {
      RunStatus::Accepted => CaseType::Accepted,
      RunStatus::RuntimeError => CaseType::RuntimeError,
      RunStatus::TimeLimitExceeded => CaseType::TimeLimitExceeded,
      RunStatus::MemoryLimitExceeded => CaseType::MemoryLimitExceeded,
      RunStatus::OutputLimitExceeded => CaseType::OutputLimitExceeded,
      RunStatus::FileError => CaseType::FileError,
    }
  }
}

#[async_trait]
impl Judger for StandardJudger {
  async fn preprocess_test_data(&self) -> Result<(), PreprocessError> {
    let Some(spj) = &self.ctx.test_data.spj else {
      return Ok(());
    };

    match self
      .ctx
      .compiler
      .compile(&spj.code, &spj.lang, &Default::default(), self.ctx.priority, false)
      .await
    {
      CompilationResult::Success { executable, .. } => {
        *self.spj_executable.write().await = Some(executable);
        Ok(())
      }
      CompilationResult::Failure { message } => {
        Err(PreprocessError(format!("special judge compilation failed: {message}")))
      }
    }
  }

  async fn compile(&self) -> CompilationResult {
    let extras = self
      .ctx
      .test_data
      .extra_source_files
      .get(self.ctx.submission.lang.name())
      .cloned()
      .unwrap_or_default();
    let extras = extras.into_iter().map(|name| (name.clone(), name)).collect();

    let result = self
      .ctx
      .compiler
      .compile(&self.ctx.submission.code, &self.ctx.submission.lang, &extras, self.ctx.priority, false)
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

    let run_payload = TaskPayload {
      test_data_name: self.ctx.test_data.name.clone(),
      input_data: case.input.clone(),
      answer_data: None,
      time: self.ctx.time_limit,
      memory: self.ctx.memory_limit,
      file_io_input: None,
      file_io_output: None,
      user_executable_name: exec.0.clone(),
      spj_executable_name: None,
      user_output_ref: None,
      interactive: false,
    };

    let run_result = self.ctx.runner.run_task(run_payload, self.ctx.priority, started).await?;

    let input_preview = self.ctx.preview.read_file_length(case.input.as_deref(), self.ctx.data_display_limit).await;

    // Full-fidelity read for the exact-match comparator below; the *preview* shown in
    // `TestcaseDetails.output` is still truncated to the display limit.
    let output_full = self.ctx.preview.read_file_length(case.output.as_deref(), usize::MAX).await;
    let output_preview = crate::preview::truncate_bytes(&output_full, self.ctx.data_display_limit);

    if run_result.status != RunStatus::Accepted {
      return Ok(TestcaseDetails {
        kind: Self::run_status_to_case(run_result.status),
        time: run_result.time.as_millis() as u64,
        memory: run_result.memory,
        scoring_rate: 0.0,
        user_error: self.ctx.truncate(&run_result.stderr),
        user_output: self.ctx.truncate(&run_result.stdout),
        spj_message: String::new(),
        system_message: String::new(),
        input: case.input.as_ref().map(|n| FilePreview::new(n.clone(), &input_preview, self.ctx.data_display_limit)),
        output: case.output.as_ref().map(|n| FilePreview::new(n.clone(), &output_preview, self.ctx.data_display_limit)),
        diagnostics: None,
      });
    }

    let check = if let Some(spj) = self.spj_executable.read().await.clone() {
      let compare_payload = TaskPayload {
        test_data_name: self.ctx.test_data.name.clone(),
        input_data: case.input.clone(),
        answer_data: case.output.clone(),
        time: crate::CONFIG.judge.time_limit,
        memory: crate::CONFIG.judge.memory_limit,
        file_io_input: None,
        file_io_output: None,
        user_executable_name: exec.0.clone(),
        spj_executable_name: Some(spj.0.clone()),
        user_output_ref: run_result.output_ref.clone(),
        interactive: false,
      };
      let compare_result = self.ctx.runner.run_task(compare_payload, self.ctx.priority, Box::new(|| {})).await?;
      CheckResult::parse(&compare_result.stdout)
    } else {
      CheckResult::exact_match(&run_result.stdout, &output_full)
    };

    Ok(TestcaseDetails {
      kind: check.kind,
      time: run_result.time.as_millis() as u64,
      memory: run_result.memory,
      scoring_rate: check.scoring_rate,
      user_error: self.ctx.truncate(&run_result.stderr),
      user_output: self.ctx.truncate(&run_result.stdout),
      spj_message: self.ctx.truncate(&check.message),
      system_message: String::new(),
      input: case.input.as_ref().map(|n| FilePreview::new(n.clone(), &input_preview, self.ctx.data_display_limit)),
      output: case.output.as_ref().map(|n| FilePreview::new(n.clone(), &output_preview, self.ctx.data_display_limit)),
      diagnostics: None,
    })
  }

  async fn cleanup(&self) {
    *self.user_executable.write().await = None;
    *self.spj_executable.write().await = None;
  }
}
