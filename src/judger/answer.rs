use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
  checker::CheckResult,
  compiler::{CompilationResult, ExecutableHandle},
  error::PreprocessError,
  judger::{JudgeContext, Judger},
  model::TestcaseJudge,
  result::{FilePreview, TestcaseDetails},
  runner::TransportError,
};

/// Output-only judging: the "submission" is an already-uploaded answer
/// file, not source to compile. `compile` is a no-op success; comparison happens directly.
pub struct AnswerSubmissionJudger {
  ctx: JudgeContext,
  spj_executable: RwLock<Option<ExecutableHandle>>,
}

impl AnswerSubmissionJudger {
  pub fn new(ctx: JudgeContext) -> Self {
    Self {
      ctx,
      spj_executable: RwLock::new(None),
    }
  }
}

#[async_trait]
impl Judger for AnswerSubmissionJudger {
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
    CompilationResult::Success {
      executable: ExecutableHandle(String::new()),
      message: String::new(),
    }
  }

  async fn compile_with_diagnostics(&self) -> CompilationResult {
    CompilationResult::Failure {
      message: "answer-submission problems do not support diagnostics".to_string(),
    }
  }

  fn support_diagnostics(&self) -> bool {
    false
  }

  async fn judge_testcase(
    &self,
    case: &TestcaseJudge,
    started: Box<dyn FnOnce() + Send>,
  ) -> Result<TestcaseDetails, TransportError> {
    // No runner execution: the uploaded answer is already `userOutput`. `started` still fires
    // so progress reporting observes the usual Waiting -> Running -> Done transition.
    started();

    let input_preview = self.ctx.preview.read_file_length(case.input.as_deref(), self.ctx.data_display_limit).await;
    let user_output_full = self.ctx.submission.code.clone();
    let user_output_preview = crate::preview::truncate_bytes(&user_output_full, self.ctx.data_display_limit);

    let output_full = self.ctx.preview.read_file_length(case.output.as_deref(), usize::MAX).await;
    let output_preview = crate::preview::truncate_bytes(&output_full, self.ctx.data_display_limit);

    let check = if let Some(spj) = self.spj_executable.read().await.clone() {
      // The uploaded answer itself is the thing being judged; there is no executable run to
      // produce `user_output_ref` from, so the runner resolves the answer file out-of-band via
      // `test_data_name` the same way it resolves `input_data`/`answer_data`.
      let payload = crate::runner::TaskPayload {
        test_data_name: self.ctx.test_data.name.clone(),
        input_data: case.input.clone(),
        answer_data: case.output.clone(),
        time: crate::CONFIG.judge.time_limit,
        memory: crate::CONFIG.judge.memory_limit,
        file_io_input: None,
        file_io_output: None,
        user_executable_name: String::new(),
        spj_executable_name: Some(spj.0.clone()),
        user_output_ref: None,
        interactive: false,
      };
      let compare_result = self.ctx.runner.run_task(payload, self.ctx.priority, Box::new(|| {})).await?;
      CheckResult::parse(&compare_result.stdout)
    } else {
      CheckResult::exact_match(&user_output_full, &output_full)
    };

    Ok(TestcaseDetails {
      kind: check.kind,
      time: 0,
      memory: 0,
      scoring_rate: check.scoring_rate,
      user_error: String::new(),
      user_output: user_output_preview,
      spj_message: self.ctx.truncate(&check.message),
      system_message: String::new(),
      input: case.input.as_ref().map(|n| FilePreview::new(n.clone(), &input_preview, self.ctx.data_display_limit)),
      output: case.output.as_ref().map(|n| FilePreview::new(n.clone(), &output_preview, self.ctx.data_display_limit)),
      diagnostics: None,
    })
  }

  async fn cleanup(&self) {
    *self.spj_executable.write().await = None;
  }
}
