use async_trait::async_trait;
use std::collections::HashMap;

use crate::lang::Lang;

/// Opaque handle to a compiled executable, as returned by the compiler service.
///
/// The core never inspects this beyond holding and forwarding it to `RunnerTransport`.
#[derive(Debug, Clone)]
pub struct ExecutableHandle(pub String);

/// Outcome of `CompilerService::compile`.
#[derive(Debug, Clone)]
pub enum CompilationResult {
  Success {
    executable: ExecutableHandle,
    message: String,
  },
  Failure {
    message: String,
  },
}

impl CompilationResult {
  pub fn is_success(&self) -> bool {
    matches!(self, Self::Success { .. })
  }
}

/// The seam the core drives to compile user/special-judge/interactor source.
///
/// `extras` are extra attached files (e.g. `TestData::extra_source_files` for the submission's
/// language) copied alongside the source before compilation. `diagnostics` selects the language's
/// instrumented variant when `true`; callers must first check `Lang::supports_diagnostics`.
#[async_trait]
pub trait CompilerService: Send + Sync {
  async fn compile(
    &self,
    source: &str,
    lang: &Lang,
    extras: &HashMap<String, String>,
    priority: i32,
    diagnostics: bool,
  ) -> CompilationResult;
}
