use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt::Display, hash::Hash, str::FromStr};
use thiserror::Error;

use crate::CONFIG;

/// Programming language, resolved against the global language registry.
///
/// A bare name plus config lookups, the same shape as the teacher's `Lang`: cheap to clone, and a
/// `FromStr`/`Display` pair so it round-trips through JSON and CLI args identically.
#[derive(Debug, SerializeDisplay, DeserializeFromStr, Clone, PartialEq, Eq, Hash)]
pub struct Lang {
  name: String,
}

impl Lang {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn compile_cmd(&self) -> &Vec<String> {
    &CONFIG.lang[&self.name].compile_cmd
  }

  pub fn run_cmd(&self) -> &Vec<String> {
    &CONFIG.lang[&self.name].run_cmd
  }

  pub fn source(&self) -> &str {
    &CONFIG.lang[&self.name].source
  }

  pub fn exec(&self) -> &str {
    &CONFIG.lang[&self.name].exec
  }

  /// Whether an instrumented variant of this language exists.
  pub fn supports_diagnostics(&self) -> bool {
    CONFIG.lang[&self.name].diagnostics.is_some()
  }

  /// Compile command for the instrumented variant, if any.
  pub fn diagnostics_compile_cmd(&self) -> Option<&Vec<String>> {
    CONFIG.lang[&self.name]
      .diagnostics
      .as_ref()
      .map(|d| &d.compile_cmd)
  }
}

impl FromStr for Lang {
  type Err = InvalidLangError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match CONFIG.lang.get(s) {
      Some(_x) => Ok(Lang {
        name: s.to_string(),
      }),
      None => Err(Self::Err {
        lang: s.to_string(),
      }),
    }
  }
}

impl Display for Lang {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", &self.name)
  }
}

/// Error when parsing a language name which is not in global settings.
#[derive(Error, Debug, Clone)]
#[error("invalid lang: {lang}")]
pub struct InvalidLangError {
  pub lang: String,
}
