use async_trait::async_trait;

/// The seam the core drives to read a truncated preview of an input/output/answer file.
///
/// A null `path` (e.g. a generated-input or output-only case with nothing on disk) reads as the
/// empty string rather than erroring — callers don't need to special-case it.
#[async_trait]
pub trait PreviewReader: Send + Sync {
  async fn read_file_length(&self, path: Option<&str>, limit: usize) -> String;
}

/// Reference implementation backed by the local filesystem, rooted at `TestData`/`TempDirectory`.
/// Truncates by byte length on a UTF-8 boundary, matching the teacher's `limit_str` pattern
/// of truncating captured program/checker output for display.
pub struct FsPreviewReader {
  pub root: std::path::PathBuf,
}

#[async_trait]
impl PreviewReader for FsPreviewReader {
  async fn read_file_length(&self, path: Option<&str>, limit: usize) -> String {
    let Some(path) = path else {
      return String::new();
    };

    let full_path = self.root.join(path);
    let content = match tokio::fs::read(&full_path).await {
      Ok(bytes) => bytes,
      Err(err) => {
        log::warn!("failed to read preview file {}: {}", full_path.display(), err);
        return String::new();
      }
    };

    let text = String::from_utf8_lossy(&content);
    truncate_bytes(&text, limit)
  }
}

/// Truncate `s` to at most `limit` bytes, backing off to the nearest preceding UTF-8 character
/// boundary rather than splitting a multi-byte codepoint.
pub(crate) fn truncate_bytes(s: &str, limit: usize) -> String {
  if s.len() <= limit {
    return s.to_string();
  }
  let mut end = limit;
  while end > 0 && !s.is_char_boundary(end) {
    end -= 1;
  }
  s[..end].to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncate_bytes_respects_utf8_boundaries() {
    let s = "na\u{00ef}ve";
    assert_eq!(truncate_bytes(s, 3), "na");
    assert_eq!(truncate_bytes(s, 4), "na\u{00ef}");
    assert_eq!(truncate_bytes(s, 100), s);
  }
}
