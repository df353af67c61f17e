use std::path::Path;

use anyhow::Context;
use fast_glob::glob_match;
use walkdir::WalkDir;

use dualpack_error::BuildResult;
use dualpack_utils::path_ext::PathExt;

/// Walk `source_dir` and return the slash-normalized relative paths matching
/// `pattern` minus `ignore`, sorted for a deterministic compile order.
pub fn discover_source_files(
  source_dir: &Path,
  pattern: &str,
  ignore: &[String],
) -> BuildResult<Vec<String>> {
  let mut files = Vec::new();

  for entry in WalkDir::new(source_dir) {
    let entry =
      entry.with_context(|| format!("Failed to walk source dir {}", source_dir.display()))?;
    if !entry.file_type().is_file() {
      continue;
    }

    let relative = entry.path().strip_prefix(source_dir).unwrap_or(entry.path()).expect_to_slash();
    if !glob_match(pattern, &relative) {
      continue;
    }
    if ignore.iter().any(|ignored| glob_match(ignored, &relative)) {
      continue;
    }

    files.push(relative);
  }

  files.sort_unstable();
  Ok(files)
}

#[cfg(test)]
mod tests {
  use super::discover_source_files;

  fn fixture_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("nested")).unwrap();
    std::fs::create_dir_all(dir.path().join("__tests__")).unwrap();
    std::fs::write(dir.path().join("index.ts"), "").unwrap();
    std::fs::write(dir.path().join("nested/util.ts"), "").unwrap();
    std::fs::write(dir.path().join("__tests__/util.ts"), "").unwrap();
    std::fs::write(dir.path().join("readme.md"), "").unwrap();
    dir
  }

  #[test]
  fn matches_pattern_recursively() {
    let dir = fixture_tree();
    let files = discover_source_files(dir.path(), "**/*.ts", &[]).unwrap();
    assert_eq!(files, ["__tests__/util.ts", "index.ts", "nested/util.ts"]);
  }

  #[test]
  fn honors_ignore_patterns() {
    let dir = fixture_tree();
    let files =
      discover_source_files(dir.path(), "**/*.ts", &["**/__tests__/**".to_string()]).unwrap();
    assert_eq!(files, ["index.ts", "nested/util.ts"]);
  }
}
