use std::{borrow::Cow, path::Path};

use sugar_path::SugarPath;

pub trait PathExt {
  fn expect_to_slash(&self) -> String;

  fn relative_slash(&self, base: impl AsRef<Path>) -> String;
}

impl PathExt for Path {
  fn expect_to_slash(&self) -> String {
    self
      .to_slash()
      .unwrap_or_else(|| panic!("Failed to convert {:?} to slash str", self.display()))
      .into_owned()
  }

  /// The path rewritten relative to `base`, slash-separated. Used for
  /// source-map `sources` entries and manifest `files` entries.
  fn relative_slash(&self, base: impl AsRef<Path>) -> String {
    self.relative(base).as_path().to_slash_lossy().into_owned()
  }
}

/// The trailing extension including its dot (`""` when there is none),
/// matching the `ext` component of Node's `path.parse`.
pub fn dot_extension(path: &Path) -> Cow<str> {
  match path.extension() {
    Some(ext) => Cow::Owned(format!(".{}", ext.to_string_lossy())),
    None => Cow::Borrowed(""),
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::{PathExt, dot_extension};

  #[test]
  fn test_relative_slash() {
    assert_eq!(Path::new("/a/src/index.ts").relative_slash("/a/build"), "../src/index.ts");
  }

  #[test]
  fn test_dot_extension() {
    assert_eq!(dot_extension(Path::new("./a/b.ts")), ".ts");
    assert_eq!(dot_extension(Path::new("./a/b")), "");
    assert_eq!(dot_extension(Path::new("./.test")), "");
  }
}
