use std::path::Path;

use dualpack_utils::path_ext::{PathExt, dot_extension};

/// Whether a module reference names a file in the project tree or an
/// external package. Purely lexical; the filesystem is never consulted, so a
/// reference to a missing local file still classifies `Local` and surfaces
/// later as a broken output reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
  Local,
  External,
}

pub fn classify(reference: &str) -> Classification {
  if reference.starts_with('.') || reference.starts_with('/') {
    Classification::Local
  } else {
    Classification::External
  }
}

/// The package an external reference resolves through: its first path
/// segment, or the first two for `@scope/name` packages. Subpath imports of
/// the same package all map to one name.
pub fn package_name_of(reference: &str) -> String {
  let segments = if reference.starts_with('@') { 2 } else { 1 };
  reference.split('/').take(segments).collect::<Vec<_>>().join("/")
}

/// Extensions eligible for rewriting. Anything else (`.json`, `.css`, ...)
/// is an asset reference and must pass through untouched.
pub const REWRITABLE_EXTENSIONS: [&str; 7] = ["", ".js", ".cjs", ".mjs", ".ts", ".cts", ".mts"];

/// Replace a local reference's extension with `target_extension`, keeping
/// directory and base name. Unrecognized extensions are left alone.
pub fn rewrite_extension(reference: &str, target_extension: &str) -> String {
  let path = Path::new(reference);
  if REWRITABLE_EXTENSIONS.contains(&dot_extension(path).as_ref()) {
    path.with_extension(target_extension.trim_start_matches('.')).expect_to_slash()
  } else {
    reference.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::{Classification, classify, package_name_of, rewrite_extension};

  #[test]
  fn classifies_paths_as_local() {
    assert_eq!(classify("/test"), Classification::Local);
    assert_eq!(classify("./test"), Classification::Local);
    assert_eq!(classify("../test"), Classification::Local);
    assert_eq!(classify(".test"), Classification::Local);
  }

  #[test]
  fn classifies_bare_specifiers_as_external() {
    assert_eq!(classify("test"), Classification::External);
    assert_eq!(classify("@scope/pkg"), Classification::External);
    assert_eq!(classify("lodash/debounce"), Classification::External);
  }

  #[test]
  fn derives_package_names() {
    assert_eq!(package_name_of("@scope/pkg/sub"), "@scope/pkg");
    assert_eq!(package_name_of("lodash/debounce"), "lodash");
    assert_eq!(package_name_of("react"), "react");
  }

  #[test]
  fn rewrites_recognized_extensions() {
    assert_eq!(rewrite_extension("./a/b.ts", ".mjs"), "./a/b.mjs");
    assert_eq!(rewrite_extension("./helper", ".cjs"), "./helper.cjs");
    assert_eq!(rewrite_extension("../x.mts", ".js"), "../x.js");
    assert_eq!(rewrite_extension("/abs/file.cts", ".cjs"), "/abs/file.cjs");
  }

  #[test]
  fn leaves_asset_references_alone() {
    assert_eq!(rewrite_extension("./a/b.json", ".mjs"), "./a/b.json");
    assert_eq!(rewrite_extension("./styles.css", ".cjs"), "./styles.css");
  }

  #[test]
  fn rewriting_is_idempotent() {
    let once = rewrite_extension("./a/b.ts", ".mjs");
    assert_eq!(rewrite_extension(&once, ".mjs"), once);
  }
}
