use std::path::{Path, PathBuf};

use sugar_path::SugarPath;

use dualpack_common::{CompilerOptions, NormalizedCompilerOptions};

use crate::transform_stage::specifier::{Classification, classify};

pub fn normalize_options(mut raw_options: CompilerOptions) -> NormalizedCompilerOptions {
  let cwd = raw_options
    .cwd
    .take()
    .unwrap_or_else(|| std::env::current_dir().expect("Failed to get current dir"));

  let swcrc = raw_options.swcrc.unwrap_or_else(|| ".swcrc".to_string());
  // A path-like config location is anchored to the cwd; a bare name is used
  // as given.
  let swcrc = match classify(&swcrc) {
    Classification::Local => Path::new(&swcrc).absolutize_with(&cwd),
    Classification::External => PathBuf::from(swcrc),
  };

  NormalizedCompilerOptions {
    source: raw_options.source.absolutize_with(&cwd),
    build: raw_options.build.absolutize_with(&cwd),
    cwd,
    match_pattern: raw_options.match_pattern.unwrap_or_else(|| "**/*.ts".to_string()),
    ignore: raw_options.ignore.unwrap_or_default(),
    swcrc,
    commonjs_ext: raw_options.commonjs_ext.unwrap_or_else(|| ".cjs".to_string()),
    esm_ext: raw_options.esm_ext.unwrap_or_else(|| ".js".to_string()),
    skip_commonjs: raw_options.skip_commonjs,
    skip_esm: raw_options.skip_esm,
    package: raw_options.package,
    copy: raw_options.copy,
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use dualpack_common::CompilerOptions;

  use super::normalize_options;

  #[test]
  fn applies_defaults() {
    let options = normalize_options(CompilerOptions {
      source: PathBuf::from("src"),
      build: PathBuf::from("build"),
      cwd: Some(PathBuf::from("/proj")),
      ..CompilerOptions::default()
    });

    assert_eq!(options.source, PathBuf::from("/proj/src"));
    assert_eq!(options.build, PathBuf::from("/proj/build"));
    assert_eq!(options.match_pattern, "**/*.ts");
    assert_eq!(options.swcrc, PathBuf::from("/proj/.swcrc"));
    assert_eq!(options.commonjs_ext, ".cjs");
    assert_eq!(options.esm_ext, ".js");
  }
}
