pub mod normalized_compiler_options;

use std::path::PathBuf;

/// Raw knobs as they arrive from the CLI (or an embedding caller). Defaults
/// are applied by `normalize_options`.
#[derive(Debug, Default, Clone)]
pub struct CompilerOptions {
  // --- Input
  pub source: PathBuf,
  pub cwd: Option<PathBuf>,
  pub match_pattern: Option<String>,
  pub ignore: Option<Vec<String>>,
  pub swcrc: Option<String>,

  // --- Output
  pub build: PathBuf,
  pub commonjs_ext: Option<String>,
  pub esm_ext: Option<String>,
  pub skip_commonjs: bool,
  pub skip_esm: bool,

  // --- Manifest
  pub package: bool,
  pub copy: bool,
}
