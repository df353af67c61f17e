use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct InputArgs {
  /// Source directory
  pub source: PathBuf,

  /// Build directory
  pub build: PathBuf,

  /// Files match pattern
  #[clap(short, long = "match", default_value = "**/*.ts")]
  pub match_pattern: String,

  /// Compile configuration path
  #[clap(short, long, default_value = ".swcrc")]
  pub swcrc: String,

  /// Ignore patterns
  #[clap(short, long, action = clap::ArgAction::Append)]
  pub ignore: Option<Vec<String>>,
}

#[derive(Args)]
pub struct OutputArgs {
  /// File extension of CommonJS files
  #[clap(long, default_value = ".cjs")]
  pub commonjs_ext: String,

  /// File extension of ESM files
  #[clap(long, default_value = ".js")]
  pub esm_ext: String,

  /// Do not generate CommonJS files
  #[clap(long)]
  pub skip_commonjs: bool,

  /// Do not generate ESM files
  #[clap(long)]
  pub skip_esm: bool,
}

#[derive(Args)]
pub struct ManifestArgs {
  /// Adjust package.json according to its main property
  #[clap(short, long)]
  pub package: bool,

  /// Copy package.json to the build directory with pruned dependencies
  #[clap(short, long)]
  pub copy: bool,
}
