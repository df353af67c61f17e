mod compiler_options;
mod package_json;
mod target_format;
mod transform_config;

pub use crate::{
  compiler_options::{CompilerOptions, normalized_compiler_options::NormalizedCompilerOptions},
  package_json::{ExportMap, OutputManifest, PackageJson},
  target_format::TargetFormat,
  transform_config::{
    EsTarget, JscConfig, ModuleConfig, ModuleFormat, ParserConfig, Syntax, TransformConfig,
  },
};
