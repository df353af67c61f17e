pub mod module_reference_visitor;
pub mod specifier;

use std::path::{Path, PathBuf};

use anyhow::Context;
use oxc::{allocator::Allocator, ast::ast::Program, ast_visit::VisitMut};

use dualpack_common::{Syntax, TargetFormat, TransformConfig};
use dualpack_ecmascript::{EcmaCompiler, EmitConfig, TransformHook};
use dualpack_error::BuildResult;
use dualpack_utils::indexmap::FxIndexSet;
use dualpack_utils::path_ext::PathExt;

use crate::transform_stage::module_reference_visitor::ModuleReferenceVisitor;

/// Installs a fresh `ModuleReferenceVisitor` for each compile call. The
/// module set outlives the hook; a new visitor borrows it per pass.
struct RewriteHook<'a> {
  extension: &'a str,
  external_modules: &'a mut FxIndexSet<String>,
}

impl TransformHook for RewriteHook<'_> {
  fn transform<'ast>(&mut self, alloc: &'ast Allocator, program: &mut Program<'ast>) {
    ModuleReferenceVisitor::new(alloc, self.extension, self.external_modules)
      .visit_program(program);
  }
}

/// The format's overrides merged over the user config: the module type is
/// always forced, CommonJS defaults to strict, and the parser syntax
/// defaults to TypeScript unless the config says otherwise.
pub fn emit_config_for(format: TargetFormat, config: &TransformConfig) -> EmitConfig {
  let module = config.module.clone().unwrap_or_default();
  let jsc = config.jsc.clone().unwrap_or_default();

  EmitConfig {
    format: format.module_format(),
    strict: match format {
      TargetFormat::CommonJs => module.strict.unwrap_or(true),
      TargetFormat::Esm => module.strict.unwrap_or(false),
    },
    syntax: jsc.parser.and_then(|parser| parser.syntax).unwrap_or(Syntax::Typescript),
    target: jsc.target.unwrap_or_default(),
  }
}

/// Compile one source file for one format and write the artifact plus its
/// source map. Returns the written paths and sizes.
pub async fn transform_file(
  source_file: &Path,
  destination_file: &Path,
  emit_config: &EmitConfig,
  extension: &str,
  external_modules: &mut FxIndexSet<String>,
) -> BuildResult<Vec<(PathBuf, usize)>> {
  let source = tokio::fs::read_to_string(source_file)
    .await
    .with_context(|| format!("Failed to read {}", source_file.display()))?;

  let mut hook = RewriteHook { extension, external_modules };
  let emitted = EcmaCompiler::compile(source_file, &source, emit_config, &mut hook)?;

  let destination_map_file = sibling_map_file(destination_file);
  let map_basename = destination_map_file
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();

  if let Some(parent) = destination_file.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }

  let code = format!("{}\n//# sourceMappingURL={map_basename}\n", emitted.code);
  tokio::fs::write(destination_file, &code)
    .await
    .with_context(|| format!("Failed to write {}", destination_file.display()))?;

  let mut written = vec![(destination_file.to_path_buf(), code.len())];

  if let Some(map) = emitted.map {
    let patched = patch_map_sources(&map, source_file, destination_file)?;
    tokio::fs::write(&destination_map_file, &patched)
      .await
      .with_context(|| format!("Failed to write {}", destination_map_file.display()))?;
    written.push((destination_map_file, patched.len()));
  }

  Ok(written)
}

/// `<artifact>.map`, appended to the full file name rather than replacing
/// its extension.
fn sibling_map_file(destination_file: &Path) -> PathBuf {
  let mut name = destination_file.as_os_str().to_owned();
  name.push(".map");
  PathBuf::from(name)
}

/// Once moved into the build tree, the emitted map's `sources[0]` would
/// point at the wrong relative location; rewrite it relative to the
/// artifact's own directory.
fn patch_map_sources(map: &str, source_file: &Path, destination_file: &Path) -> BuildResult<String> {
  let mut map: serde_json::Value = serde_json::from_str(map)?;
  let destination_dir = destination_file.parent().unwrap_or_else(|| Path::new("."));

  if let Some(first) = map
    .get_mut("sources")
    .and_then(serde_json::Value::as_array_mut)
    .and_then(|sources| sources.first_mut())
  {
    *first = serde_json::Value::String(source_file.relative_slash(destination_dir));
  }

  Ok(serde_json::to_string(&map)?)
}

/// Destination name for a source-relative path: a trailing `.ts` is dropped
/// (only `.ts`; other matched extensions keep their full name) and the
/// target extension appended.
pub fn destination_name(filename: &str, extension: &str) -> String {
  let stem = filename.strip_suffix(".ts").unwrap_or(filename);
  dualpack_utils::concat_string!(stem, extension)
}
