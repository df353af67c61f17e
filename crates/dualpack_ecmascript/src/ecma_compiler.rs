use std::path::Path;

use dualpack_common::{EsTarget, ModuleFormat, Syntax};
use dualpack_error::BuildResult;
use oxc::{
  allocator::Allocator,
  ast::ast::Program,
  codegen::{Codegen, CodegenOptions},
  parser::Parser,
  semantic::SemanticBuilder,
  span::SourceType,
  transformer::{ESTarget as OxcEsTarget, TransformOptions, Transformer},
};

use crate::format::cjs::CjsModuleFinalizer;

/// Settings for one compilation pass: the user config merged with the target
/// format's overrides.
#[derive(Debug, Clone)]
pub struct EmitConfig {
  pub format: ModuleFormat,
  pub strict: bool,
  pub syntax: Syntax,
  pub target: EsTarget,
}

pub struct EmittedModule {
  pub code: String,
  /// Serialized source map JSON.
  pub map: Option<String>,
}

/// Installed by the caller to mutate the parsed program before lowering runs.
pub trait TransformHook {
  fn transform<'ast>(&mut self, alloc: &'ast Allocator, program: &mut Program<'ast>);
}

pub struct EcmaCompiler;

impl EcmaCompiler {
  /// Compile one source file for one target format:
  /// parse -> hook -> TypeScript lowering -> (CommonJS finalize) -> print.
  ///
  /// Each call parses from scratch, so the two format passes of a file never
  /// share a tree.
  pub fn compile(
    source_path: &Path,
    source: &str,
    config: &EmitConfig,
    hook: &mut dyn TransformHook,
  ) -> BuildResult<EmittedModule> {
    let alloc = Allocator::default();
    let source_type = match config.syntax {
      Syntax::Typescript => SourceType::default().with_module(true).with_typescript(true),
      Syntax::Ecmascript => SourceType::default().with_module(true),
    };

    let ret = Parser::new(&alloc, source, source_type).parse();
    if !ret.errors.is_empty() {
      Err(anyhow::anyhow!("Failed to parse {}, got: {:?}", source_path.display(), ret.errors))?;
    }
    let mut program = ret.program;

    hook.transform(&alloc, &mut program);

    let semantic_ret = SemanticBuilder::new().build(&program);
    if !semantic_ret.errors.is_empty() {
      Err(anyhow::anyhow!(
        "Failed to analyze {}, got: {:?}",
        source_path.display(),
        semantic_ret.errors
      ))?;
    }
    let scoping = semantic_ret.semantic.into_scoping();

    let options = TransformOptions::from(oxc_es_target(config.target));
    let transformer_ret =
      Transformer::new(&alloc, source_path, &options).build_with_scoping(scoping, &mut program);
    if !transformer_ret.errors.is_empty() {
      Err(anyhow::anyhow!(
        "Failed to transform {}, got: {:?}",
        source_path.display(),
        transformer_ret.errors
      ))?;
    }

    if config.format == ModuleFormat::CommonJs {
      CjsModuleFinalizer::new(&alloc, config.strict).finalize(&mut program);
    }

    let ret = Codegen::new()
      .with_options(CodegenOptions {
        source_map_path: Some(source_path.to_path_buf()),
        ..CodegenOptions::default()
      })
      .build(&program);

    Ok(EmittedModule { code: ret.code, map: ret.map.map(|map| map.to_json_string()) })
  }
}

fn oxc_es_target(target: EsTarget) -> OxcEsTarget {
  match target {
    EsTarget::Es5 => OxcEsTarget::ES5,
    EsTarget::Es2015 => OxcEsTarget::ES2015,
    EsTarget::Es2016 => OxcEsTarget::ES2016,
    EsTarget::Es2017 => OxcEsTarget::ES2017,
    EsTarget::Es2018 => OxcEsTarget::ES2018,
    EsTarget::Es2019 => OxcEsTarget::ES2019,
    EsTarget::Es2020 => OxcEsTarget::ES2020,
    EsTarget::Es2021 => OxcEsTarget::ES2021,
    EsTarget::Es2022 => OxcEsTarget::ES2022,
    EsTarget::Es2023 => OxcEsTarget::ES2023,
    EsTarget::Es2024 => OxcEsTarget::ES2024,
    EsTarget::EsNext => OxcEsTarget::ESNext,
  }
}
