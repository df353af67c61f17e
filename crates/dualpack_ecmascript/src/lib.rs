mod ast_snippet;
mod ecma_compiler;
mod format;

pub use crate::{
  ast_snippet::AstSnippet,
  ecma_compiler::{EcmaCompiler, EmitConfig, EmittedModule, TransformHook},
};
