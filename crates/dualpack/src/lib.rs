mod compiler;
mod manifest_stage;
mod transform_stage;
mod utils;

pub use crate::{
  compiler::{BuildSummary, Compiler, EmittedAsset},
  transform_stage::{module_reference_visitor::ModuleReferenceVisitor, specifier},
};
pub use dualpack_common::*;
