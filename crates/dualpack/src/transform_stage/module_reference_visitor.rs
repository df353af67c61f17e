use oxc::{
  allocator::Allocator,
  ast::{AstBuilder, ast},
  ast_visit::{VisitMut, walk_mut},
};

use dualpack_utils::indexmap::FxIndexSet;

use crate::transform_stage::specifier::{
  Classification, classify, package_name_of, rewrite_extension,
};

/// Rewrites local module references to this pass's target extension and
/// records the package name of every external static reference.
///
/// One instance serves a single file/format pass. The accumulated module set
/// is owned by the driver and lent per pass, so the CommonJS and ESM passes
/// never share state. External dynamic-import arguments are not recorded;
/// only static sources contribute to the module set.
pub struct ModuleReferenceVisitor<'me, 'ast> {
  builder: AstBuilder<'ast>,
  extension: &'me str,
  external_modules: &'me mut FxIndexSet<String>,
}

impl<'me, 'ast> ModuleReferenceVisitor<'me, 'ast> {
  pub fn new(
    alloc: &'ast Allocator,
    extension: &'me str,
    external_modules: &'me mut FxIndexSet<String>,
  ) -> Self {
    Self { builder: AstBuilder::new(alloc), extension, external_modules }
  }

  /// Rewrite a local reference in place. The literal's raw text is
  /// regenerated alongside the value so the printer never emits a stale one.
  fn rewrite_local(&mut self, lit: &mut ast::StringLiteral<'ast>) {
    let rewritten = rewrite_extension(lit.value.as_str(), self.extension);
    if rewritten != lit.value.as_str() {
      lit.raw = Some(self.builder.atom(&serde_json::to_string(&rewritten).unwrap()));
      lit.value = self.builder.atom(&rewritten);
    }
  }

  fn visit_static_source(&mut self, lit: &mut ast::StringLiteral<'ast>) {
    match classify(lit.value.as_str()) {
      Classification::Local => self.rewrite_local(lit),
      Classification::External => {
        self.external_modules.insert(package_name_of(lit.value.as_str()));
      }
    }
  }
}

impl<'ast> VisitMut<'ast> for ModuleReferenceVisitor<'_, 'ast> {
  fn visit_import_declaration(&mut self, decl: &mut ast::ImportDeclaration<'ast>) {
    if decl.import_kind.is_value() {
      self.visit_static_source(&mut decl.source);
    }
    walk_mut::walk_import_declaration(self, decl);
  }

  fn visit_export_named_declaration(&mut self, decl: &mut ast::ExportNamedDeclaration<'ast>) {
    if decl.export_kind.is_value() {
      if let Some(source) = &mut decl.source {
        self.visit_static_source(source);
      }
    }
    walk_mut::walk_export_named_declaration(self, decl);
  }

  fn visit_export_all_declaration(&mut self, decl: &mut ast::ExportAllDeclaration<'ast>) {
    if decl.export_kind.is_value() {
      self.visit_static_source(&mut decl.source);
    }
    walk_mut::walk_export_all_declaration(self, decl);
  }

  fn visit_import_expression(&mut self, expr: &mut ast::ImportExpression<'ast>) {
    if let ast::Expression::StringLiteral(lit) = &mut expr.source {
      if classify(lit.value.as_str()) == Classification::Local {
        self.rewrite_local(lit);
      }
    }
    walk_mut::walk_import_expression(self, expr);
  }

  // Type positions carry no rewritable references.
  fn visit_ts_type(&mut self, _it: &mut ast::TSType<'ast>) {}
}
