use oxc::{
  allocator::Allocator,
  ast::ast::{
    self, Declaration, ExportDefaultDeclarationKind, Expression, ImportDeclarationSpecifier,
    ModuleExportName, Program, Statement,
  },
  parser::Parser,
  span::{SPAN, SourceType},
};
use rustc_hash::FxHashSet;

use dualpack_utils::ecmascript::legitimize_identifier_name;

use crate::ast_snippet::AstSnippet;

const ES_MODULE_MARKER: &str =
  r#"Object.defineProperty(exports, "__esModule", { value: true });"#;

const TO_ESM_HELPER: &str = r#"var __toESM = function(mod) {
  if (mod && mod.__esModule) return mod;
  var target = { "default": mod };
  for (var key in mod) if (key !== "default") target[key] = mod[key];
  return target;
};"#;

const RE_EXPORT_HELPER: &str = r#"var __reExport = function(target, mod) {
  for (var key in mod)
    if (key !== "default" && !Object.prototype.hasOwnProperty.call(target, key))
      target[key] = mod[key];
  return target;
};"#;

/// Lowers a lowered-to-JS module's ESM syntax to `require`/`exports` form.
/// Runs only for the CommonJS pass, after the TypeScript pass has stripped
/// type-only declarations. Dynamic `import()` is left untouched; Node
/// supports it inside CommonJS modules.
pub struct CjsModuleFinalizer<'ast> {
  snippet: AstSnippet<'ast>,
  strict: bool,
  used_binding_names: FxHashSet<String>,
  has_exports: bool,
  needs_to_esm: bool,
  needs_re_export: bool,
}

impl<'ast> CjsModuleFinalizer<'ast> {
  pub fn new(alloc: &'ast Allocator, strict: bool) -> Self {
    Self {
      snippet: AstSnippet::new(alloc),
      strict,
      used_binding_names: FxHashSet::default(),
      has_exports: false,
      needs_to_esm: false,
      needs_re_export: false,
    }
  }

  pub fn finalize(mut self, program: &mut Program<'ast>) {
    let body = std::mem::replace(&mut program.body, self.snippet.builder.vec());
    let mut lowered = self.snippet.builder.vec_with_capacity(body.len());

    for stmt in body {
      match stmt {
        Statement::ImportDeclaration(decl) => self.lower_import(decl.unbox(), &mut lowered),
        Statement::ExportNamedDeclaration(decl) => {
          self.lower_export_named(decl.unbox(), &mut lowered);
        }
        Statement::ExportAllDeclaration(decl) => self.lower_export_all(&decl, &mut lowered),
        Statement::ExportDefaultDeclaration(decl) => {
          self.lower_export_default(decl.unbox(), &mut lowered);
        }
        stmt => lowered.push(stmt),
      }
    }

    let mut prologue = Vec::new();
    if self.has_exports {
      prologue.extend(self.parsed_statements(ES_MODULE_MARKER));
    }
    if self.needs_to_esm {
      prologue.extend(self.parsed_statements(TO_ESM_HELPER));
    }
    if self.needs_re_export {
      prologue.extend(self.parsed_statements(RE_EXPORT_HELPER));
    }

    program.body = if prologue.is_empty() {
      lowered
    } else {
      self.snippet.builder.vec_from_iter(prologue.into_iter().chain(lowered))
    };

    if self.strict && !program.directives.iter().any(|d| d.directive == "use strict") {
      program.directives.insert(0, self.snippet.use_strict_directive());
    }
  }

  /// Parse a fixed helper snippet into statements owned by this program's
  /// allocator, so they can be spliced straight into the body.
  fn parsed_statements(&self, source: &'static str) -> oxc::allocator::Vec<'ast, Statement<'ast>> {
    let ret = Parser::new(self.snippet.alloc(), source, SourceType::default()).parse();
    debug_assert!(ret.errors.is_empty(), "helper snippet must parse: {:?}", ret.errors);
    ret.program.body
  }

  fn binding_name(&mut self, source: &str) -> String {
    let base = legitimize_identifier_name(source);
    let mut name = base.clone();
    let mut index = 1;
    while !self.used_binding_names.insert(name.clone()) {
      name = format!("{base}{index}");
      index += 1;
    }
    name
  }

  fn require_expr(&mut self, source: &str, interop: bool) -> Expression<'ast> {
    let require = self.snippet.require_call_expr(source);
    if interop {
      self.needs_to_esm = true;
      self.snippet.call_expr_with_arg_expr("__toESM", require)
    } else {
      require
    }
  }

  fn lower_import(
    &mut self,
    decl: ast::ImportDeclaration<'ast>,
    out: &mut oxc::allocator::Vec<'ast, Statement<'ast>>,
  ) {
    let source = decl.source.value.as_str();
    let Some(specifiers) = decl.specifiers else {
      out.push(self.snippet.expr_stmt(self.snippet.require_call_expr(source)));
      return;
    };
    if specifiers.is_empty() {
      out.push(self.snippet.expr_stmt(self.snippet.require_call_expr(source)));
      return;
    }

    let needs_interop = specifiers.iter().any(|specifier| {
      matches!(
        specifier,
        ImportDeclarationSpecifier::ImportDefaultSpecifier(_)
          | ImportDeclarationSpecifier::ImportNamespaceSpecifier(_)
      )
    });
    let init = self.require_expr(source, needs_interop);

    // `import * as ns from '...'` binds the module object directly.
    if let [ImportDeclarationSpecifier::ImportNamespaceSpecifier(ns)] = &specifiers[..] {
      out.push(self.snippet.var_decl_stmt(ns.local.name.as_str(), init, decl.span));
      return;
    }

    let binding = self.binding_name(source);
    out.push(self.snippet.var_decl_stmt(&binding, init, decl.span));

    for specifier in &specifiers {
      match specifier {
        ImportDeclarationSpecifier::ImportSpecifier(spec) => {
          let value = self.snippet.member_expr(&binding, module_export_name(&spec.imported));
          out.push(self.snippet.var_decl_stmt(spec.local.name.as_str(), value, SPAN));
        }
        ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
          let value = self.snippet.member_expr(&binding, "default");
          out.push(self.snippet.var_decl_stmt(spec.local.name.as_str(), value, SPAN));
        }
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
          let value = self.snippet.id_ref_expr(&binding, SPAN);
          out.push(self.snippet.var_decl_stmt(spec.local.name.as_str(), value, SPAN));
        }
      }
    }
  }

  fn lower_export_named(
    &mut self,
    decl: ast::ExportNamedDeclaration<'ast>,
    out: &mut oxc::allocator::Vec<'ast, Statement<'ast>>,
  ) {
    if let Some(declaration) = decl.declaration {
      self.has_exports = true;
      let mut names = Vec::new();
      declared_names(&declaration, &mut names);
      out.push(Statement::from(declaration));
      for name in names {
        let value = self.snippet.id_ref_expr(name, SPAN);
        out.push(self.snippet.exports_assign_stmt(name, value, SPAN));
      }
      return;
    }

    if decl.specifiers.is_empty() {
      return;
    }
    self.has_exports = true;

    match &decl.source {
      Some(source_lit) => {
        let source = source_lit.value.as_str();
        let needs_interop =
          decl.specifiers.iter().any(|spec| module_export_name(&spec.local) == "default");
        let init = self.require_expr(source, needs_interop);
        let binding = self.binding_name(source);
        out.push(self.snippet.var_decl_stmt(&binding, init, decl.span));

        for spec in &decl.specifiers {
          let value = self.snippet.member_expr(&binding, module_export_name(&spec.local));
          out.push(self.snippet.exports_assign_stmt(module_export_name(&spec.exported), value, SPAN));
        }
      }
      None => {
        for spec in &decl.specifiers {
          let value = self.snippet.id_ref_expr(module_export_name(&spec.local), SPAN);
          out.push(self.snippet.exports_assign_stmt(module_export_name(&spec.exported), value, SPAN));
        }
      }
    }
  }

  fn lower_export_all(
    &mut self,
    decl: &ast::ExportAllDeclaration<'ast>,
    out: &mut oxc::allocator::Vec<'ast, Statement<'ast>>,
  ) {
    let source = decl.source.value.as_str();
    self.has_exports = true;

    match &decl.exported {
      // `export * as ns from '...'`
      Some(exported) => {
        let value = self.require_expr(source, true);
        out.push(self.snippet.exports_assign_stmt(module_export_name(exported), value, decl.span));
      }
      // `export * from '...'`
      None => {
        self.needs_re_export = true;
        let exports = self.snippet.id_ref_expr("exports", SPAN);
        let require = self.snippet.require_call_expr(source);
        let call = self.snippet.call_expr_with_2arg_expr("__reExport", exports, require);
        out.push(self.snippet.expr_stmt(call));
      }
    }
  }

  fn lower_export_default(
    &mut self,
    decl: ast::ExportDefaultDeclaration<'ast>,
    out: &mut oxc::allocator::Vec<'ast, Statement<'ast>>,
  ) {
    self.has_exports = true;

    match decl.declaration {
      ExportDefaultDeclarationKind::FunctionDeclaration(mut func) => match &func.id {
        Some(id) => {
          let name = id.name;
          out.push(Statement::FunctionDeclaration(func));
          let value = self.snippet.id_ref_expr(name.as_str(), SPAN);
          out.push(self.snippet.exports_assign_stmt("default", value, decl.span));
        }
        None => {
          func.r#type = ast::FunctionType::FunctionExpression;
          let value = Expression::FunctionExpression(func);
          out.push(self.snippet.exports_assign_stmt("default", value, decl.span));
        }
      },
      ExportDefaultDeclarationKind::ClassDeclaration(mut class) => match &class.id {
        Some(id) => {
          let name = id.name;
          out.push(Statement::ClassDeclaration(class));
          let value = self.snippet.id_ref_expr(name.as_str(), SPAN);
          out.push(self.snippet.exports_assign_stmt("default", value, decl.span));
        }
        None => {
          class.r#type = ast::ClassType::ClassExpression;
          let value = Expression::ClassExpression(class);
          out.push(self.snippet.exports_assign_stmt("default", value, decl.span));
        }
      },
      declaration if declaration.is_expression() => {
        let value = declaration.into_expression();
        out.push(self.snippet.exports_assign_stmt("default", value, decl.span));
      }
      // TS-only default declarations are stripped by the TypeScript pass.
      _ => {}
    }
  }
}

fn module_export_name<'ast>(name: &ModuleExportName<'ast>) -> &'ast str {
  match name {
    ModuleExportName::IdentifierName(id) => id.name.as_str(),
    ModuleExportName::IdentifierReference(id) => id.name.as_str(),
    ModuleExportName::StringLiteral(lit) => lit.value.as_str(),
  }
}

/// Names bound by an exported declaration, in source order. Destructuring
/// patterns export every bound name.
fn declared_names<'ast>(declaration: &Declaration<'ast>, names: &mut Vec<&'ast str>) {
  match declaration {
    Declaration::VariableDeclaration(decl) => {
      for declarator in &decl.declarations {
        collect_binding_names(&declarator.id.kind, names);
      }
    }
    Declaration::FunctionDeclaration(func) => {
      if let Some(id) = &func.id {
        names.push(id.name.as_str());
      }
    }
    Declaration::ClassDeclaration(class) => {
      if let Some(id) = &class.id {
        names.push(id.name.as_str());
      }
    }
    // TS declarations do not survive the TypeScript pass.
    _ => {}
  }
}

fn collect_binding_names<'ast>(pattern: &ast::BindingPatternKind<'ast>, names: &mut Vec<&'ast str>) {
  match pattern {
    ast::BindingPatternKind::BindingIdentifier(id) => names.push(id.name.as_str()),
    ast::BindingPatternKind::ObjectPattern(pat) => {
      for property in &pat.properties {
        collect_binding_names(&property.value.kind, names);
      }
      if let Some(rest) = &pat.rest {
        collect_binding_names(&rest.argument.kind, names);
      }
    }
    ast::BindingPatternKind::ArrayPattern(pat) => {
      for element in pat.elements.iter().flatten() {
        collect_binding_names(&element.kind, names);
      }
      if let Some(rest) = &pat.rest {
        collect_binding_names(&rest.argument.kind, names);
      }
    }
    ast::BindingPatternKind::AssignmentPattern(pat) => {
      collect_binding_names(&pat.left.kind, names);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use dualpack_common::{EsTarget, ModuleFormat, Syntax};
  use oxc::{allocator::Allocator, ast::ast::Program};

  use crate::{EcmaCompiler, EmitConfig, TransformHook};

  struct NoopHook;

  impl TransformHook for NoopHook {
    fn transform<'ast>(&mut self, _alloc: &'ast Allocator, _program: &mut Program<'ast>) {}
  }

  fn lower(source: &str) -> String {
    let config = EmitConfig {
      format: ModuleFormat::CommonJs,
      strict: true,
      syntax: Syntax::Typescript,
      target: EsTarget::Es2022,
    };
    EcmaCompiler::compile(Path::new("mod.ts"), source, &config, &mut NoopHook).unwrap().code
  }

  #[test]
  fn side_effect_import() {
    let code = lower("import './polyfill.cjs';");
    assert!(code.contains("require(\"./polyfill.cjs\");"));
  }

  #[test]
  fn default_import_goes_through_interop() {
    let code = lower("import pad from 'left-pad';\npad(1);");
    assert!(code.contains("__toESM(require(\"left-pad\"))"));
    assert!(code.contains(".default"));
  }

  #[test]
  fn named_imports_skip_interop() {
    let code = lower("import { a, b as c } from './m.cjs';\na(); c();");
    assert!(code.contains("var _m_cjs = require(\"./m.cjs\")"));
    assert!(code.contains("var a = _m_cjs.a"));
    assert!(code.contains("var c = _m_cjs.b"));
    assert!(!code.contains("__toESM"));
  }

  #[test]
  fn namespace_import_binds_module_object() {
    let code = lower("import * as path from 'node:path';\npath.join('a');");
    assert!(code.contains("var path = __toESM(require(\"node:path\"))"));
  }

  #[test]
  fn named_exports_are_assigned() {
    let code = lower("export const a = 1;\nexport function f() {}\nexport class C {}");
    assert!(code.contains("exports.a = a"));
    assert!(code.contains("exports.f = f"));
    assert!(code.contains("exports.C = C"));
    assert!(code.contains("Object.defineProperty(exports, \"__esModule\""));
  }

  #[test]
  fn default_export_expression() {
    let code = lower("export default 42;");
    assert!(code.contains("exports.default = 42"));
  }

  #[test]
  fn default_export_named_function_keeps_binding() {
    let code = lower("export default function main() {}\nmain();");
    assert!(code.contains("function main() {}") || code.contains("function main()"));
    assert!(code.contains("exports.default = main"));
  }

  #[test]
  fn re_exports() {
    let code = lower("export * from './all.cjs';\nexport { x as y } from './some.cjs';");
    assert!(code.contains("__reExport(exports, require(\"./all.cjs\"))"));
    assert!(code.contains("exports.y = _some_cjs.x"));
  }

  #[test]
  fn module_with_no_exports_gets_no_marker() {
    let code = lower("import './side.cjs';\nconsole.log(1);");
    assert!(!code.contains("__esModule"));
  }
}
