use oxc::{
  allocator::Allocator,
  ast::{
    AstBuilder, NONE,
    ast::{self, Argument, Statement, VariableDeclarationKind},
  },
  span::{Atom, SPAN, Span},
};

use dualpack_utils::ecmascript::is_validate_identifier_name;

type PassedStr<'a> = &'a str;

/// Builder helpers for the handful of statement shapes the CommonJS
/// finalizer generates.
pub struct AstSnippet<'ast> {
  pub builder: AstBuilder<'ast>,
}

impl<'ast> AstSnippet<'ast> {
  pub fn new(alloc: &'ast Allocator) -> Self {
    Self { builder: AstBuilder::new(alloc) }
  }

  #[inline]
  pub fn alloc(&self) -> &'ast Allocator {
    self.builder.allocator
  }

  pub fn atom(&self, value: &str) -> Atom<'ast> {
    self.builder.atom(value)
  }

  #[inline]
  pub fn id_name(&self, name: PassedStr, span: Span) -> ast::IdentifierName<'ast> {
    self.builder.identifier_name(span, self.atom(name))
  }

  #[inline]
  pub fn id_ref_expr(&self, name: PassedStr, span: Span) -> ast::Expression<'ast> {
    self.builder.expression_identifier(span, self.atom(name))
  }

  pub fn string_literal_expr(&self, value: PassedStr, span: Span) -> ast::Expression<'ast> {
    ast::Expression::StringLiteral(self.builder.alloc_string_literal(span, self.atom(value), None))
  }

  #[inline]
  pub fn expr_stmt(&self, expr: ast::Expression<'ast>) -> Statement<'ast> {
    self.builder.statement_expression(SPAN, expr)
  }

  /// `var [name] = [init];`
  pub fn var_decl_stmt(
    &self,
    name: PassedStr,
    init: ast::Expression<'ast>,
    span: Span,
  ) -> Statement<'ast> {
    Statement::from(self.builder.declaration_variable(
      span,
      VariableDeclarationKind::Var,
      self.builder.vec1(self.builder.variable_declarator(
        SPAN,
        VariableDeclarationKind::Var,
        self.builder.binding_pattern(
          self.builder.binding_pattern_kind_binding_identifier(SPAN, self.atom(name)),
          NONE,
          false,
        ),
        Some(init),
        false,
      )),
      false,
    ))
  }

  /// `require([source])`
  pub fn require_call_expr(&self, source: &str) -> ast::Expression<'ast> {
    self.builder.expression_call(
      SPAN,
      self.builder.expression_identifier(SPAN, "require"),
      NONE,
      self.builder.vec1(Argument::from(self.string_literal_expr(source, SPAN))),
      false,
    )
  }

  /// `[name]([arg])`
  pub fn call_expr_with_arg_expr(
    &self,
    name: PassedStr,
    arg: ast::Expression<'ast>,
  ) -> ast::Expression<'ast> {
    self.builder.expression_call(
      SPAN,
      self.builder.expression_identifier(SPAN, self.atom(name)),
      NONE,
      self.builder.vec1(Argument::from(arg)),
      false,
    )
  }

  /// `[name]([arg1], [arg2])`
  pub fn call_expr_with_2arg_expr(
    &self,
    name: PassedStr,
    arg1: ast::Expression<'ast>,
    arg2: ast::Expression<'ast>,
  ) -> ast::Expression<'ast> {
    self.builder.expression_call(
      SPAN,
      self.builder.expression_identifier(SPAN, self.atom(name)),
      NONE,
      self.builder.vec_from_iter([Argument::from(arg1), Argument::from(arg2)]),
      false,
    )
  }

  /// `[object].[property]`, falling back to `[object]["property"]` when the
  /// property is not a valid identifier.
  pub fn member_expr(&self, object: PassedStr, property: PassedStr) -> ast::Expression<'ast> {
    let object = self.id_ref_expr(object, SPAN);
    if is_validate_identifier_name(property) {
      ast::Expression::StaticMemberExpression(self.builder.alloc_static_member_expression(
        SPAN,
        object,
        self.id_name(property, SPAN),
        false,
      ))
    } else {
      ast::Expression::ComputedMemberExpression(self.builder.alloc_computed_member_expression(
        SPAN,
        object,
        self.string_literal_expr(property, SPAN),
        false,
      ))
    }
  }

  /// `exports.[property] = [value];` (computed member for non-identifier
  /// property names)
  pub fn exports_assign_stmt(
    &self,
    property: PassedStr,
    value: ast::Expression<'ast>,
    span: Span,
  ) -> Statement<'ast> {
    let target = if is_validate_identifier_name(property) {
      ast::AssignmentTarget::StaticMemberExpression(self.builder.alloc_static_member_expression(
        SPAN,
        self.id_ref_expr("exports", SPAN),
        self.id_name(property, SPAN),
        false,
      ))
    } else {
      ast::AssignmentTarget::ComputedMemberExpression(
        self.builder.alloc_computed_member_expression(
          SPAN,
          self.id_ref_expr("exports", SPAN),
          self.string_literal_expr(property, SPAN),
          false,
        ),
      )
    };

    self.expr_stmt(self.builder.expression_assignment(
      span,
      ast::AssignmentOperator::Assign,
      target,
      value,
    ))
  }

  /// `"use strict"` directive.
  pub fn use_strict_directive(&self) -> ast::Directive<'ast> {
    self.builder.directive(
      SPAN,
      self.builder.string_literal(SPAN, "use strict", None),
      self.atom("use strict"),
    )
  }
}
