//! Binding processor.
//!
//! Under the hook-per-field strategy each state field is its own local binding, so
//! `state.count` becomes `count`. Every other strategy keeps a `state` object in
//! scope and expressions pass through untouched. `props.*` is never rewritten.

use oxc_ast::ast::{Expression, StaticMemberExpression};
use oxc_ast_visit::{walk, Visit};

use crate::error::Result;
use crate::expression::{rewrite, Replacement, SpanRewriter};
use crate::ir::STATE_IDENT;
use crate::options::Options;

pub fn process_binding(code: &str, options: &Options) -> Result<String> {
    if options.uses_state_hooks() {
        strip_state_refs(code)
    } else {
        Ok(code.to_string())
    }
}

/// Rewrites `state.<field>` member accesses to bare `<field>` references.
pub fn strip_state_refs(code: &str) -> Result<String> {
    rewrite(code, &mut StateRefStripper::default())
}

#[derive(Default)]
struct StateRefStripper {
    replacements: Vec<Replacement>,
}

impl<'a> Visit<'a> for StateRefStripper {
    fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
        if let Expression::Identifier(object) = &expr.object {
            if object.name == STATE_IDENT {
                self.replacements.push((
                    expr.span.start,
                    expr.span.end,
                    expr.property.name.to_string(),
                ));
                return;
            }
        }
        walk::walk_static_member_expression(self, expr);
    }
}

impl SpanRewriter for StateRefStripper {
    fn take_replacements(&mut self) -> Vec<Replacement> {
        std::mem::take(&mut self.replacements)
    }
}
