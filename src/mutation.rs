//! State mutation rewriting for the hook-per-field strategy.
//!
//! Once state is split into independent `useState` pairs, a write such as
//! `state.count = state.count + 1` has to become `setCount(state.count + 1)`.
//! Only plain `=` assignments whose target is `state.<field>` are rewritten.
//! Updates (`state.count++`) and compound assignments (`state.count += 1`) are
//! left as written.

use std::collections::HashSet;

use oxc_ast::ast::{
    AssignmentExpression, AssignmentOperator, AssignmentTarget, Expression, StaticMemberExpression,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::GetSpan;

use crate::error::Result;
use crate::expression::{capitalize, rewrite, rewrite_method, Replacement, SpanRewriter};
use crate::ir::{Component, StateValue, STATE_IDENT};
use crate::visitor::NodeVisitor;

pub fn setter_name(field: &str) -> String {
    format!("set{}", capitalize(field))
}

/// Rewrites every `state.<field> = <rhs>` in `code` to `set<Field>(<rhs>)`.
pub fn rewrite_state_assignments(code: &str) -> Result<String> {
    rewrite(code, &mut SetterRewriter::default())
}

/// Rewrites `state.<getter>` reads to `<getter>()` calls.
pub fn rewrite_getter_reads(code: &str, getters: &HashSet<String>) -> Result<String> {
    rewrite(code, &mut getter_rewriter(getters))
}

fn rewrite_method_assignments(code: &str) -> Result<String> {
    rewrite_method(code, &mut SetterRewriter::default())
}

fn getter_rewriter(getters: &HashSet<String>) -> GetterCallRewriter {
    GetterCallRewriter {
        getters: getters.clone(),
        replacements: Vec::new(),
    }
}

/// Runs the setter rewrite over every binding, hook body and method body of `component`.
pub fn rewrite_component_mutations(component: &mut Component) -> Result<()> {
    MutationPass.visit_component(component)
}

/// Turns getter state entries into plain function calls across `component`.
pub fn getters_to_functions(component: &mut Component) -> Result<()> {
    let getters: HashSet<String> = component
        .state
        .iter()
        .filter(|(_, value)| value.is_getter())
        .map(|(key, _)| key.clone())
        .collect();
    if getters.is_empty() {
        return Ok(());
    }
    tracing::debug!(count = getters.len(), "converting state getters to functions");
    GetterPass { getters }.visit_component(component)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSION REWRITERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct SetterRewriter {
    replacements: Vec<Replacement>,
}

impl<'a> Visit<'a> for SetterRewriter {
    fn visit_assignment_expression(&mut self, expr: &AssignmentExpression<'a>) {
        if expr.operator == AssignmentOperator::Assign {
            if let AssignmentTarget::StaticMemberExpression(member) = &expr.left {
                if let Expression::Identifier(object) = &member.object {
                    if object.name == STATE_IDENT {
                        let rhs = expr.right.span();
                        // `state.x = ` -> `setX(`, then close the call after the rhs.
                        self.replacements.push((
                            expr.span.start,
                            rhs.start,
                            format!("{}(", setter_name(&member.property.name)),
                        ));
                        self.replacements
                            .push((expr.span.end, expr.span.end, ")".to_string()));
                        self.visit_expression(&expr.right);
                        return;
                    }
                }
            }
        }
        walk::walk_assignment_expression(self, expr);
    }
}

impl SpanRewriter for SetterRewriter {
    fn take_replacements(&mut self) -> Vec<Replacement> {
        std::mem::take(&mut self.replacements)
    }
}

struct GetterCallRewriter {
    getters: HashSet<String>,
    replacements: Vec<Replacement>,
}

impl<'a> Visit<'a> for GetterCallRewriter {
    fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
        if let Expression::Identifier(object) = &expr.object {
            let field = expr.property.name.as_str();
            if object.name == STATE_IDENT && self.getters.contains(field) {
                self.replacements
                    .push((expr.span.start, expr.span.end, format!("{}()", field)));
                return;
            }
        }
        walk::walk_static_member_expression(self, expr);
    }
}

impl SpanRewriter for GetterCallRewriter {
    fn take_replacements(&mut self) -> Vec<Replacement> {
        std::mem::take(&mut self.replacements)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE PASSES
// ═══════════════════════════════════════════════════════════════════════════════

struct MutationPass;

impl NodeVisitor for MutationPass {
    fn visit_state_value(&mut self, _key: &str, value: &mut StateValue) -> Result<()> {
        match value {
            StateValue::Method(code) => *code = rewrite_method_assignments(code)?,
            StateValue::Function(code) => *code = rewrite_state_assignments(code)?,
            StateValue::Literal(_) => {}
        }
        Ok(())
    }

    fn visit_hook(&mut self, code: &mut String) -> Result<()> {
        *code = rewrite_state_assignments(code)?;
        Ok(())
    }

    fn visit_binding(&mut self, _key: &str, code: &mut String) -> Result<()> {
        *code = rewrite_state_assignments(code)?;
        Ok(())
    }
}

struct GetterPass {
    getters: HashSet<String>,
}

impl NodeVisitor for GetterPass {
    fn visit_state_value(&mut self, _key: &str, value: &mut StateValue) -> Result<()> {
        match value {
            StateValue::Method(code) => {
                *code = rewrite_method(code, &mut getter_rewriter(&self.getters))?
            }
            StateValue::Function(code) => *code = rewrite_getter_reads(code, &self.getters)?,
            StateValue::Literal(_) => {}
        }
        Ok(())
    }

    fn visit_hook(&mut self, code: &mut String) -> Result<()> {
        *code = rewrite_getter_reads(code, &self.getters)?;
        Ok(())
    }

    fn visit_binding(&mut self, _key: &str, code: &mut String) -> Result<()> {
        *code = rewrite_getter_reads(code, &self.getters)?;
        Ok(())
    }
}
