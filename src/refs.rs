//! Reference (DOM handle) resolution.
//!
//! A reference is declared by a `ref` binding: `<input ref={inputEl} />` declares
//! `inputEl`. Each one gets a `useRef()` handle and every read of it elsewhere is
//! rewritten to the `.current` accessor.

use std::collections::HashSet;

use indexmap::IndexSet;
use oxc_ast::ast::{
    ArrowFunctionExpression, BindingIdentifier, BlockStatement, CatchClause, Expression, Function,
    IdentifierReference, ObjectProperty, VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_syntax::scope::ScopeFlags;

use crate::error::Result;
use crate::expression::{rewrite, rewrite_method, Replacement, SpanRewriter};
use crate::ir::{Component, Node, StateValue, FOR_NAME_KEY, FOR_NODE, REF_KEY};
use crate::visitor::{for_each_node, walk_node, NodeVisitor};

pub const REF_ACCESSOR: &str = ".current";

/// Reference names in first-seen order.
pub fn discover_refs(component: &Component) -> IndexSet<String> {
    let mut refs = IndexSet::new();
    for_each_node(&component.children, &mut |node| {
        if let Some(name) = node.bindings.get(REF_KEY) {
            let name = name.trim();
            if !name.is_empty() {
                refs.insert(name.to_string());
            }
        }
    });
    refs
}

pub fn ref_declarations(refs: &IndexSet<String>) -> String {
    refs.iter()
        .map(|name| format!("const {} = useRef();", name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrites every read of a reference name in `code` to `<name>.current`.
/// Names rebound by a parameter or local declaration are left alone inside that scope.
pub fn rewrite_ref_accessors(code: &str, refs: &HashSet<String>) -> Result<String> {
    rewrite(code, &mut RefAccessorRewriter::new(refs))
}

/// Same as [`rewrite_ref_accessors`], with `locals` already bound around `code`.
pub fn rewrite_ref_accessors_with_locals(
    code: &str,
    refs: &HashSet<String>,
    locals: HashSet<String>,
) -> Result<String> {
    rewrite(code, &mut RefAccessorRewriter::with_locals(refs, locals))
}

/// Rewrites reference use sites across bindings, hooks and state code. The `ref`
/// bindings themselves keep the bare handle.
pub fn map_refs(component: &mut Component, refs: &IndexSet<String>) -> Result<()> {
    if refs.is_empty() {
        return Ok(());
    }
    let refs: HashSet<String> = refs.iter().cloned().collect();
    tracing::debug!(count = refs.len(), "rewriting reference use sites");
    RefPass {
        refs,
        loop_vars: Vec::new(),
    }
    .visit_component(component)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACCESSOR REWRITER
// ═══════════════════════════════════════════════════════════════════════════════

struct RefAccessorRewriter {
    refs: HashSet<String>,
    scope_stack: Vec<HashSet<String>>,
    replacements: Vec<Replacement>,
}

impl RefAccessorRewriter {
    fn new(refs: &HashSet<String>) -> Self {
        Self::with_locals(refs, HashSet::new())
    }

    fn with_locals(refs: &HashSet<String>, locals: HashSet<String>) -> Self {
        RefAccessorRewriter {
            refs: refs.clone(),
            scope_stack: vec![locals],
            replacements: Vec::new(),
        }
    }

    fn push_scope(&mut self) {
        self.scope_stack.push(HashSet::new());
    }

    fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    fn add_locals(&mut self, names: HashSet<String>) {
        if let Some(scope) = self.scope_stack.last_mut() {
            scope.extend(names);
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.scope_stack.iter().rev().any(|s| s.contains(name))
    }

    fn should_rewrite(&self, name: &str) -> bool {
        self.refs.contains(name) && !self.is_local(name)
    }
}

/// Collects every name a binding position introduces.
#[derive(Default)]
struct BindingNames(HashSet<String>);

impl<'a> Visit<'a> for BindingNames {
    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.0.insert(ident.name.to_string());
    }
}

impl<'a> Visit<'a> for RefAccessorRewriter {
    fn visit_arrow_function_expression(&mut self, func: &ArrowFunctionExpression<'a>) {
        self.push_scope();
        let mut params = BindingNames::default();
        params.visit_formal_parameters(&func.params);
        self.add_locals(params.0);
        walk::walk_arrow_function_expression(self, func);
        self.pop_scope();
    }

    fn visit_function(&mut self, func: &Function<'a>, flags: ScopeFlags) {
        if let Some(id) = &func.id {
            self.add_locals(HashSet::from([id.name.to_string()]));
        }
        self.push_scope();
        let mut params = BindingNames::default();
        params.visit_formal_parameters(&func.params);
        self.add_locals(params.0);
        walk::walk_function(self, func, flags);
        self.pop_scope();
    }

    fn visit_block_statement(&mut self, block: &BlockStatement<'a>) {
        self.push_scope();
        walk::walk_block_statement(self, block);
        self.pop_scope();
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause<'a>) {
        self.push_scope();
        if let Some(param) = &clause.param {
            let mut names = BindingNames::default();
            names.visit_catch_parameter(param);
            self.add_locals(names.0);
        }
        walk::walk_catch_clause(self, clause);
        self.pop_scope();
    }

    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator<'a>) {
        let mut names = BindingNames::default();
        names.visit_binding_pattern(&decl.id);
        self.add_locals(names.0);
        walk::walk_variable_declarator(self, decl);
    }

    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if self.should_rewrite(ident.name.as_str()) {
            self.replacements.push((
                ident.span.start,
                ident.span.end,
                format!("{}{}", ident.name, REF_ACCESSOR),
            ));
        }
    }

    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        // `{ inputEl }` has to be expanded, `{ inputEl.current }` is not valid.
        if prop.shorthand {
            if let Expression::Identifier(ident) = &prop.value {
                if self.should_rewrite(ident.name.as_str()) {
                    self.replacements.push((
                        prop.span.start,
                        prop.span.end,
                        format!("{0}: {0}{1}", ident.name, REF_ACCESSOR),
                    ));
                    return;
                }
            }
        }
        walk::walk_object_property(self, prop);
    }
}

impl SpanRewriter for RefAccessorRewriter {
    fn take_replacements(&mut self) -> Vec<Replacement> {
        std::mem::take(&mut self.replacements)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE PASS
// ═══════════════════════════════════════════════════════════════════════════════

struct RefPass {
    refs: HashSet<String>,
    /// `_forName` variables of the enclosing `For` nodes.
    loop_vars: Vec<String>,
}

impl RefPass {
    fn rewrite(&self, code: &str) -> Result<String> {
        let locals: HashSet<String> = self.loop_vars.iter().cloned().collect();
        rewrite_ref_accessors_with_locals(code, &self.refs, locals)
    }
}

impl NodeVisitor for RefPass {
    fn visit_state_value(&mut self, _key: &str, value: &mut StateValue) -> Result<()> {
        match value {
            StateValue::Method(code) => {
                *code = rewrite_method(code, &mut RefAccessorRewriter::new(&self.refs))?
            }
            StateValue::Function(code) => *code = self.rewrite(code)?,
            StateValue::Literal(_) => {}
        }
        Ok(())
    }

    fn visit_hook(&mut self, code: &mut String) -> Result<()> {
        *code = self.rewrite(code)?;
        Ok(())
    }

    fn visit_node(&mut self, node: &mut Node) -> Result<()> {
        let loop_var = match node.name.as_str() {
            FOR_NODE => node.bindings.get(FOR_NAME_KEY).map(|name| name.trim().to_string()),
            _ => None,
        };
        let Some(loop_var) = loop_var else {
            return walk_node(self, node);
        };
        // `each` is evaluated outside the loop, the children inside it.
        for (key, code) in node.bindings.iter_mut() {
            self.visit_binding(key, code)?;
        }
        self.loop_vars.push(loop_var);
        let result = self.visit_children(&mut node.children);
        self.loop_vars.pop();
        result
    }

    fn visit_binding(&mut self, key: &str, code: &mut String) -> Result<()> {
        // `ref` keeps the bare handle and `_forName` declares a name.
        if key != REF_KEY && key != FOR_NAME_KEY {
            *code = self.rewrite(code)?;
        }
        Ok(())
    }
}
