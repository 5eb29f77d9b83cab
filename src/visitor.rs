use crate::error::Result;
use crate::ir::{Component, Hooks, Node, StateValue};

/// The NodeVisitor trait defines the single traversal mechanism for rewrite passes.
///
/// Rules:
/// 1. Traversal order is fixed: state entries, hooks, then the node tree depth first.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call the matching `walk_*` function to continue traversal
///    unless pruning is intended.
/// 4. The first error stops the walk.
pub trait NodeVisitor {
    fn visit_component(&mut self, component: &mut Component) -> Result<()> {
        walk_component(self, component)
    }

    fn visit_state_value(&mut self, _key: &str, _value: &mut StateValue) -> Result<()> {
        Ok(())
    }

    fn visit_hooks(&mut self, hooks: &mut Hooks) -> Result<()> {
        walk_hooks(self, hooks)
    }

    fn visit_hook(&mut self, _code: &mut String) -> Result<()> {
        Ok(())
    }

    fn visit_children(&mut self, children: &mut Vec<Node>) -> Result<()> {
        walk_children(self, children)
    }

    fn visit_node(&mut self, node: &mut Node) -> Result<()> {
        walk_node(self, node)
    }

    fn visit_binding(&mut self, _key: &str, _code: &mut String) -> Result<()> {
        Ok(())
    }
}

pub fn walk_component<V: NodeVisitor + ?Sized>(visitor: &mut V, component: &mut Component) -> Result<()> {
    for (key, value) in component.state.iter_mut() {
        visitor.visit_state_value(key, value)?;
    }
    visitor.visit_hooks(&mut component.hooks)?;
    visitor.visit_children(&mut component.children)
}

pub fn walk_hooks<V: NodeVisitor + ?Sized>(visitor: &mut V, hooks: &mut Hooks) -> Result<()> {
    if let Some(code) = hooks.init.as_mut() {
        visitor.visit_hook(code)?;
    }
    if let Some(code) = hooks.on_mount.as_mut() {
        visitor.visit_hook(code)?;
    }
    Ok(())
}

pub fn walk_children<V: NodeVisitor + ?Sized>(visitor: &mut V, children: &mut Vec<Node>) -> Result<()> {
    for node in children {
        visitor.visit_node(node)?;
    }
    Ok(())
}

pub fn walk_node<V: NodeVisitor + ?Sized>(visitor: &mut V, node: &mut Node) -> Result<()> {
    for (key, code) in node.bindings.iter_mut() {
        visitor.visit_binding(key, code)?;
    }
    visitor.visit_children(&mut node.children)
}

/// Read-only depth-first iteration over every node of a tree.
pub fn for_each_node<'n>(nodes: &'n [Node], f: &mut dyn FnMut(&'n Node)) {
    for node in nodes {
        f(node);
        for_each_node(&node.children, f);
    }
}
