//! Style collection.
//!
//! A `css` binding holds a static object literal of declarations:
//! `{ color: 'red', fontSize: 12, ':hover': { color: 'blue' } }`.
//!
//! - emotion: the binding stays inline, the output gains the `jsx` pragma import
//! - styled-jsx: rules move into one `<style jsx>` block keyed by generated classes
//! - styled-components: styled nodes become generated components declared before
//!   the component function

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, ObjectExpression, ObjectPropertyKind, PropertyKey};
use oxc_parser::Parser;
use oxc_span::GetSpan;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::{CompileError, Result};
use crate::emitter::is_self_closing;
use crate::expression::{capitalize, source_type};
use crate::ir::{is_identifier, Component, Node, CSS_KEY, FOR_NODE, FRAGMENT_NODE, SHOW_NODE};
use crate::options::{Options, StylesType};
use crate::visitor::{for_each_node, walk_node, NodeVisitor};

/// Attribute that receives generated class names.
pub const CLASS_ATTRIBUTE: &str = "className";

lazy_static! {
    static ref UPPER_RE: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// CSS RULES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CssRule {
    pub declarations: Vec<(String, String)>,
    /// Selector or at-rule key → nested rule.
    pub nested: Vec<(String, CssRule)>,
}

impl CssRule {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.nested.iter().all(|(_, rule)| rule.is_empty())
    }

    /// Rule body with nested blocks kept nested (styled-components syntax).
    pub fn to_block(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut lines = Vec::new();
        for (prop, value) in &self.declarations {
            lines.push(format!("{}{}: {};", pad, prop, value));
        }
        for (selector, rule) in &self.nested {
            lines.push(format!("{}{} {{", pad, selector));
            lines.push(rule.to_block(indent + 2));
            lines.push(format!("{}}}", pad));
        }
        lines.join("\n")
    }

    /// Flat stylesheet rules scoped to `selector`.
    pub fn to_stylesheet(&self, selector: &str) -> String {
        let mut blocks = Vec::new();
        if !self.declarations.is_empty() {
            let mut flat = self.clone();
            flat.nested.clear();
            blocks.push(format!("{} {{\n{}\n}}", selector, flat.to_block(2)));
        }
        for (key, rule) in &self.nested {
            if key.starts_with('@') {
                let inner = rule
                    .to_stylesheet(selector)
                    .lines()
                    .map(|line| format!("  {}", line))
                    .collect::<Vec<_>>()
                    .join("\n");
                blocks.push(format!("{} {{\n{}\n}}", key, inner));
            } else {
                blocks.push(rule.to_stylesheet(&nested_selector(selector, key)));
            }
        }
        blocks.join("\n")
    }
}

fn nested_selector(parent: &str, key: &str) -> String {
    if key.contains('&') {
        key.replace('&', parent)
    } else if key.starts_with(':') {
        format!("{}{}", parent, key)
    } else {
        format!("{} {}", parent, key)
    }
}

pub fn kebab_case(prop: &str) -> String {
    if prop.contains('-') {
        return prop.to_string();
    }
    UPPER_RE.replace_all(prop, "$1-$2").to_lowercase()
}

/// `<tag>-<first six hex chars of sha-256(rule)>`.
pub fn class_name(tag: &str, rule: &CssRule) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rule.to_block(0).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}-{}", tag, &digest[..6])
}

pub fn parse_css_object(code: &str, node: &str) -> Result<CssRule> {
    if code.trim().is_empty() {
        return Ok(CssRule::default());
    }
    let allocator = Allocator::default();
    let expr = Parser::new(&allocator, code, source_type())
        .parse_expression()
        .map_err(|errors| CompileError::expression(code, format!("{:?}", errors)))?;
    match unwrap_parens(&expr) {
        Expression::ObjectExpression(obj) => object_to_rule(obj, code, node),
        _ => Err(CompileError::style(
            node,
            format!("`{}` is not an object literal", code.trim()),
        )),
    }
}

fn unwrap_parens<'b, 'a>(expr: &'b Expression<'a>) -> &'b Expression<'a> {
    match expr {
        Expression::ParenthesizedExpression(inner) => unwrap_parens(&inner.expression),
        _ => expr,
    }
}

fn object_to_rule(obj: &ObjectExpression<'_>, code: &str, node: &str) -> Result<CssRule> {
    let mut rule = CssRule::default();
    for item in &obj.properties {
        let ObjectPropertyKind::ObjectProperty(prop) = item else {
            return Err(CompileError::style(node, "spread entries cannot be collected"));
        };
        let key = match &prop.key {
            PropertyKey::StaticIdentifier(id) => id.name.to_string(),
            PropertyKey::StringLiteral(s) => s.value.to_string(),
            _ => {
                return Err(CompileError::style(node, "computed keys cannot be collected"));
            }
        };
        let value = unwrap_parens(&prop.value);
        let text = match value {
            Expression::StringLiteral(s) => s.value.to_string(),
            Expression::NumericLiteral(_) => span_text(code, value),
            Expression::UnaryExpression(unary)
                if matches!(&unary.argument, Expression::NumericLiteral(_)) =>
            {
                span_text(code, value)
            }
            Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
                .quasis
                .iter()
                .map(|quasi| quasi.value.raw.to_string())
                .collect(),
            Expression::ObjectExpression(inner) => {
                rule.nested.push((key, object_to_rule(inner, code, node)?));
                continue;
            }
            _ => {
                return Err(CompileError::style(
                    node,
                    format!("`{}` has a dynamic value: {}", key, span_text(code, value)),
                ));
            }
        };
        rule.declarations.push((kebab_case(&key), text));
    }
    Ok(rule)
}

fn span_text(code: &str, expr: &Expression<'_>) -> String {
    let span = expr.span();
    code[span.start as usize..span.end as usize].to_string()
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Side artifacts of style collection, spliced in by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleArtifacts {
    pub imports: Vec<String>,
    /// Declarations emitted before the component function.
    pub prelude: String,
    /// Element appended to the returned fragment.
    pub style_element: String,
    /// Generated components standing in for void elements, still emitted self-closing.
    pub void_components: HashSet<String>,
}

/// Escapes text for the body of a JS template literal so it stays inert.
pub fn escape_template_literal(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

fn is_style_binding(code: &str) -> bool {
    let code = code.trim();
    !code.is_empty() && code != "{}"
}

fn is_control_node(node: &Node) -> bool {
    matches!(node.name.as_str(), FRAGMENT_NODE | FOR_NODE | SHOW_NODE)
}

pub fn has_styles(component: &Component) -> bool {
    let mut found = false;
    for_each_node(&component.children, &mut |node| {
        if node.bindings.get(CSS_KEY).map_or(false, |code| is_style_binding(code)) {
            found = true;
        }
    });
    found
}

pub fn collect_styles(component: &mut Component, options: &Options) -> Result<StyleArtifacts> {
    let mut artifacts = StyleArtifacts::default();
    match options.styles_type {
        StylesType::Emotion => {
            if has_styles(component) {
                artifacts.imports.push("/** @jsx jsx */".to_string());
                artifacts
                    .imports
                    .push("import { jsx } from '@emotion/react';".to_string());
            }
        }
        StylesType::StyledJsx => {
            let mut collector = StyledJsxCollector::default();
            collector.visit_children(&mut component.children)?;
            tracing::debug!(rules = collector.rules.len(), "collected styled-jsx rules");
            if !collector.rules.is_empty() {
                artifacts.style_element = format!(
                    "<style jsx>{{`\n{}\n`}}</style>",
                    escape_template_literal(&collector.rules.join("\n"))
                );
            }
        }
        StylesType::StyledComponents => {
            if has_styles(component) {
                let mut collector = StyledComponentsCollector::default();
                collector.visit_children(&mut component.children)?;
                tracing::debug!(
                    components = collector.declarations.len(),
                    "collected styled components"
                );
                artifacts
                    .imports
                    .push("import styled from 'styled-components';".to_string());
                artifacts.prelude = collector.declarations.join("\n\n");
                artifacts.void_components = collector.void_components;
            }
        }
    }
    Ok(artifacts)
}

#[derive(Default)]
struct StyledJsxCollector {
    rules: Vec<String>,
    seen: HashSet<String>,
}

impl NodeVisitor for StyledJsxCollector {
    fn visit_node(&mut self, node: &mut Node) -> Result<()> {
        if !is_control_node(node) {
            if let Some(code) = node.bindings.shift_remove(CSS_KEY) {
                let rule = parse_css_object(&code, &node.name)?;
                if !rule.is_empty() {
                    let class = class_name(&node.name, &rule);
                    add_class(node, &class);
                    if self.seen.insert(class.clone()) {
                        self.rules.push(rule.to_stylesheet(&format!(".{}", class)));
                    }
                }
            }
        }
        walk_node(self, node)
    }
}

fn add_class(node: &mut Node, class: &str) {
    if let Some(expr) = node.bindings.get_mut(CLASS_ATTRIBUTE) {
        *expr = format!("`${{{}}} {}`", expr.trim(), class);
        return;
    }
    let value = match node.properties.get(CLASS_ATTRIBUTE) {
        Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
        _ => class.to_string(),
    };
    node.properties.insert(CLASS_ATTRIBUTE.to_string(), value);
}

#[derive(Default)]
struct StyledComponentsCollector {
    declarations: Vec<String>,
    void_components: HashSet<String>,
    used_names: HashMap<String, usize>,
}

impl StyledComponentsCollector {
    fn component_name(&mut self, tag: &str) -> String {
        let clean: String = tag.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        let base = format!("Styled{}", capitalize(&clean));
        let count = self.used_names.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}{}", base, count)
        }
    }
}

impl NodeVisitor for StyledComponentsCollector {
    fn visit_node(&mut self, node: &mut Node) -> Result<()> {
        if !is_control_node(node) {
            if let Some(code) = node.bindings.shift_remove(CSS_KEY) {
                let rule = parse_css_object(&code, &node.name)?;
                if !rule.is_empty() {
                    let name = self.component_name(&node.name);
                    let target = if node.name.starts_with(|c: char| c.is_ascii_lowercase())
                        && is_identifier(&node.name)
                    {
                        format!("styled.{}", node.name)
                    } else {
                        format!("styled({})", node.name)
                    };
                    let body = escape_template_literal(&rule.to_block(2));
                    if is_self_closing(&node.name) {
                        self.void_components.insert(name.clone());
                    }
                    self.declarations
                        .push(format!("const {} = {}`\n{}\n`;", name, target, body));
                    node.name = name;
                }
            }
        }
        walk_node(self, node)
    }
}
