//! Embedded expression rewriting.
//!
//! Fragments are parsed with oxc, a read-only visitor records `(start, end, text)`
//! span replacements, and the replacements are spliced back into the original text.
//! Code that no rule touches keeps its exact spelling.

use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use crate::error::{CompileError, Result};

pub type Replacement = (u32, u32, String);

pub fn source_type() -> SourceType {
    SourceType::default()
        .with_typescript(true)
        .with_jsx(true)
        .with_module(true)
}

/// Visitors that rewrite code by recording span replacements.
pub trait SpanRewriter: for<'a> Visit<'a> {
    fn take_replacements(&mut self) -> Vec<Replacement>;
}

/// Parses `code` (as an expression first, as a statement list second) and walks it
/// with `visitor`.
pub fn visit_fragment<V>(code: &str, visitor: &mut V) -> Result<()>
where
    V: for<'a> Visit<'a>,
{
    let allocator = Allocator::default();
    if let Ok(expr) = Parser::new(&allocator, code, source_type()).parse_expression() {
        // parse_expression stops after the first expression; only take it when it spans
        // the whole fragment, otherwise fall through to the statement parser.
        if expr.span().end as usize == code.trim_end().len() {
            visitor.visit_expression(&expr);
            return Ok(());
        }
    }

    let ret = Parser::new(&allocator, code, source_type()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(CompileError::expression(code, format!("{:?}", ret.errors)));
    }
    visitor.visit_program(&ret.program);
    Ok(())
}

/// Fails unless `code` is exactly one expression. Statement lists are rejected.
pub fn expect_expression(code: &str) -> Result<()> {
    let allocator = Allocator::default();
    match Parser::new(&allocator, code, source_type()).parse_expression() {
        Ok(expr) if expr.span().end as usize == code.trim_end().len() => Ok(()),
        Ok(_) => Err(CompileError::expression(
            code,
            "expected a single expression, found trailing statements",
        )),
        Err(errors) => Err(CompileError::expression(code, format!("{:?}", errors))),
    }
}

/// Runs `rewriter` over `code` and returns the rewritten text.
pub fn rewrite<R: SpanRewriter>(code: &str, rewriter: &mut R) -> Result<String> {
    if code.trim().is_empty() {
        return Ok(code.to_string());
    }
    visit_fragment(code, rewriter)?;
    let replacements = rewriter.take_replacements();
    if replacements.is_empty() {
        return Ok(code.to_string());
    }
    Ok(apply_replacements(code, replacements))
}

/// Runs `rewriter` over an object member definition such as `get total() { ... }`,
/// which only parses inside an object literal.
pub fn rewrite_method<R: SpanRewriter>(code: &str, rewriter: &mut R) -> Result<String> {
    let wrapped = format!("({{{}}})", code);
    let out = rewrite(&wrapped, rewriter)?;
    Ok(out[2..out.len() - 2].to_string())
}

/// Splices replacements into `code`, back to front so earlier offsets stay valid.
/// Replacements must not overlap; zero-width entries are insertions.
pub fn apply_replacements(code: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    let mut out = code.to_string();
    for (start, end, text) in replacements {
        out.replace_range(start as usize..end as usize, &text);
    }
    out
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
