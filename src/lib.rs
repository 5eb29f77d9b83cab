//! # React Emitter
//!
//! Lowers a target-neutral component tree into a React-style function component
//! module using hooks.
//!
//! ## Pipeline
//!
//! 1. The input [`Component`] is cloned; the caller's copy is never touched.
//! 2. `pre_json` plugins run on the clone.
//! 3. Under the `useState` strategy, getters become plain functions and
//!    `state.x = v` writes become `setX(v)` calls.
//! 4. `ref` bindings are discovered and their use sites rewritten to `.current`.
//! 5. Styles are collected per the configured styling strategy.
//! 6. State declarations are emitted, `post_json` plugins run, and the module is
//!    assembled: imports, style prelude, the component function, its state,
//!    handles, lifecycle hooks and the returned JSX fragment.
//! 7. `pre_code` plugins, the optional formatter, then `post_code` plugins.
//!
//! ## Expression Invariants
//!
//! - Embedded code is rewritten through the oxc AST, never by text search. String
//!   literals and comments that mention `state.` are left as written.
//! - Only the `state.<field> = <expr>` assignment shape is turned into a setter
//!   call. Increments and compound assignments are emitted unchanged.
//! - Code that does not parse fails the compile with `RX-ERR-EXPR-001`.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod binding;
mod compiler;
mod emitter;
mod error;
mod expression;
mod format;
mod ir;
mod lifecycle;
mod mutation;
mod options;
mod plugins;
mod refs;
mod state;
mod styles;
mod visitor;

#[cfg(test)]
mod compile_tests;

pub use compiler::{compile, compile_json, compile_with_formatter};
pub use error::{CompileError, Result};
pub use format::{FormatError, Formatter, OxcFormatter};
pub use ir::{Component, Hooks, Node, StateValue};
pub use options::{Options, StateType, StylesType};
pub use plugins::{Plugin, PluginResult, PluginStage};
pub use visitor::NodeVisitor;

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Compiles a JSON-serialized component with JSON-serialized options.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_component_native(component_json: String, options_json: String) -> napi::Result<String> {
    compile_json(&component_json, &options_json)
        .map_err(|e| napi::Error::from_reason(format!("[{}] {}", e.code(), e)))
}
