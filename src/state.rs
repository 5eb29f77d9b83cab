//! State declarations per strategy.
//!
//! Hook-per-field:
//!   const [count, setCount] = useState(() => (0));
//!   function double() { return count * 2 }
//!
//! Single object (mobx shown):
//!   const state = useLocalObservable(() => ({ count: 0, get double() { ... } }));

use indexmap::IndexMap;
use serde_json::Value;

use crate::binding::process_binding;
use crate::error::Result;
use crate::ir::{is_identifier, Component, StateValue, FUNCTION_LITERAL_PREFIX};
use crate::mutation::setter_name;
use crate::options::{Options, StateType};

/// Emits the state binding for `component`, or an empty string when it has no state.
pub fn state_declarations(component: &Component, options: &Options) -> Result<String> {
    if !component.has_state() {
        return Ok(String::new());
    }
    let object_hook = options.state_type.object_hook();
    match (options.state_type, object_hook) {
        (_, None) => use_state_declarations(&component.state, options),
        // useLocalObservable takes an initializer function.
        (StateType::Mobx, Some((hook, _))) => Ok(format!(
            "const state = {}(() => ({}));",
            hook,
            state_object(&component.state)
        )),
        (_, Some((hook, _))) => Ok(format!(
            "const state = {}({});",
            hook,
            state_object(&component.state)
        )),
    }
}

fn use_state_declarations(state: &IndexMap<String, StateValue>, options: &Options) -> Result<String> {
    let mut lines = Vec::with_capacity(state.len());
    for (key, value) in state {
        let line = match value {
            StateValue::Method(code) => process_binding(&method_to_function(code), options)?,
            StateValue::Function(code) => format!(
                "const [{}, {}] = useState(() => ({}));",
                key,
                setter_name(key),
                process_binding(code, options)?
            ),
            StateValue::Literal(literal) => format!(
                "const [{}, {}] = useState(() => ({}));",
                key,
                setter_name(key),
                js_literal(literal)
            ),
        };
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// `get total() { ... }` → `function total() { ... }`; other methods get `function ` prepended.
pub fn method_to_function(code: &str) -> String {
    let code = code.trim();
    if let Some(rest) = code.strip_prefix("get ") {
        format!("function {}", rest.trim_start())
    } else if let Some(rest) = code.strip_prefix("async ") {
        format!("async function {}", rest.trim_start())
    } else {
        format!("function {}", code)
    }
}

/// Object literal holding every state entry, methods inlined as object members.
pub fn state_object(state: &IndexMap<String, StateValue>) -> String {
    if state.is_empty() {
        return "{}".to_string();
    }
    let entries: Vec<String> = state
        .iter()
        .map(|(key, value)| match value {
            StateValue::Method(code) => code.trim().to_string(),
            StateValue::Function(code) => format!("{}: {}", object_key(key), code),
            StateValue::Literal(literal) => format!("{}: {}", object_key(key), js_literal(literal)),
        })
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

/// Serializes a literal as JavaScript source.
///
/// Identifier keys are left unquoted and nested strings tagged as function
/// literals are emitted as raw code, so values may carry functions that plain
/// JSON cannot represent.
pub fn js_literal(value: &Value) -> String {
    match value {
        Value::String(s) => match s.strip_prefix(FUNCTION_LITERAL_PREFIX) {
            Some(code) => code.to_string(),
            None => value.to_string(),
        },
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(js_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", object_key(key), js_literal(value)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.to_string(),
    }
}

fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        Value::String(key.to_string()).to_string()
    }
}
