//! Framework-neutral component IR.
//!
//! A [`Component`] owns a strict tree of [`Node`]s. The emitter never touches the
//! caller's tree: every compile call works on its own clone.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CompileError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// RESERVED NAMES
// ═══════════════════════════════════════════════════════════════════════════════

pub const FRAGMENT_NODE: &str = "Fragment";
pub const FOR_NODE: &str = "For";
pub const SHOW_NODE: &str = "Show";

pub const TEXT_KEY: &str = "_text";
pub const SPREAD_KEY: &str = "_spread";
pub const FOR_NAME_KEY: &str = "_forName";
pub const EACH_KEY: &str = "each";
pub const WHEN_KEY: &str = "when";
pub const CSS_KEY: &str = "css";
pub const REF_KEY: &str = "ref";

/// Identifier of the neutral state container inside embedded expressions.
pub const STATE_IDENT: &str = "state";

/// Wire tag marking a state value as raw function code.
pub const FUNCTION_LITERAL_PREFIX: &str = "@function:";
/// Wire tag marking a state value as a method (or getter) definition.
pub const METHOD_LITERAL_PREFIX: &str = "@method:";

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE VALUES
// ═══════════════════════════════════════════════════════════════════════════════

/// One entry of a component's local state.
///
/// On the wire this is any JSON value; strings carrying [`FUNCTION_LITERAL_PREFIX`]
/// or [`METHOD_LITERAL_PREFIX`] become [`StateValue::Function`] / [`StateValue::Method`]
/// with the tag stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum StateValue {
    Literal(Value),
    Function(String),
    Method(String),
}

impl StateValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        StateValue::Literal(value.into())
    }

    pub fn function(code: impl Into<String>) -> Self {
        StateValue::Function(code.into())
    }

    pub fn method(code: impl Into<String>) -> Self {
        StateValue::Method(code.into())
    }

    /// Methods written as `get name() { ... }`.
    pub fn is_getter(&self) -> bool {
        matches!(self, StateValue::Method(code) if code.trim_start().starts_with("get "))
    }
}

impl From<Value> for StateValue {
    fn from(value: Value) -> Self {
        if let Value::String(s) = &value {
            if let Some(code) = s.strip_prefix(FUNCTION_LITERAL_PREFIX) {
                return StateValue::Function(code.to_string());
            }
            if let Some(code) = s.strip_prefix(METHOD_LITERAL_PREFIX) {
                return StateValue::Method(code.to_string());
            }
        }
        StateValue::Literal(value)
    }
}

impl From<StateValue> for Value {
    fn from(value: StateValue) -> Self {
        match value {
            StateValue::Literal(v) => v,
            StateValue::Function(code) => Value::String(format!("{}{}", FUNCTION_LITERAL_PREFIX, code)),
            StateValue::Method(code) => Value::String(format!("{}{}", METHOD_LITERAL_PREFIX, code)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hooks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_mount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub state: IndexMap<String, StateValue>,
    #[serde(default)]
    pub hooks: Hooks,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Component {
            name: name.into(),
            state: IndexMap::new(),
            hooks: Hooks::default(),
            children: Vec::new(),
        }
    }

    pub fn with_state(mut self, key: impl Into<String>, value: StateValue) -> Self {
        self.state.insert(key.into(), value);
        self
    }

    pub fn with_init(mut self, code: impl Into<String>) -> Self {
        self.hooks.init = Some(code.into());
        self
    }

    pub fn with_on_mount(mut self, code: impl Into<String>) -> Self {
        self.hooks.on_mount = Some(code.into());
        self
    }

    pub fn with_child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    pub fn has_state(&self) -> bool {
        !self.state.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.name) {
            return Err(CompileError::InvalidComponentName(self.name.clone()));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub properties: IndexMap<String, String>,
    #[serde(default)]
    pub bindings: IndexMap<String, String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Text content of a text node. A static property wins over a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextContent<'a> {
    Literal(&'a str),
    Expression(&'a str),
}

/// Closed set of node kinds the emitter dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    Fragment,
    For { each: &'a str, for_name: &'a str },
    Show { when: &'a str },
    Text(TextContent<'a>),
    Element,
}

impl Node {
    pub fn element(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::element("div").with_property(TEXT_KEY, value)
    }

    pub fn text_binding(code: impl Into<String>) -> Self {
        Node::element("div").with_binding(TEXT_KEY, code)
    }

    pub fn fragment(children: Vec<Node>) -> Self {
        Node {
            name: FRAGMENT_NODE.to_string(),
            children,
            ..Default::default()
        }
    }

    pub fn for_each(each: impl Into<String>, for_name: impl Into<String>, children: Vec<Node>) -> Self {
        let mut node = Node::element(FOR_NODE)
            .with_binding(EACH_KEY, each)
            .with_binding(FOR_NAME_KEY, for_name);
        node.children = children;
        node
    }

    pub fn show(when: impl Into<String>, children: Vec<Node>) -> Self {
        let mut node = Node::element(SHOW_NODE).with_binding(WHEN_KEY, when);
        node.children = children;
        node
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_binding(mut self, key: impl Into<String>, code: impl Into<String>) -> Self {
        self.bindings.insert(key.into(), code.into());
        self
    }

    pub fn with_child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    /// Classifies the node. Control nodes missing their required bindings are rejected.
    pub fn kind(&self) -> Result<NodeKind<'_>> {
        match self.name.as_str() {
            FRAGMENT_NODE => Ok(NodeKind::Fragment),
            FOR_NODE => Ok(NodeKind::For {
                each: self.required_binding(EACH_KEY)?,
                for_name: self.required_binding(FOR_NAME_KEY)?,
            }),
            SHOW_NODE => Ok(NodeKind::Show {
                when: self.required_binding(WHEN_KEY)?,
            }),
            _ => {
                if let Some(text) = self.properties.get(TEXT_KEY) {
                    Ok(NodeKind::Text(TextContent::Literal(text)))
                } else if let Some(code) = self.bindings.get(TEXT_KEY) {
                    Ok(NodeKind::Text(TextContent::Expression(code)))
                } else {
                    Ok(NodeKind::Element)
                }
            }
        }
    }

    /// A static text node whose text is blank.
    pub fn is_empty_text(&self) -> bool {
        self.properties
            .get(TEXT_KEY)
            .map_or(false, |text| text.trim().is_empty())
    }

    fn required_binding(&self, key: &'static str) -> Result<&str> {
        self.bindings
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CompileError::MissingBinding {
                node: self.name.clone(),
                binding: key,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_value_tags_are_stripped() {
        let component: Component = serde_json::from_value(json!({
            "name": "Counter",
            "state": {
                "count": 0,
                "log": "@function:() => console.log(state.count)",
                "double": "@method:get double() { return state.count * 2 }",
                "label": "plain"
            }
        }))
        .unwrap();

        assert_eq!(component.state["count"], StateValue::literal(0));
        assert_eq!(
            component.state["log"],
            StateValue::function("() => console.log(state.count)")
        );
        assert!(component.state["double"].is_getter());
        assert_eq!(component.state["label"], StateValue::literal("plain"));
    }

    #[test]
    fn test_state_value_serializes_back_to_tagged_string() {
        let value = serde_json::to_value(StateValue::method("inc() {}")).unwrap();
        assert_eq!(value, json!("@method:inc() {}"));
    }

    #[test]
    fn test_state_order_is_preserved() {
        let component: Component = serde_json::from_value(json!({
            "name": "Ordered",
            "state": { "zeta": 1, "alpha": 2, "mid": 3 }
        }))
        .unwrap();
        let keys: Vec<&str> = component.state.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_node_kind_dispatch() {
        assert_eq!(Node::fragment(vec![]).kind().unwrap(), NodeKind::Fragment);
        assert_eq!(
            Node::for_each("items", "item", vec![]).kind().unwrap(),
            NodeKind::For {
                each: "items",
                for_name: "item"
            }
        );
        assert_eq!(
            Node::show("visible", vec![]).kind().unwrap(),
            NodeKind::Show { when: "visible" }
        );
        assert_eq!(
            Node::text("hi").kind().unwrap(),
            NodeKind::Text(TextContent::Literal("hi"))
        );
        assert_eq!(Node::element("Unknown").kind().unwrap(), NodeKind::Element);
    }

    #[test]
    fn test_control_nodes_require_bindings() {
        let err = Node::element("For")
            .with_binding("each", "items")
            .kind()
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::MissingBinding { binding: "_forName", .. }
        ));

        let err = Node::element("Show").kind().unwrap_err();
        assert!(matches!(err, CompileError::MissingBinding { binding: "when", .. }));
    }

    #[test]
    fn test_component_name_validation() {
        assert!(Component::new("MyComponent").validate().is_ok());
        assert!(matches!(
            Component::new("my-component").validate(),
            Err(CompileError::InvalidComponentName(_))
        ));
    }
}
