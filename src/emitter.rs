use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use crate::binding::process_binding;
use crate::error::Result;
use crate::expression::expect_expression;
use crate::ir::{
    Node, NodeKind, TextContent, CSS_KEY, FOR_NAME_KEY, SPREAD_KEY, TEXT_KEY,
};
use crate::options::Options;

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC TABLES
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    /// Void elements. Emitted as `<tag ... />`, children are never rendered.
    static ref SELF_CLOSING_TAGS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("area");
        s.insert("base");
        s.insert("br");
        s.insert("col");
        s.insert("embed");
        s.insert("hr");
        s.insert("img");
        s.insert("input");
        s.insert("link");
        s.insert("meta");
        s.insert("param");
        s.insert("source");
        s.insert("track");
        s.insert("wbr");
        s
    };

    /// Bindings whose target attribute differs from the IR key.
    static ref SPECIAL_BINDINGS: HashMap<&'static str, SpecialBinding> = {
        let mut m = HashMap::new();
        m.insert("innerHTML", SpecialBinding::RawHtml);
        m
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialBinding {
    RawHtml,
}

impl SpecialBinding {
    fn emit(self, value: &str) -> String {
        match self {
            SpecialBinding::RawHtml => format!(" dangerouslySetInnerHTML={{{{\"__html\": {}}}}}", value),
        }
    }
}

pub fn is_self_closing(tag: &str) -> bool {
    SELF_CLOSING_TAGS.contains(tag)
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE EMISSION
// ═══════════════════════════════════════════════════════════════════════════════

pub fn emit_node(node: &Node, options: &Options) -> Result<String> {
    Emitter::new(options).emit_node(node)
}

/// Emits sibling nodes joined by newlines.
pub fn emit_children(children: &[Node], options: &Options) -> Result<String> {
    Emitter::new(options).emit_children(children)
}

pub struct Emitter<'e> {
    options: &'e Options,
    /// Generated component names that replace void elements.
    void_components: Option<&'e HashSet<String>>,
}

impl<'e> Emitter<'e> {
    pub fn new(options: &'e Options) -> Self {
        Emitter {
            options,
            void_components: None,
        }
    }

    pub fn with_void_components(mut self, names: &'e HashSet<String>) -> Self {
        self.void_components = Some(names);
        self
    }

    pub fn emit_node(&self, node: &Node) -> Result<String> {
        match node.kind()? {
            NodeKind::Fragment => {
                if !node.bindings.is_empty() {
                    tracing::warn!(
                        bindings = node.bindings.len(),
                        "ignoring bindings on Fragment node"
                    );
                }
                Ok(format!("<>{}</>", self.emit_children(&node.children)?))
            }
            NodeKind::For { each, for_name } => Ok(format!(
                "{{{}.map({} => (<>{}</>))}}",
                self.process(each)?,
                for_name.trim(),
                self.emit_block_children(&node.children)?
            )),
            NodeKind::Show { when } => Ok(format!(
                "{{Boolean({}) && (<>{}</>)}}",
                self.process(when)?,
                self.emit_block_children(&node.children)?
            )),
            NodeKind::Text(TextContent::Literal(text)) => Ok(text.to_string()),
            NodeKind::Text(TextContent::Expression(code)) => {
                Ok(format!("{{{}}}", self.process(code)?))
            }
            NodeKind::Element => self.emit_element(node),
        }
    }

    pub fn emit_children(&self, children: &[Node]) -> Result<String> {
        let emitted = children
            .iter()
            .map(|child| self.emit_node(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(emitted.join("\n"))
    }

    /// Loop and conditional bodies drop whitespace-only text.
    fn emit_block_children(&self, children: &[Node]) -> Result<String> {
        let emitted = children
            .iter()
            .filter(|child| !child.is_empty_text())
            .map(|child| self.emit_node(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(emitted.join("\n"))
    }

    fn process(&self, code: &str) -> Result<String> {
        process_binding(code, self.options)
    }

    fn is_void(&self, name: &str) -> bool {
        is_self_closing(name) || self.void_components.map_or(false, |names| names.contains(name))
    }

    fn emit_element(&self, node: &Node) -> Result<String> {
        let mut out = format!("<{}", node.name);

        for (key, value) in &node.properties {
            out.push_str(&format!(" {}=\"{}\"", key, escape_attribute(value)));
        }

        if let Some(spread) = node.bindings.get(SPREAD_KEY) {
            out.push_str(&format!(" {{...{}}}", self.process(spread)?));
        }

        for (key, code) in &node.bindings {
            if matches!(key.as_str(), SPREAD_KEY | FOR_NAME_KEY | TEXT_KEY) {
                continue;
            }
            let value = self.process(code)?;
            if key == CSS_KEY && value.trim() == "{}" {
                continue;
            }
            if is_event_binding(key) {
                // The handler body sits in `event => (...)`, so it must be one expression.
                let handler = value.trim().trim_end_matches(';').trim_end();
                expect_expression(handler)?;
                out.push_str(&format!(" {}={{event => ({})}}", key, handler));
            } else if let Some(special) = SPECIAL_BINDINGS.get(key.as_str()) {
                out.push_str(&special.emit(&value));
            } else {
                out.push_str(&format!(" {}={{{}}}", key, value));
            }
        }

        if self.is_void(&node.name) {
            out.push_str(" />");
            return Ok(out);
        }

        out.push('>');
        out.push_str(&self.emit_children(&node.children)?);
        out.push_str(&format!("</{}>", node.name));
        Ok(out)
    }
}

fn is_event_binding(key: &str) -> bool {
    key.len() > 2 && key.starts_with("on")
}

fn escape_attribute(value: &str) -> String {
    value.replace('"', "&quot;")
}
