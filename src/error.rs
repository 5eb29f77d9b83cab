use thiserror::Error;

use crate::format::FormatError;
use crate::plugins::PluginStage;

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_EXPRESSION_SYNTAX: &str = "RX-ERR-EXPR-001";
pub const ERR_MISSING_BINDING: &str = "RX-ERR-NODE-001";
pub const ERR_COMPONENT_NAME: &str = "RX-ERR-NAME-001";
pub const ERR_STYLE: &str = "RX-ERR-STYLE-001";
pub const ERR_PLUGIN: &str = "RX-ERR-PLUGIN-001";
pub const ERR_FORMAT: &str = "RX-ERR-FORMAT-001";
pub const ERR_JSON: &str = "RX-ERR-JSON-001";

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Embedded code that oxc could not parse.
    #[error("cannot parse embedded code `{code}`: {message}")]
    Expression { code: String, message: String },

    #[error("`{node}` node is missing its required `{binding}` binding")]
    MissingBinding { node: String, binding: &'static str },

    #[error("component name `{0}` is not a valid identifier")]
    InvalidComponentName(String),

    #[error("cannot collect styles of <{node}>: {message}")]
    Style { node: String, message: String },

    #[error("plugin `{plugin}` failed during {stage}: {message}")]
    Plugin {
        plugin: String,
        stage: PluginStage,
        message: String,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Expression { .. } => ERR_EXPRESSION_SYNTAX,
            CompileError::MissingBinding { .. } => ERR_MISSING_BINDING,
            CompileError::InvalidComponentName(_) => ERR_COMPONENT_NAME,
            CompileError::Style { .. } => ERR_STYLE,
            CompileError::Plugin { .. } => ERR_PLUGIN,
            CompileError::Format(_) => ERR_FORMAT,
            CompileError::Json(_) => ERR_JSON,
        }
    }

    /// The invariant the failed input violated.
    pub fn guarantee(&self) -> &'static str {
        match self {
            CompileError::Expression { .. } => {
                "Every binding and hook body is a parseable expression or statement list."
            }
            CompileError::MissingBinding { .. } => {
                "For nodes carry `each` and `_forName`; Show nodes carry `when`."
            }
            CompileError::InvalidComponentName(_) => "Component names are valid identifiers.",
            CompileError::Style { .. } => {
                "Collected styles are static object literals of string or number values."
            }
            CompileError::Plugin { .. } => "Plugins are total over their payload.",
            CompileError::Format(_) => "Generated source is syntactically valid.",
            CompileError::Json(_) => "Inputs are well-formed JSON documents.",
        }
    }

    pub(crate) fn expression(code: &str, message: impl Into<String>) -> Self {
        CompileError::Expression {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn style(node: &str, message: impl Into<String>) -> Self {
        CompileError::Style {
            node: node.to_string(),
            message: message.into(),
        }
    }
}
