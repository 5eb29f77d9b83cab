//! Compile options.
//!
//! Options deserialize from the same camelCase JSON the JS tooling passes in:
//! `{"stateType": "useState", "stylesType": "styled-jsx", "prettier": false}`.
//! Plugins are code-only and never round-trip through JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::plugins::Plugin;

/// How component state is represented in the emitted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    /// One `useState` pair per state field.
    #[serde(rename = "useState")]
    UseState,
    #[default]
    Mobx,
    Valtio,
    Solid,
    Builder,
}

impl StateType {
    /// Factory hook and module for the single-object strategies.
    pub fn object_hook(self) -> Option<(&'static str, &'static str)> {
        match self {
            StateType::UseState => None,
            StateType::Mobx => Some(("useLocalObservable", "mobx-react-lite")),
            StateType::Valtio => Some(("useLocalProxy", "valtio/utils")),
            StateType::Solid => Some(("useMutable", "react-solid-state")),
            StateType::Builder => Some(("useBuilderState", "@builder.io/react")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylesType {
    #[default]
    Emotion,
    StyledComponents,
    StyledJsx,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub prettier: bool,
    pub styles_type: StylesType,
    pub state_type: StateType,
    #[serde(skip)]
    pub plugins: Vec<Arc<dyn Plugin>>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            prettier: true,
            styles_type: StylesType::default(),
            state_type: StateType::default(),
            plugins: Vec::new(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("Options")
            .field("prettier", &self.prettier)
            .field("styles_type", &self.styles_type)
            .field("state_type", &self.state_type)
            .field("plugins", &plugins)
            .finish()
    }
}

impl Options {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_state_type(mut self, state_type: StateType) -> Self {
        self.state_type = state_type;
        self
    }

    pub fn with_styles_type(mut self, styles_type: StylesType) -> Self {
        self.styles_type = styles_type;
        self
    }

    pub fn with_prettier(mut self, prettier: bool) -> Self {
        self.prettier = prettier;
        self
    }

    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn uses_state_hooks(&self) -> bool {
        self.state_type == StateType::UseState
    }
}
