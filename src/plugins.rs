//! Plugin pipeline.
//!
//! Four extension points wrap generation, in this order:
//! 1. `pre_json`  : Component → Component, before any preprocessing
//! 2. `post_json` : Component → Component, after preprocessing, before emission
//! 3. `pre_code`  : String → String, on the assembled unformatted source
//! 4. `post_code` : String → String, on the final (possibly formatted) source
//!
//! Plugins run in list order. The first failure aborts the compile call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{CompileError, Result};
use crate::ir::Component;

pub type PluginResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn pre_json(&self, component: Component) -> PluginResult<Component> {
        Ok(component)
    }

    fn post_json(&self, component: Component) -> PluginResult<Component> {
        Ok(component)
    }

    fn pre_code(&self, code: String) -> PluginResult<String> {
        Ok(code)
    }

    fn post_code(&self, code: String) -> PluginResult<String> {
        Ok(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginStage {
    PreJson,
    PostJson,
    PreCode,
    PostCode,
}

impl fmt::Display for PluginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginStage::PreJson => "pre-json",
            PluginStage::PostJson => "post-json",
            PluginStage::PreCode => "pre-code",
            PluginStage::PostCode => "post-code",
        };
        f.write_str(name)
    }
}

pub fn run_json_stage(
    plugins: &[Arc<dyn Plugin>],
    stage: PluginStage,
    mut component: Component,
) -> Result<Component> {
    for plugin in plugins {
        let outcome = match stage {
            PluginStage::PreJson => plugin.pre_json(component),
            PluginStage::PostJson => plugin.post_json(component),
            PluginStage::PreCode | PluginStage::PostCode => {
                unreachable!("code stage {} routed to run_json_stage", stage)
            }
        };
        component = outcome.map_err(|err| plugin_error(plugin.as_ref(), stage, err))?;
        tracing::debug!(plugin = plugin.name(), %stage, "plugin applied");
    }
    Ok(component)
}

pub fn run_code_stage(
    plugins: &[Arc<dyn Plugin>],
    stage: PluginStage,
    mut code: String,
) -> Result<String> {
    for plugin in plugins {
        let outcome = match stage {
            PluginStage::PreCode => plugin.pre_code(code),
            PluginStage::PostCode => plugin.post_code(code),
            PluginStage::PreJson | PluginStage::PostJson => {
                unreachable!("json stage {} routed to run_code_stage", stage)
            }
        };
        code = outcome.map_err(|err| plugin_error(plugin.as_ref(), stage, err))?;
        tracing::debug!(plugin = plugin.name(), %stage, "plugin applied");
    }
    Ok(code)
}

fn plugin_error(
    plugin: &dyn Plugin,
    stage: PluginStage,
    err: Box<dyn std::error::Error + Send + Sync>,
) -> CompileError {
    CompileError::Plugin {
        plugin: plugin.name().to_string(),
        stage,
        message: err.to_string(),
    }
}
