//! Compile orchestration.
//!
//! `compile` never mutates its input: every rewrite pass works on a clone, so the
//! same component can be compiled repeatedly (or for several targets) with
//! identical results.

use crate::emitter::Emitter;
use crate::error::Result;
use crate::format::{Formatter, OxcFormatter};
use crate::ir::Component;
use crate::lifecycle::{init_block, mount_effect};
use crate::mutation::{getters_to_functions, rewrite_component_mutations};
use crate::options::Options;
use crate::plugins::{run_code_stage, run_json_stage, PluginStage};
use crate::refs::{discover_refs, map_refs, ref_declarations};
use crate::state::state_declarations;
use crate::styles::collect_styles;

/// Compiles `component` into a module with a default-exported function component.
pub fn compile(component: &Component, options: &Options) -> Result<String> {
    compile_with_formatter(component, options, &OxcFormatter)
}

/// Same as [`compile`], formatting with `formatter` when `options.prettier` is set.
pub fn compile_with_formatter<F>(component: &Component, options: &Options, formatter: &F) -> Result<String>
where
    F: Formatter + ?Sized,
{
    component.validate()?;
    tracing::debug!(
        component = %component.name,
        state_type = ?options.state_type,
        styles_type = ?options.styles_type,
        "compiling component"
    );

    let mut json = run_json_stage(&options.plugins, PluginStage::PreJson, component.clone())?;

    if options.uses_state_hooks() {
        getters_to_functions(&mut json)?;
        rewrite_component_mutations(&mut json)?;
    }

    let refs = discover_refs(&json);
    let has_state = json.has_state();
    map_refs(&mut json, &refs)?;

    let styles = collect_styles(&mut json, options)?;
    let state = state_declarations(&json, options)?;

    let json = run_json_stage(&options.plugins, PluginStage::PostJson, json)?;

    let init = init_block(&json, options)?;
    let mount = mount_effect(&json, options)?;

    // ─── imports ───
    let mut imports = Vec::new();
    if state.contains("useState(") || init.is_some() {
        imports.push("import { useState } from 'react';".to_string());
    }
    if !refs.is_empty() {
        imports.push("import { useRef } from 'react';".to_string());
    }
    if mount.is_some() {
        imports.push("import { useEffect } from 'react';".to_string());
    }
    if has_state {
        if let Some((hook, module)) = options.state_type.object_hook() {
            imports.push(format!("import {{ {} }} from '{}';", hook, module));
        }
    }
    imports.extend(styles.imports.iter().cloned());

    // ─── body ───
    let mut rendered = Vec::new();
    let children = Emitter::new(options)
        .with_void_components(&styles.void_components)
        .emit_children(&json.children)?;
    if !children.is_empty() {
        rendered.push(children);
    }
    if !styles.style_element.is_empty() {
        rendered.push(styles.style_element.clone());
    }
    let fragment = if rendered.is_empty() {
        "<></>".to_string()
    } else {
        format!("<>\n{}\n</>", rendered.join("\n"))
    };

    let mut code = String::new();
    if !imports.is_empty() {
        code.push_str(&imports.join("\n"));
        code.push_str("\n\n");
    }
    if !styles.prelude.is_empty() {
        code.push_str(&styles.prelude);
        code.push_str("\n\n");
    }
    code.push_str(&format!("export default function {}(props) {{\n", json.name));
    let handles = ref_declarations(&refs);
    for section in [Some(state), Some(handles), init, mount].into_iter().flatten() {
        if !section.is_empty() {
            code.push_str(&section);
            code.push('\n');
        }
    }
    code.push_str(&format!("return ({});\n}}\n", fragment));

    let code = run_code_stage(&options.plugins, PluginStage::PreCode, code)?;

    let code = if options.prettier {
        match formatter.format(&code) {
            Ok(formatted) => formatted,
            Err(err) => {
                let serialized = serde_json::to_string(component)
                    .unwrap_or_else(|e| format!("<unserializable component: {}>", e));
                tracing::error!(
                    source = %code,
                    component = %serialized,
                    "failed to format generated component"
                );
                return Err(err.into());
            }
        }
    } else {
        code
    };

    run_code_stage(&options.plugins, PluginStage::PostCode, code)
}

/// JSON entry point: both arguments are serialized wire documents.
pub fn compile_json(component_json: &str, options_json: &str) -> Result<String> {
    let component: Component = serde_json::from_str(component_json)?;
    let options = if options_json.trim().is_empty() {
        Options::default()
    } else {
        Options::from_json(options_json)?
    };
    compile(&component, &options)
}
