#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::compiler::{compile, compile_json, compile_with_formatter};
    use crate::error::CompileError;
    use crate::format::{FormatError, Formatter};
    use crate::ir::{Component, Node, StateValue};
    use crate::options::{Options, StateType, StylesType};
    use crate::plugins::{Plugin, PluginResult, PluginStage};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw() -> Options {
        Options::default().with_prettier(false)
    }

    fn counter() -> Component {
        Component::new("Counter")
            .with_state("count", StateValue::literal(0))
            .with_child(
                Node::element("button")
                    .with_binding("onClick", "state.count = state.count + 1")
                    .with_child(Node::text_binding("state.count")),
            )
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATE STRATEGIES
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_use_state_counter() {
        let out = compile(&counter(), &raw().with_state_type(StateType::UseState)).unwrap();
        assert_eq!(
            out,
            "import { useState } from 'react';\n\
             \n\
             export default function Counter(props) {\n\
             const [count, setCount] = useState(() => (0));\n\
             return (<>\n\
             <button onClick={event => (setCount(count + 1))}>{count}</button>\n\
             </>);\n\
             }\n"
        );
    }

    #[test]
    fn test_mobx_counter() {
        let out = compile(&counter(), &raw()).unwrap();
        assert_eq!(
            out,
            "import { useLocalObservable } from 'mobx-react-lite';\n\
             \n\
             export default function Counter(props) {\n\
             const state = useLocalObservable(() => ({ count: 0 }));\n\
             return (<>\n\
             <button onClick={event => (state.count = state.count + 1)}>{state.count}</button>\n\
             </>);\n\
             }\n"
        );
    }

    #[test]
    fn test_strategy_imports() {
        let cases = [
            (StateType::Valtio, "import { useLocalProxy } from 'valtio/utils';", "useLocalProxy({ count: 0 })"),
            (StateType::Solid, "import { useMutable } from 'react-solid-state';", "useMutable({ count: 0 })"),
            (StateType::Builder, "import { useBuilderState } from '@builder.io/react';", "useBuilderState({ count: 0 })"),
        ];
        for (state_type, import, call) in cases {
            let out = compile(&counter(), &raw().with_state_type(state_type)).unwrap();
            assert!(out.contains(import), "missing import in:\n{}", out);
            assert!(out.contains(&format!("const state = {};", call)), "missing state in:\n{}", out);
            assert!(!out.contains("useState"));
        }
    }

    #[test]
    fn test_getters_under_use_state() {
        let component = Component::new("Greeting")
            .with_state("first", StateValue::literal("Ada"))
            .with_state("full", StateValue::method("get full() { return state.first + '!' }"))
            .with_child(Node::element("h1").with_child(Node::text_binding("state.full")));
        let out = compile(&component, &raw().with_state_type(StateType::UseState)).unwrap();
        assert!(out.contains("const [first, setFirst] = useState(() => (\"Ada\"));"));
        assert!(out.contains("function full() { return first + '!' }"));
        assert!(out.contains("<h1>{full()}</h1>"));
        assert!(!out.contains("setFull"));
    }

    #[test]
    fn test_strings_and_comments_keep_state_text() {
        let component = Component::new("Label")
            .with_state("name", StateValue::literal("x"))
            .with_child(Node::text_binding("'state.name: ' + state.name /* state.name */"));
        let out = compile(&component, &raw().with_state_type(StateType::UseState)).unwrap();
        assert!(out.contains("{'state.name: ' + name /* state.name */}"));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REFERENCES & LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_refs_and_mount_effect() {
        let component = Component::new("Focus")
            .with_on_mount("inputEl.focus()")
            .with_child(Node::element("input").with_binding("ref", "inputEl"));
        let out = compile(&component, &raw()).unwrap();
        assert_eq!(
            out,
            "import { useRef } from 'react';\n\
             import { useEffect } from 'react';\n\
             \n\
             export default function Focus(props) {\n\
             const inputEl = useRef();\n\
             useEffect(() => {\n  inputEl.current.focus()\n}, []);\n\
             return (<>\n\
             <input ref={inputEl} />\n\
             </>);\n\
             }\n"
        );
    }

    #[test]
    fn test_loop_variable_named_like_ref() {
        let component = Component::new("Rows")
            .with_child(Node::element("input").with_binding("ref", "el"))
            .with_child(Node::for_each("items", "el", vec![Node::text_binding("el.name")]))
            .with_child(Node::element("ul").with_binding("title", "list.map(el => el.id)"));
        let out = compile(&component, &raw()).unwrap();
        assert!(out.contains("{items.map(el => (<>{el.name}</>))}"), "got:\n{}", out);
        assert!(out.contains("title={list.map(el => el.id)}"));
        assert!(!out.contains("el.current"));

        // Still valid source once reprinted.
        assert!(compile(&component, &Options::default()).is_ok());
    }

    #[test]
    fn test_init_block_imports_use_state() {
        let component = Component::new("Boot")
            .with_state("ready", StateValue::literal(false))
            .with_init("state.ready = true");
        let out = compile(&component, &raw()).unwrap();
        assert!(out.contains("import { useState } from 'react';"));
        assert!(out.contains("const state = useLocalObservable(() => ({ ready: false }));"));
        assert!(out.contains("const [initPending, setInitPending] = useState(true);"));
        assert!(out.contains("setInitPending(false);\n  state.ready = true\n}"));

        let hooked = compile(&component, &raw().with_state_type(StateType::UseState)).unwrap();
        assert!(hooked.contains("setInitPending(false);\n  setReady(true)\n}"));
    }

    #[test]
    fn test_no_imports_without_features() {
        let component = Component::new("Static").with_child(Node::element("p").with_child(Node::text("hi")));
        let out = compile(&component, &raw()).unwrap();
        assert_eq!(
            out,
            "export default function Static(props) {\nreturn (<>\n<p>hi</p>\n</>);\n}\n"
        );
        assert!(!out.contains("import"));
    }

    #[test]
    fn test_use_state_import_requires_hook_declarations() {
        let options = raw().with_state_type(StateType::UseState);

        let out = compile(&Component::new("Bare"), &options).unwrap();
        assert!(!out.contains("useState"));

        let methods_only = Component::new("Helpers")
            .with_state("hi", StateValue::method("hi() { return 1 }"))
            .with_child(Node::text_binding("state.hi()"));
        let out = compile(&methods_only, &options).unwrap();
        assert!(!out.contains("import"), "unexpected import in:\n{}", out);
        assert!(out.contains("function hi() { return 1 }"));
        assert!(out.contains("{hi()}"));
    }

    #[test]
    fn test_empty_component() {
        let out = compile(&Component::new("Empty"), &raw()).unwrap();
        assert_eq!(out, "export default function Empty(props) {\nreturn (<></>);\n}\n");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONTROL FLOW
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_for_and_show_lowering() {
        let component = Component::new("List")
            .with_state("items", StateValue::literal(json!([])))
            .with_state("visible", StateValue::literal(true))
            .with_child(Node::show(
                "state.visible",
                vec![Node::element("ul").with_child(Node::for_each(
                    "state.items",
                    "item",
                    vec![Node::element("li").with_child(Node::text_binding("item"))],
                ))],
            ));
        let out = compile(&component, &raw().with_state_type(StateType::UseState)).unwrap();
        assert!(out.contains(
            "{Boolean(visible) && (<><ul>{items.map(item => (<><li>{item}</li></>))}</ul></>)}"
        ));
    }

    #[test]
    fn test_inner_html_is_mapped() {
        let component = Component::new("Html")
            .with_child(Node::element("div").with_binding("innerHTML", "props.html"));
        let out = compile(&component, &raw()).unwrap();
        assert!(out.contains("dangerouslySetInnerHTML={{\"__html\": props.html}}"));
        assert!(!out.contains("innerHTML"));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PURITY & DETERMINISM
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_input_is_not_mutated() {
        let component = counter()
            .with_on_mount("inputEl.focus()")
            .with_child(Node::element("input").with_binding("ref", "inputEl"));
        let before = component.clone();
        let options = raw().with_state_type(StateType::UseState);
        let first = compile(&component, &options).unwrap();
        assert_eq!(component, before);
        let second = compile(&component, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_formatted_output_is_deterministic() {
        let options = Options::default().with_state_type(StateType::UseState);
        let first = compile(&counter(), &options).unwrap();
        let second = compile(&counter(), &options).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("setCount(count + 1)"));
        assert!(first.contains("export default function Counter(props)"));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STYLES
    // ═══════════════════════════════════════════════════════════════════════════

    fn styled() -> Component {
        Component::new("Card").with_child(
            Node::element("div")
                .with_binding("css", "{ color: 'red', marginTop: 4 }")
                .with_child(Node::text("body")),
        )
    }

    #[test]
    fn test_emotion_keeps_inline_css() {
        let out = compile(&styled(), &raw()).unwrap();
        assert!(out.starts_with("/** @jsx jsx */\nimport { jsx } from '@emotion/react';\n"));
        assert!(out.contains("<div css={{ color: 'red', marginTop: 4 }}>body</div>"));
    }

    #[test]
    fn test_styled_jsx_collects_rules() {
        let out = compile(&styled(), &raw().with_styles_type(StylesType::StyledJsx)).unwrap();
        assert!(out.contains("<div className=\"div-"));
        assert!(out.contains("<style jsx>{`\n.div-"));
        assert!(out.contains("color: red;"));
        assert!(out.contains("margin-top: 4;"));
        assert!(!out.contains("css="));
        assert!(!out.contains("@emotion"));
    }

    #[test]
    fn test_styled_components_prelude() {
        let out = compile(&styled(), &raw().with_styles_type(StylesType::StyledComponents)).unwrap();
        assert!(out.starts_with("import styled from 'styled-components';\n\nconst StyledDiv = styled.div`\n"));
        assert!(out.contains("<StyledDiv>body</StyledDiv>"));
        assert!(!out.contains("css="));
    }

    #[test]
    fn test_collected_css_survives_formatting() {
        let component = Component::new("Quote").with_child(
            Node::element("q").with_binding("css", r#"{ content: '"`"', quotes: '${x}' }"#),
        );
        for styles_type in [StylesType::StyledJsx, StylesType::StyledComponents] {
            let options = Options::default().with_styles_type(styles_type);
            assert!(compile(&component, &options).is_ok(), "{:?} failed to format", styles_type);
        }
    }

    #[test]
    fn test_styled_void_element_self_closes() {
        let component = Component::new("Avatar").with_child(
            Node::element("img")
                .with_property("src", "/me.png")
                .with_binding("css", "{ borderRadius: '50%' }"),
        );
        let out = compile(&component, &raw().with_styles_type(StylesType::StyledComponents)).unwrap();
        assert!(out.contains("const StyledImg = styled.img`"));
        assert!(out.contains("<StyledImg src=\"/me.png\" />"));
        assert!(!out.contains("</StyledImg>"));
    }

    #[test]
    fn test_dynamic_css_value_is_rejected() {
        let component = Component::new("Card")
            .with_child(Node::element("div").with_binding("css", "{ color: props.color }"));
        let err = compile(&component, &raw().with_styles_type(StylesType::StyledJsx)).unwrap_err();
        assert!(matches!(err, CompileError::Style { .. }));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLUGINS & FORMATTING
    // ═══════════════════════════════════════════════════════════════════════════

    struct AddsState;

    impl Plugin for AddsState {
        fn name(&self) -> &str {
            "adds-state"
        }

        fn pre_json(&self, component: Component) -> PluginResult<Component> {
            Ok(component.with_state("extra", StateValue::literal(1)))
        }

        fn post_code(&self, code: String) -> PluginResult<String> {
            Ok(format!("// generated\n{}", code))
        }
    }

    struct Rejects;

    impl Plugin for Rejects {
        fn name(&self) -> &str {
            "rejects"
        }

        fn pre_code(&self, _code: String) -> PluginResult<String> {
            Err("refusing to emit".into())
        }
    }

    #[test]
    fn test_plugins_run_in_stages() {
        let options = raw()
            .with_state_type(StateType::UseState)
            .with_plugin(Arc::new(AddsState));
        let out = compile(&Component::new("Plain"), &options).unwrap();
        assert!(out.starts_with("// generated\nimport { useState } from 'react';"));
        assert!(out.contains("const [extra, setExtra] = useState(() => (1));"));
    }

    #[test]
    fn test_plugin_failure_aborts() {
        let options = raw().with_plugin(Arc::new(AddsState)).with_plugin(Arc::new(Rejects));
        match compile(&Component::new("Plain"), &options) {
            Err(CompileError::Plugin { plugin, stage, message }) => {
                assert_eq!(plugin, "rejects");
                assert_eq!(stage, PluginStage::PreCode);
                assert_eq!(message, "refusing to emit");
            }
            other => panic!("expected plugin error, got {:?}", other),
        }
    }

    struct Broken;

    impl Formatter for Broken {
        fn format(&self, _source: &str) -> Result<String, FormatError> {
            Err(FormatError::new("unexpected token"))
        }
    }

    #[test]
    fn test_format_failure_propagates() {
        let err = compile_with_formatter(&counter(), &Options::default(), &Broken).unwrap_err();
        assert_eq!(err.code(), "RX-ERR-FORMAT-001");
        assert!(err.to_string().contains("unexpected token"));

        // Formatting is skipped entirely when disabled.
        assert!(compile_with_formatter(&counter(), &raw(), &Broken).is_ok());
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENTRY VALIDATION
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_invalid_component_name() {
        let err = compile(&Component::new("my-card"), &raw()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidComponentName(ref name) if name == "my-card"));
    }

    #[test]
    fn test_malformed_binding_fails_compile() {
        let component = counter().with_child(Node::element("p").with_binding("title", "state.count = = 2"));
        let err = compile(&component, &raw().with_state_type(StateType::UseState)).unwrap_err();
        assert_eq!(err.code(), "RX-ERR-EXPR-001");
    }

    #[test]
    fn test_compile_json() {
        let component = json!({
            "name": "Counter",
            "state": { "count": 0 },
            "children": [{
                "name": "button",
                "bindings": { "onClick": "state.count = state.count + 1" },
                "children": [{ "name": "div", "bindings": { "_text": "state.count" } }]
            }]
        });
        let out = compile_json(
            &component.to_string(),
            r#"{"stateType": "useState", "prettier": false}"#,
        )
        .unwrap();
        assert_eq!(out, compile(&counter(), &raw().with_state_type(StateType::UseState)).unwrap());

        assert!(matches!(compile_json("{", ""), Err(CompileError::Json(_))));
    }
}
