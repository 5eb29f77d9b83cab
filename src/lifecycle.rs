//! Lifecycle hook translation.
//!
//! `init` runs once, synchronously, on the first render. `onMount` runs after the
//! first commit as an effect with an empty dependency list.

use crate::binding::process_binding;
use crate::error::Result;
use crate::ir::Component;
use crate::options::Options;

pub const INIT_FLAG: &str = "initPending";

/// Guarded first-render block, or `None` when the component has no `init` hook.
pub fn init_block(component: &Component, options: &Options) -> Result<Option<String>> {
    let Some(body) = non_empty(component.hooks.init.as_deref()) else {
        return Ok(None);
    };
    let body = process_binding(body, options)?;
    Ok(Some(format!(
        "const [{flag}, setInitPending] = useState(true);\nif ({flag}) {{\n  setInitPending(false);\n  {body}\n}}",
        flag = INIT_FLAG,
        body = body.trim()
    )))
}

pub fn mount_effect(component: &Component, options: &Options) -> Result<Option<String>> {
    let Some(body) = non_empty(component.hooks.on_mount.as_deref()) else {
        return Ok(None);
    };
    let body = process_binding(body, options)?;
    Ok(Some(format!(
        "useEffect(() => {{\n  {}\n}}, []);",
        body.trim()
    )))
}

fn non_empty(code: Option<&str>) -> Option<&str> {
    code.filter(|code| !code.trim().is_empty())
}
