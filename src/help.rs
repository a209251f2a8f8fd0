//! Help text generated from the parameter declarations.

use std::fmt::Write;

use crate::config::schema::{lookup, ParamDecl, ParamValue, PARAMETERS};
use crate::{TASK_NAME, TASK_VERSION};

/// Help for every parameter, headed by the task name and version.
pub fn render_help() -> String {
    let width = PARAMETERS.iter().map(|decl| decl.name.len()).max().unwrap_or(0);
    let mut out = format!("{TASK_NAME} {TASK_VERSION}\n\nParameters:\n");
    for decl in PARAMETERS {
        render_entry(&mut out, decl, width);
    }
    out
}

/// Help for one parameter, or `None` if the name is not declared.
pub fn help_for(name: &str) -> Option<String> {
    let decl = lookup(name)?;
    let mut out = String::new();
    render_entry(&mut out, decl, decl.name.len());
    Some(out)
}

fn render_entry(out: &mut String, decl: &ParamDecl, width: usize) {
    let default = match decl.default.to_value() {
        ParamValue::Str(s) => format!("{s:?}"),
        other => other.to_string(),
    };
    // Writing into a String cannot fail.
    let _ = writeln!(out, "  {:<width$}  {} (default: {default})", decl.name, decl.kind);
    let _ = writeln!(out, "  {:<width$}  {}", "", decl.description);
    if !decl.allowed.is_empty() {
        let _ = writeln!(out, "  {:<width$}  choices: {}", "", decl.allowed.join(", "));
    }
}
