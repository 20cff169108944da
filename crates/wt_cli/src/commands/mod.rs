use wt_syntax::{Diagnostic, ScriptSource, Severity, render_diagnostic};

pub(crate) mod ast;
pub(crate) mod check;
pub(crate) mod eval;
pub(crate) mod exec;
pub(crate) mod run;

pub(crate) fn load_source(path: &str) -> Result<ScriptSource, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    Ok(ScriptSource::new(path, text))
}

pub(crate) fn emit_diagnostics(source: &ScriptSource, diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        eprintln!("{}", render_diagnostic(source, d));
    }
}

pub(crate) fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}
