use crate::{Diagnostic, ScriptSource};

pub fn render_diagnostic(source: &ScriptSource, diag: &Diagnostic) -> String {
    match diag.span {
        Some(span) => {
            let (line, col) = source.line_col(span.start);
            let mut out = String::new();
            out.push_str(&format!(
                "{:?}:{}:{}: {}: {}",
                diag.severity,
                line,
                col,
                source.origin(),
                diag.message
            ));
            out.push('\n');
            out.push_str("  | ");
            out.push_str(source.line_text(line));
            out.push('\n');
            out.push_str("  | ");
            out.extend(std::iter::repeat_n(' ', (col - 1) as usize));
            out.push('^');
            if let Some(h) = &diag.help {
                out.push('\n');
                out.push_str("  = help: ");
                out.push_str(h);
            }
            out
        }
        None => {
            let mut out = format!("{:?}: {}: {}", diag.severity, source.origin(), diag.message);
            if let Some(h) = &diag.help {
                out.push('\n');
                out.push_str("  = help: ");
                out.push_str(h);
            }
            out
        }
    }
}

pub fn render_diagnostics(source: &ScriptSource, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for (idx, d) in diagnostics.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&render_diagnostic(source, d));
    }
    out
}
