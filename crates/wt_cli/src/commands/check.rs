use crate::args::CliArgs;

use super::{emit_diagnostics, has_errors, load_source};

pub(crate) fn run(cli: &CliArgs) -> i32 {
    let Some(path) = cli.positional.first() else {
        eprintln!("Missing <file>");
        return 2;
    };
    let source = match load_source(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };
    let parsed = wt_parser::parse_script(source.as_str());
    if !cli.no_diags {
        emit_diagnostics(&source, &parsed.diagnostics);
    }
    if has_errors(&parsed.diagnostics) { 1 } else { 0 }
}
