use std::io::Write;

use wt_runtime::{DispatchEngine, PartSpec, RuntimeConfig, ScriptTarget, Value};

use crate::args::CliArgs;

use super::{emit_diagnostics, has_errors, load_source};

/// `wt run <file> [message [arg...]]` — compile the script and deliver one
/// message to it, then print everything its handlers `put`.
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
    if has_errors(&parsed.diagnostics) {
        return 1;
    }

    let message = cli
        .positional
        .get(1)
        .map(String::as_str)
        .unwrap_or("startup");
    let args: Vec<Value> = cli
        .positional
        .iter()
        .skip(2)
        .map(|a| Value::new(a.as_str()))
        .collect();

    let engine = DispatchEngine::new(RuntimeConfig::default());
    let target = ScriptTarget::new(
        PartSpec::new(path.as_str()),
        std::sync::Arc::new(parsed.script),
    );
    let outcome = engine.dispatch_handler(&target, message, args).wait();

    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{}", engine.take_output());

    if let Some(e) = outcome.error {
        eprintln!("RuntimeError: {e}");
        return 1;
    }
    if !outcome.trapped {
        eprintln!("(no handler trapped \"{message}\")");
    }
    0
}
