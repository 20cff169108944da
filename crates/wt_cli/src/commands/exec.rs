use std::io::Write;

use wt_runtime::{DispatchEngine, RuntimeConfig, ScriptTarget};

use crate::args::CliArgs;

/// `wt do <statements…>` — run loose statement text, message-box style.
pub(crate) fn run(cli: &CliArgs) -> i32 {
    if cli.positional.is_empty() {
        eprintln!("Missing <statements>");
        return 2;
    }
    let text = cli.positional.join("\n");
    let engine = DispatchEngine::new(RuntimeConfig::default());
    let target = ScriptTarget::anonymous();
    let result = engine.execute_statements(&target, &text).wait();

    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{}", engine.take_output());

    match result {
        Ok(Some(passed)) => {
            eprintln!("(passed \"{passed}\")");
            0
        }
        Ok(None) => 0,
        Err(e) => {
            eprintln!("RuntimeError: {e}");
            1
        }
    }
}
