use wt_runtime::{DispatchEngine, RuntimeConfig};

use crate::args::CliArgs;

/// `wt eval <expression…>` — evaluate one expression and print its value.
pub(crate) fn run(cli: &CliArgs) -> i32 {
    if cli.positional.is_empty() {
        eprintln!("Missing <expression>");
        return 2;
    }
    let text = cli.positional.join(" ");
    let engine = DispatchEngine::new(RuntimeConfig::default());
    match engine.evaluate(&text) {
        Ok(value) => {
            println!("{value}");
            0
        }
        Err(e) => {
            eprintln!("RuntimeError: {e}");
            1
        }
    }
}
