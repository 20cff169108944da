pub(crate) struct CliArgs {
    pub cmd: String,
    pub no_diags: bool,
    pub positional: Vec<String>,
}

pub(crate) fn usage() -> &'static str {
    "Usage: wt <check|ast|run|eval|do> [--no-diags] <args>"
}

pub(crate) fn parse_args() -> Result<CliArgs, String> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    let cmd = argv.first().cloned().ok_or_else(|| usage().to_string())?;
    argv.remove(0);

    let mut no_diags = false;
    let mut positional: Vec<String> = Vec::new();

    for a in argv {
        if a == "--no-diags" {
            no_diags = true;
        } else if a.starts_with("--") {
            return Err(format!("Unknown option: {a}"));
        } else {
            positional.push(a);
        }
    }

    Ok(CliArgs {
        cmd,
        no_diags,
        positional,
    })
}
