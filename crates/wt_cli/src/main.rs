mod args;
mod commands;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    env_logger::init();
    let cli = match args::parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    let code = match cli.cmd.as_str() {
        "check" => commands::check::run(&cli),
        "ast" => commands::ast::run(&cli),
        "run" => commands::run::run(&cli),
        "eval" => commands::eval::run(&cli),
        "do" => commands::exec::run(&cli),
        _ => {
            eprintln!("Unknown command: {}", cli.cmd);
            eprintln!("{}", args::usage());
            2
        }
    };
    std::process::exit(code);
}
