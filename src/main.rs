use std::path::PathBuf;

use jsh_cli::{evaluate_repl, ReplConfig};
use miette::{bail, IntoDiagnostic, Result, WrapErr};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

struct Options {
    history_file: Option<PathBuf>,
    log_level: Option<LevelFilter>,
}

fn main() -> Result<()> {
    let options = parse_args()?;

    if let Some(level) = options.log_level {
        TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
            .into_diagnostic()
            .wrap_err("failed to initialize logging")?;
    }

    // claiming must happen before the shell customizes SIGTTIN, so a
    // background start stops the shell the way the kernel intends
    jsh_system::terminal::claim_for_shell()
        .into_diagnostic()
        .wrap_err("failed to claim the terminal")?;
    jsh_system::install_handlers()
        .into_diagnostic()
        .wrap_err("failed to install signal handlers")?;

    let code = evaluate_repl(ReplConfig {
        history_file: options.history_file,
    });
    std::process::exit(code);
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        history_file: None,
        log_level: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--history" => {
                let Some(path) = args.next() else {
                    bail!("--history requires a file path");
                };
                options.history_file = Some(PathBuf::from(path));
            }
            "--log-level" => {
                let Some(level) = args.next() else {
                    bail!("--log-level requires a level (off, error, warn, info, debug, trace)");
                };
                match level.parse() {
                    Ok(level) => options.log_level = Some(level),
                    Err(_) => bail!("unknown log level: {level}"),
                }
            }
            "--version" => {
                println!("jsh {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => bail!("unknown option: {arg}"),
        }
    }
    Ok(options)
}

fn print_help() {
    println!(
        "jsh {} - a small interactive Unix job-control shell

Usage: jsh [OPTIONS]

Options:
    --history <FILE>      keep line history in FILE
    --log-level <LEVEL>   log to stderr (off, error, warn, info, debug, trace)
    --version             print the version and exit
    --help                print this help and exit",
        env!("CARGO_PKG_VERSION")
    );
}
