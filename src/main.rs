use clap::Parser;
use lyps::config::{ReplConfig, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use lyps::highlighter::LispHelper;
use lyps::interpreter::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;

const LIBRARY_SOURCE: &str = include_str!("../stdlib/Library.lyps");

/// A tree-walking interpreter for Lyps, a small homoiconic Lisp dialect.
#[derive(Parser, Debug)]
#[command(name = "lyps")]
#[command(version = lyps::config::VERSION)]
#[command(about = "A Lisp dialect with a bignum/rational/float numeric tower")]
struct CliArgs {
    /// Script file to execute (optional — if not provided, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Skip loading Library.lyps
    #[arg(long = "no-stdlib")]
    no_stdlib: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = CliArgs::parse();

    let interp = Interpreter::new();
    if !args.no_stdlib {
        if let Err(e) = interp.eval_program(LIBRARY_SOURCE) {
            log::warn!("failed to load Library.lyps: {}", e);
        }
    }

    if let Some(script_path) = args.script {
        run_script(&script_path, &interp)?;
        return Ok(());
    }

    run_repl(&interp)
}

/// Executes every top-level form in a script file in order and exits. A
/// script's return values are not printed — only explicit `write!`/`pprint`
/// output is visible, matching ordinary batch-mode execution.
fn run_script(path: &PathBuf, interp: &Interpreter) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {}", path.display(), e))?;
    interp
        .eval_program(&contents)
        .map_err(|e| format!("{}", e))?;
    Ok(())
}

fn run_repl(interp: &Interpreter) -> Result<(), Box<dyn std::error::Error>> {
    let repl_config = ReplConfig::default();
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = Editor::with_config(config).map_err(|e| format!("failed to initialize REPL: {}", e))?;
    rl.set_helper(Some(LispHelper::new()));
    let _ = rl.load_history(&repl_config.history_file);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);

    loop {
        let readline = rl.readline(&repl_config.prompt);
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "(quit)" || trimmed == "(exit)" {
                    println!("Goodbye!");
                    break;
                }
                match interp.eval_string(trimmed) {
                    Ok(result) => println!("==> {}", result),
                    Err(e) => {
                        log::error!("{}", e);
                        eprintln!("{}", e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(&repl_config.history_file);
    Ok(())
}
