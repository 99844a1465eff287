use brew_lang::ast::Stmt;
use brew_lang::builtins::{default_globals, set_sandbox_storage};
use brew_lang::config::{FsConfig, VERSION, WELCOME_HINT, WELCOME_MESSAGE};
use brew_lang::env::Environment;
use brew_lang::sandbox::Sandbox;
use brew_lang::value::Value;
use brew_lang::{eval, interpret, parse, run, Error};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::PathBuf;
use std::rc::Rc;

/// Brew: a small scripting language
#[derive(Parser, Debug)]
#[command(name = "brew")]
#[command(version = VERSION)]
#[command(about = "Runs Brew scripts, or starts a REPL when no file is given")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Add an allowed root for the file built-ins (can be repeated)
    #[arg(long = "fs-sandbox", value_name = "PATH", action = clap::ArgAction::Append)]
    fs_paths: Vec<PathBuf>,

    /// Maximum file size in bytes for the file built-ins
    #[arg(
        long = "max-file-size",
        value_name = "BYTES",
        default_value = "10485760"
    )]
    max_file_size: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let fs_config = build_fs_config(&args);
    let sandbox = Sandbox::new(&fs_config)?;
    set_sandbox_storage(sandbox);

    let globals = default_globals();

    if let Some(script_path) = args.script {
        let source = std::fs::read_to_string(&script_path)
            .map_err(|e| format!("Cannot read {}: {e}", script_path.display()))?;
        if let Err(e) = run(&source, &globals) {
            eprintln!("brew: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    repl(&globals)
}

fn build_fs_config(args: &CliArgs) -> FsConfig {
    let mut fs_config = FsConfig {
        max_file_size: args.max_file_size,
        ..FsConfig::default()
    };
    if !args.fs_paths.is_empty() {
        fs_config.allowed_paths = args.fs_paths.clone();
    }
    fs_config
}

fn repl(globals: &Rc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(config)
        .map_err(|e| format!("Failed to initialize REPL: {e}"))?;

    let history_file = ".brew_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE} v{VERSION}");
    println!("{WELCOME_HINT}");

    loop {
        match rl.readline("brew> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(e) = run_line(&line, globals) {
                    eprintln!("{e}");
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("REPL error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}

/// Runs one REPL line. A lone expression prints its value; anything else
/// executes as a program.
fn run_line(line: &str, globals: &Rc<Environment>) -> Result<(), Error> {
    let program = parse(line)?;
    if let [Stmt::Expression { expr, .. }] = program.statements.as_slice() {
        let value = eval::eval_expression(expr, globals)?;
        if value != Value::Null {
            println!("{value}");
        }
        return Ok(());
    }
    interpret(&program, globals)
}
