use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use setcalc::Calculator;

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("setcalc").join("history"))
}

fn repl() {
    let mut calc = Calculator::new();
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Failed to start line editor: {e}");
            return;
        }
    };

    let history = history_path();
    if let Some(ref path) = history {
        let _ = editor.load_history(path);
    }

    println!("Set-algebra calculator");
    println!("NAME = expr binds, NAME =: expr defers, $ expr prints, exit quits");
    println!();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }
        let _ = editor.add_history_entry(line);

        // One bad statement never ends the session.
        match calc.eval_line(line) {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => {}
            Err(e) => eprintln!("{e}"),
        }
    }

    if let Some(ref path) = history {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = editor.save_history(path);
    }
}

fn run_file(filename: &str) -> Result<(), String> {
    let contents =
        fs::read_to_string(filename).map_err(|e| format!("Failed to read file '{filename}': {e}"))?;

    let mut calc = Calculator::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match calc.eval_line(line) {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => {}
            Err(e) => return Err(format!("line {}: {e}", number + 1)),
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  setcalc            Start interactive session");
    eprintln!("  setcalc <file>     Run statements from a file, one per line");
    eprintln!("  setcalc --help     Show this help message");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => repl(),
        2 => {
            let arg = &args[1];
            if arg == "--help" || arg == "-h" {
                print_usage();
            } else if let Err(e) = run_file(arg) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        _ => {
            eprintln!("Error: Too many arguments");
            print_usage();
            process::exit(1);
        }
    }
}
