use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use cool_frontend::{
    errors::errors::{Error, ErrorTip},
    run_frontend, FrontendOptions, Stage,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Parses and type checks a source file, printing every diagnostic.
#[derive(Debug, Parser)]
#[command(name = "coolc", version)]
struct Args {
    /// Source file to check.
    path: PathBuf,

    /// Last phase to run.
    #[arg(long, value_enum, default_value = "check")]
    stop_after: Stage,

    /// Print the parsed program back as source text.
    #[arg(long)]
    dump_ast: bool,

    /// Log phase progress (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source = match read_to_string(&args.path) {
        Ok(source) => source,
        Err(err) => {
            error!("failed to read {}: {}", args.path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let options = FrontendOptions {
        stop_after: args.stop_after,
    };
    let output = match run_frontend(&source, &options) {
        Ok(output) => output,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    info!("front end finished in {:?}", start.elapsed());

    if args.dump_ast {
        if let Some(program) = &output.program {
            print!("{}", program);
        }
    }

    for error in &output.errors {
        display_error(error, &source, &args.path);
    }

    if output.has_errors() {
        println!("{} error(s)", output.errors.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn display_error(error: &Error, source: &str, file: &Path) {
    /*
        type error: TypeMatchError
        -> main.cl
           |
        20 | let x : Int <- "oops" in x
           | ---------------^
    */

    if let ErrorTip::None = error.get_tip() {
        println!("{} error: {}", error.get_phase(), error.get_error_name());
    } else {
        println!(
            "{} error: {} ({})",
            error.get_phase(),
            error.get_error_name(),
            error.get_tip()
        );
    }
    println!("   {}", error.message());
    println!("-> {}", file.display());

    let position = error.get_position();
    let line_text = match (position.line as usize).checked_sub(1) {
        Some(index) => source.lines().nth(index),
        None => None,
    };
    let Some(line_text) = line_text else {
        // Built-in classes have no source line.
        return;
    };

    let line_str = position.line.to_string();
    let padding = line_str.len() + 2;
    println!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    println!("{} | {}", line_str, line_text_removed.trim_end());

    let arrows = (position.column as usize).saturating_sub(removed_whitespace).max(1);
    println!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (&string[start..], start)
}
