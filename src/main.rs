use clap::Parser;
use std::process::ExitCode;
use trellis::TransformError;
use trellis::cli::{Args, CliError, run};

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok((result, text)) => {
            for diagnostic in &result.diagnostics {
                eprintln!("warning: {}", diagnostic);
            }
            if args.output.is_none() {
                println!("{}", text);
            }
            ExitCode::SUCCESS
        }
        Err(CliError::Transform(TransformError::Strict(diagnostics))) => {
            for diagnostic in &diagnostics {
                eprintln!("error: {}", diagnostic);
            }
            eprintln!("error: {} diagnostic(s) reported in strict mode", diagnostics.len());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
