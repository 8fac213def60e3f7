//! `compile`: turn a `.gatt` profile into a C header with the attribute
//! database and its handle defines.

use clap::{CommandFactory, Parser};
use log::error;
use rustygatt::{compile_file, CompilerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_INCLUDE_DIR: &str = "../src/ble/gatt-service";
const DEFAULT_ASSIGNED_NUMBERS: &str = "../src/bluetooth_gatt.h";

#[derive(Parser, Debug)]
#[command(name = "compile", version, about = "GATT profile compiler")]
struct Args {
    /// Profile definition to compile
    input: PathBuf,

    /// Header file to generate
    output: PathBuf,

    /// Directory searched by `#import <name>`
    #[arg(long, env = "GATT_INCLUDE_DIR")]
    include_dir: Option<PathBuf>,

    /// Definitions file with the 16-bit assigned numbers
    #[arg(long, env = "GATT_ASSIGNED_NUMBERS")]
    assigned_numbers: Option<PathBuf>,
}

/// Directory the default include and definitions paths are relative to
fn install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
}

fn config(args: &Args) -> CompilerConfig {
    let base = install_dir();
    let include_dir = args
        .include_dir
        .clone()
        .unwrap_or_else(|| base.join(DEFAULT_INCLUDE_DIR));

    let assigned_numbers = args
        .assigned_numbers
        .clone()
        .unwrap_or_else(|| base.join(DEFAULT_ASSIGNED_NUMBERS));

    CompilerConfig {
        include_dir,
        assigned_numbers: Some(assigned_numbers),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let output_name = args.output.display().to_string();

    let profile = match compile_file(config(&args), &args.input, &output_name) {
        Ok(profile) => profile,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", Args::command().render_usage());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fs::write(&args.output, &profile.header) {
        error!("Failed to write {}: {}", output_name, e);
        return ExitCode::FAILURE;
    }

    println!("Created {}", output_name);
    if !profile.warnings.is_empty() {
        println!("{} warning(s)", profile.warnings.len());
    }
    println!("Compilation successful!");
    ExitCode::SUCCESS
}
