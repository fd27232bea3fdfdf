//! Metrado - Construction takeoff and budget editor with TUI

mod config;
mod tui;

use std::env;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: metrado [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>       Load configuration from a TOML file");
    eprintln!("  -h, --help                Print help");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_path = Some(PathBuf::from(&args[i]));
            }
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (config, warnings) = config::load(config_path.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut app = tui::App::demo(config);

    if let Err(e) = tui::run(&mut app) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
