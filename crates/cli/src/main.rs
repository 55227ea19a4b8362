//! AstroBenchmarks CLI entry point.

fn main() {
    if let Err(e) = astrobench_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
