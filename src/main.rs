use std::process;

fn main() {
    if let Err(e) = ctask::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
