use kindle_highlights::config::{Command, Config};
use kindle_highlights::{export, session};

fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match config.command {
        Command::Login => session::capture(config)?,
        Command::Export { force } => {
            let summary = export::run(config, force)?;
            println!(
                "\nDone: {} exported, {} skipped (already exist)",
                summary.exported, summary.skipped
            );
        }
    }

    Ok(())
}
