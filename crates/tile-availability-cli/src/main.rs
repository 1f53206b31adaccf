mod commands;
mod logging;
mod settings;

use clap::Parser;
use settings::Settings;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::parse();
    logging::setup_logging();

    match commands::run(&settings) {
        Ok(answer) => {
            println!("{answer}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}: {}", settings.layer.display(), e);
            ExitCode::FAILURE
        }
    }
}
