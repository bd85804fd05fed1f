use std::process::ExitCode;
use track_tree_cli::{Settings, commands, logging};

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    logging::setup_logging();

    match commands::run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
