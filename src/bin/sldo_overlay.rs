use std::path::Path;
use std::process::ExitCode;

use bench_plots::config::OverlayConfig;
use bench_plots::{init_logging, overlay};

fn main() -> ExitCode {
    init_logging();

    let outcome = OverlayConfig::from_env().and_then(|config| overlay::run(Path::new("."), &config));

    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
