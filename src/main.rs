use std::process::ExitCode;

use bench_plots::config::IvConfig;
use bench_plots::iv::IvCommand;
use bench_plots::{app, init_logging, iv};

fn main() -> ExitCode {
    init_logging();

    let request = match iv::parse_args(std::env::args_os()) {
        Ok(IvCommand::Plot(request)) => request,
        Ok(IvCommand::Help(text)) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let outcome = IvConfig::from_env().and_then(|config| {
        iv::run(&request, &config).map(|output| (config, output))
    });

    match outcome {
        Ok((config, output)) => {
            if config.display {
                if let Err(e) = app::show(&output.figure) {
                    log::warn!("interactive display unavailable: {e:#}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
