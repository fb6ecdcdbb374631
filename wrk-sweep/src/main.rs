use clap::Parser;

use wrk_sweep::exit_codes::ExitCode;

fn main() {
    let cli = match wrk_sweep::cli::Cli::try_parse() {
        Ok(v) => v,
        Err(err) => {
            use clap::error::ErrorKind;
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success.as_i32(),
                _ => ExitCode::InvalidInput.as_i32(),
            };
            std::process::exit(code);
        }
    };

    let code = match wrk_sweep::app::run(cli) {
        Ok(()) => ExitCode::Success.as_i32(),
        Err(err) => {
            eprintln!("{err}");
            err.exit_code().as_i32()
        }
    };

    std::process::exit(code);
}
