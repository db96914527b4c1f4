use std::process::ExitCode;

fn main() -> ExitCode {
    match commitweave::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commitweave::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
