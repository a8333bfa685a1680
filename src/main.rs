use std::process::ExitCode;

fn main() -> ExitCode {
    food_factors::app::init_logging();

    match food_factors::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(exit_code = err.exit_code(), "{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
