use finperiod::{cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        finperiod::cli::output::error(&err);
        std::process::exit(1);
    }
}
