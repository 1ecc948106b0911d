use std::process::ExitCode;

use sector_allocation_core::config::Config;
use sector_allocation_core::sim;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let stats = sim::run(config);
    println!("{stats}");
    ExitCode::SUCCESS
}
