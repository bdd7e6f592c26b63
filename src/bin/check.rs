use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use dns_server_check::check::{self, Verdict, CHECK_NAME};
use dns_server_check::cli::{init_logger, Cli};
use dns_server_check::config::CheckConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level());
    let config = cli.into_config();

    // Anything that goes wrong outside the check itself is still a CRITICAL
    // result for the monitoring backend, never a bare error exit.
    let verdict = run(&config).unwrap_or_else(|e| Verdict::critical(format!("failed to run check, error: {e:#}")));
    println!("{}", verdict.render(CHECK_NAME));
    ExitCode::from(verdict.status.exit_code())
}

fn run(config: &CheckConfig) -> Result<Verdict> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(check::execute(config)))
}
