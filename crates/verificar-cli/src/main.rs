//! Verificador CLI entry point

use clap::Parser;
use std::process::ExitCode;
use verificar_cli::{runner, Cli, CliConfig, CliResult, Commands, Reporter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    verificar::logging::init(config.verbosity.directives());

    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match run(&cli, &config, &reporter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.failure(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: &CliConfig, reporter: &Reporter) -> CliResult<()> {
    match &cli.command {
        Commands::Login(args) => runner::run_login(config, args, reporter).await,
        Commands::Token(args) => runner::run_token(config, args, reporter).await,
        Commands::Config(args) => runner::run_config(config, args),
    }
}
