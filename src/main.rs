use clap::Parser;
use std::path::Path;
use tidy::cli::{Cli, run_cli_with_config};
use tidy::logging::init_logger;
use tidy::output::{DEFAULT_THEME, OutputFormatter};

fn main() {
    init_logger();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help, version and usage errors all end here and exit normally.
            let _ = e.print();
            return;
        }
    };

    let output = OutputFormatter::new(DEFAULT_THEME);
    if let Err(e) = run_cli_with_config(
        &cli.command,
        Path::new("."),
        cli.config.as_deref(),
        &output,
    ) {
        output.error(&format!("Error: {}", e));
    }
}
