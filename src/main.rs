use anyhow::Result;
use clap::Parser;

use cacheproxy::{cli::Cli, logging, run, settings::Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        // Usage problems exit with code 1 rather than clap's default 2.
        let _ = err.print();
        std::process::exit(1);
    });
    let settings = Settings::from_cli(&cli);
    settings.validate()?;
    logging::init_logger(settings.log)?;
    run(settings).await
}
