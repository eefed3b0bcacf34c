use clap::Parser;
use color_eyre::eyre::Result;
use sass_task::{config::Cli, logger, run};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();
    let verbose = args.opts().map(|o| o.verbose).unwrap_or(0);
    logger::setup(verbose, &args.log);

    run(args).await
}
