use anyhow::Result;
use clap::Parser;
use frontdesk::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    frontdesk::run(args).await
}
