use anyhow::Result;

use crate::args::{Cli, Command};

mod generate;
mod plugins;

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(args) => generate::run(args).await,
        Command::Plugins => plugins::run().await,
    }
}
