pub(crate) use crate::commands::run;
use clap::{Parser, Subcommand};
use orgboard_lib::config::DashboardArgs;

#[derive(Parser, Debug)]
#[clap(
    name = "orgboard",
    about = "Orgboard dashboard aggregation service",
    version,
    rename_all = "kebab-case"
)]
pub struct Opt {
    #[clap(subcommand)]
    command: Orgboard,
}

#[derive(Debug, Subcommand)]
pub enum Orgboard {
    Run(DashboardArgs),
}

pub async fn run_cli() -> anyhow::Result<()> {
    let opt = Opt::try_parse();

    match opt {
        Ok(opt) => match opt.command {
            Orgboard::Run(args) => run::exec(args).await,
        },
        Err(e) => {
            // Prints the error and exits.
            e.exit()
        }
    }
}
