use clap::{Args, Subcommand};

mod repair_prices;

#[derive(Debug, Args)]
pub(crate) struct CartsCommand {
    #[command(subcommand)]
    command: CartsSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartsSubcommand {
    /// Give zero-priced cart lines the live product price
    RepairPrices(repair_prices::RepairPricesArgs),
}

pub(crate) async fn run(command: CartsCommand) -> Result<(), String> {
    match command.command {
        CartsSubcommand::RepairPrices(args) => repair_prices::run(args).await,
    }
}
