use clap::{Args, Subcommand};

mod set_status;
mod show;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Print an order with its items and status history
    Show(show::ShowOrderArgs),

    /// Move an order to another status as the system
    SetStatus(set_status::SetStatusArgs),
}

pub(crate) async fn run(command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::Show(args) => show::run(args).await,
        OrdersSubcommand::SetStatus(args) => set_status::run(args).await,
    }
}
