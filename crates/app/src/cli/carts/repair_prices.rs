use clap::Args;
use nexus_app::{
    config::{DatabaseConfig, PricingArgs},
    context::AppContext,
};

#[derive(Debug, Args)]
pub(crate) struct RepairPricesArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    pricing: PricingArgs,
}

pub(crate) async fn run(args: RepairPricesArgs) -> Result<(), String> {
    let ctx = AppContext::from_database_url(&args.database.database_url, (&args.pricing).into())
        .await
        .map_err(|error| format!("failed to initialise: {error}"))?;

    let repair = ctx
        .carts
        .repair_unit_prices()
        .await
        .map_err(|error| format!("failed to repair cart prices: {error}"))?;

    println!("repriced: {}", repair.repriced);
    println!("removed: {}", repair.removed);

    Ok(())
}
