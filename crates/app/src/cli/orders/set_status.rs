use clap::Args;
use nexus::{order_number::OrderNumber, status::OrderStatus};
use nexus_app::{
    config::{DatabaseConfig, PricingArgs},
    context::AppContext,
};

#[derive(Debug, Args)]
pub(crate) struct SetStatusArgs {
    /// Order number, e.g. ORD-20260301-AB12
    #[arg(long)]
    order_number: OrderNumber,

    /// Target status, e.g. confirmed or out_for_delivery
    #[arg(long)]
    status: OrderStatus,

    /// History note; generated when omitted
    #[arg(long)]
    note: Option<String>,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    pricing: PricingArgs,
}

pub(crate) async fn run(args: SetStatusArgs) -> Result<(), String> {
    let ctx = AppContext::from_database_url(&args.database.database_url, (&args.pricing).into())
        .await
        .map_err(|error| format!("failed to initialise: {error}"))?;

    let details = ctx
        .orders
        .find_by_number(args.order_number)
        .await
        .map_err(|error| format!("failed to load order: {error}"))?;

    let order = ctx
        .orders
        .transition(details.order.uuid, args.status, None, args.note)
        .await
        .map_err(|error| format!("failed to change status: {error}"))?;

    println!("order_number: {}", order.order_number);
    println!("status: {}", order.status.label());

    Ok(())
}
