use clap::Args;
use nexus::order_number::OrderNumber;
use nexus_app::{
    config::{DatabaseConfig, PricingArgs},
    context::AppContext,
};

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    /// Order number, e.g. ORD-20260301-AB12
    #[arg(long)]
    order_number: OrderNumber,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    pricing: PricingArgs,
}

pub(crate) async fn run(args: ShowOrderArgs) -> Result<(), String> {
    let ctx = AppContext::from_database_url(&args.database.database_url, (&args.pricing).into())
        .await
        .map_err(|error| format!("failed to initialise: {error}"))?;

    let details = ctx
        .orders
        .find_by_number(args.order_number)
        .await
        .map_err(|error| format!("failed to load order: {error}"))?;

    let order = &details.order;

    println!("order_number: {}", order.order_number);
    println!("order_uuid: {}", order.uuid);
    println!("status: {}", order.status.label());
    println!("delivery_method: {}", order.delivery_method);
    println!("customer: {} ({})", order.contact.name, order.contact.phone);

    for item in &details.items {
        println!(
            "  {} x {} @ {} = {}",
            item.quantity, item.product_name, item.unit_price, item.total_price
        );
    }

    println!("subtotal: {}", order.pricing.subtotal());
    println!("delivery_fee: {}", order.pricing.delivery_fee());
    println!("service_fee: {}", order.pricing.service_fee());
    println!("tax_amount: {}", order.pricing.tax_amount());
    println!("total_amount: {}", order.pricing.total_amount());

    for entry in &details.history {
        println!("{} {}: {}", entry.created_at, entry.status, entry.notes);
    }

    Ok(())
}
