use clap::{Args, Subcommand};
use gantry::breakdown::Breakdown;

use super::CatalogArgs;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    Show(ShowCartArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ShowCartArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// User whose cart should be priced
    #[arg(long)]
    user: String,
}

pub(crate) async fn run(command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show(args) => show(args).await,
    }
}

async fn show(args: ShowCartArgs) -> Result<(), String> {
    let context = args.catalog.context()?;

    let view = context
        .carts
        .get_cart(&args.user)
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?;

    if view.cart.is_empty() {
        println!("cart for {} is empty", args.user);
        return Ok(());
    }

    let Some(breakdown) = view.breakdown else {
        println!(
            "cart for {} holds {} lines but cannot be priced without a delivery address",
            args.user,
            view.cart.lines.len()
        );
        return Ok(());
    };

    print_breakdown(&breakdown);

    Ok(())
}

fn print_breakdown(breakdown: &Breakdown) {
    for line in &breakdown.lines {
        println!("product: {} ({})", line.name, line.product);
        println!("variant: {}", line.variant);
        println!("quantity: {}", line.quantity);
        println!("unit_price: {}", line.price);
        println!("price_before_discount: {}", line.price_before_discount);
        println!(
            "discount: {}",
            line.applied_discount.as_ref().map_or_else(
                || "none".to_string(),
                |discount| format!("{}%", discount.percentage())
            )
        );
        println!(
            "delivery: {} at {} per unit",
            line.delivery_type, line.delivery_fee
        );
        println!();
    }

    for skipped in &breakdown.skipped {
        println!(
            "skipped: {} ({}): {}",
            skipped.product, skipped.variant, skipped.reason
        );
    }

    println!("subtotal: {}", breakdown.subtotal);
    println!("delivery: {}", breakdown.total_delivery_fee);
    println!("total: {}", breakdown.grand_total);
}
