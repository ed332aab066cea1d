use clap::{Args, Subcommand};
use gantry::revenue::{CreatorRevenue, SoldItem, split};

use super::CatalogArgs;

#[derive(Debug, Args)]
pub(crate) struct SessionCommand {
    #[command(subcommand)]
    command: SessionSubcommand,
}

#[derive(Debug, Subcommand)]
enum SessionSubcommand {
    Preview(PreviewSessionArgs),
}

#[derive(Debug, Args)]
pub(crate) struct PreviewSessionArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Buyer whose cart is split as if paid
    #[arg(long)]
    user: String,
}

pub(crate) async fn run(command: SessionCommand) -> Result<(), String> {
    match command.command {
        SessionSubcommand::Preview(args) => preview(args).await,
    }
}

async fn preview(args: PreviewSessionArgs) -> Result<(), String> {
    let context = args.catalog.context()?;

    let breakdown = context
        .carts
        .breakdown(&args.user)
        .await
        .map_err(|error| format!("failed to price cart: {error}"))?;

    if breakdown.lines.is_empty() {
        println!("nothing payable in the cart for {}", args.user);
        return Ok(());
    }

    let items: Vec<SoldItem> = breakdown.lines.iter().map(|line| line.to_sold_item()).collect();

    let split = split(
        &items,
        &args.user,
        None,
        args.catalog.shipping_split,
        breakdown.currency,
    )
    .map_err(|error| format!("failed to split revenue: {error}"))?;

    for (creator_id, revenue) in &split.creators {
        print_revenue(creator_id, revenue);
    }

    if let Some(revenue) = &split.unattributed {
        print_revenue("unattributed", revenue);
    }

    for (product_id, grant) in &split.digital {
        println!("digital: {product_id} ({} links)", grant.links.len());
    }

    let total = split
        .total()
        .map_err(|error| format!("failed to total revenue: {error}"))?;

    println!("total: {total}");

    Ok(())
}

fn print_revenue(creator_id: &str, revenue: &CreatorRevenue) {
    println!("creator: {creator_id}");
    println!("product_revenue: {}", revenue.product_revenue);
    println!("shipping_revenue: {}", revenue.shipping_revenue);
    println!("items: {}", revenue.items.len());
    println!();
}
