use std::path::PathBuf;

use clap::{Args, Subcommand};
use gantry_app::fixtures;

#[derive(Debug, Args)]
pub(crate) struct FixtureCommand {
    #[command(subcommand)]
    command: FixtureSubcommand,
}

#[derive(Debug, Subcommand)]
enum FixtureSubcommand {
    Check(CheckFixtureArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CheckFixtureArgs {
    /// YAML catalog fixture
    #[arg(long, env = "CATALOG_FIXTURE")]
    fixture: PathBuf,
}

pub(crate) fn run(command: FixtureCommand) -> Result<(), String> {
    match command.command {
        FixtureSubcommand::Check(args) => check(&args),
    }
}

fn check(args: &CheckFixtureArgs) -> Result<(), String> {
    let data = fixtures::load(&args.fixture)
        .map_err(|error| format!("invalid fixture {}: {error}", args.fixture.display()))?;

    let active_delivery_types = data
        .delivery_types
        .iter()
        .filter(|descriptor| descriptor.is_active)
        .count();

    println!("products: {}", data.products.len());
    println!(
        "custom_print_template: {}",
        data.custom_print_template
            .as_ref()
            .map_or("none", |template| template.name.as_str())
    );
    println!("events: {}", data.events.len());
    println!(
        "delivery_types: {} ({active_delivery_types} active)",
        data.delivery_types.len()
    );
    println!("addresses: {}", data.addresses.len());
    println!("custom_prints: {}", data.custom_prints.len());
    println!("carts: {}", data.carts.len());

    Ok(())
}
