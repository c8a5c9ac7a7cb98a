use clap::{Args, Subcommand};
use skywalker::cart::{CartAction, CartItemUuid};
use skywalker_app::{context::AppContext, errors::AppError};

use super::render;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and its totals
    Show,
    /// Add a product
    Add(AddArgs),
    /// Set the quantity of a line, zero removes it
    Update(UpdateArgs),
    /// Remove a line
    Remove(RemoveArgs),
    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product slug
    slug: String,

    /// Variant SKU; the first variant when omitted
    #[arg(long)]
    sku: Option<String>,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// SKU of the line to change
    sku: String,

    /// New quantity
    quantity: u32,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// SKU of the line to remove
    sku: String,
}

pub(crate) async fn run(command: CartCommand, ctx: &AppContext) -> Result<String, AppError> {
    let action = match command.command {
        CartSubcommand::Show => {
            let update = ctx.carts.cart().await?;

            return render::cart(&update);
        }
        CartSubcommand::Add(args) => {
            let product = ctx.carts.product(&args.slug).await?;

            let variant = match args.sku.as_deref() {
                Some(sku) => product.variant_by_sku(sku),
                None => product.default_variant(),
            }
            .ok_or_else(|| {
                AppError::NotFound(match &args.sku {
                    Some(sku) => format!("{sku} for {}", product.name),
                    None => format!("a variant of {}", product.name),
                })
            })?;

            CartAction::Add {
                product: product.uuid,
                variant: variant.uuid,
                quantity: args.quantity,
            }
        }
        CartSubcommand::Update(args) => CartAction::Update {
            item: line_for(ctx, &args.sku).await?,
            quantity: args.quantity,
        },
        CartSubcommand::Remove(args) => CartAction::Remove(line_for(ctx, &args.sku).await?),
        CartSubcommand::Clear => CartAction::Clear,
    };

    let update = ctx.carts.apply(action).await?;

    render::cart(&update)
}

async fn line_for(ctx: &AppContext, sku: &str) -> Result<CartItemUuid, AppError> {
    let update = ctx.carts.cart().await?;

    update
        .cart
        .lines()
        .iter()
        .find(|line| line.sku.eq_ignore_ascii_case(sku))
        .map(|line| line.uuid)
        .ok_or_else(|| AppError::NotFound(format!("{sku} in your cart")))
}
