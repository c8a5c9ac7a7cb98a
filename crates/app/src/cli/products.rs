use clap::Args;
use skywalker_app::{context::AppContext, errors::AppError};

use super::render;

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Product slug to show in detail
    slug: Option<String>,
}

pub(crate) async fn run(args: ProductsArgs, ctx: &AppContext) -> Result<String, AppError> {
    match args.slug {
        Some(slug) => {
            let product = ctx.carts.product(&slug).await?;

            render::product(&product)
        }
        None => {
            let products = ctx.carts.products().await?;

            if products.is_empty() {
                return Ok("no products are listed right now".to_string());
            }

            Ok(products
                .iter()
                .map(render::product_row)
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}
