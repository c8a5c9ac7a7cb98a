use clap::Args;
use skywalker::orders::OrderLookup;
use skywalker_app::{context::AppContext, errors::AppError};

use super::render;

#[derive(Debug, Args)]
pub(crate) struct OrderArgs {
    /// Order number from the confirmation, e.g. PS-1042
    number: String,
}

pub(crate) async fn run(args: OrderArgs, ctx: &AppContext) -> Result<String, AppError> {
    match ctx.orders.lookup(&args.number).await? {
        OrderLookup::Found(order) => Ok(render::order(&order)),
        OrderLookup::NotFound(number) => Err(AppError::NotFound(format!("order {number}"))),
    }
}
