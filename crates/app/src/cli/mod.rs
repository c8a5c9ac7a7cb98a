use clap::{Parser, Subcommand};
use skywalker_app::{config::AppConfig, context::AppContext, errors::AppError};

mod cart;
mod checkout;
mod fan_photo;
mod newsletter;
mod order;
mod products;
mod render;
mod share;

#[derive(Debug, Parser)]
#[command(
    name = "skywalker",
    about = "Panickin' Skywalker merch store",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products, or show one by slug
    Products(products::ProductsArgs),
    /// Show and change the cart
    Cart(cart::CartCommand),
    /// Walk through checkout
    Checkout(checkout::CheckoutCommand),
    /// Look up an order by number
    Order(order::OrderArgs),
    /// Subscribe to the newsletter
    Newsletter(newsletter::NewsletterArgs),
    /// Submit a photo for the fan gallery
    FanPhoto(fan_photo::FanPhotoArgs),
    /// Share a store link
    Share(share::ShareArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<String, AppError> {
        let ctx = AppContext::from_config(&self.config).await?;

        match self.command {
            Commands::Products(args) => products::run(args, &ctx).await,
            Commands::Cart(command) => cart::run(command, &ctx).await,
            Commands::Checkout(command) => checkout::run(command, &ctx).await,
            Commands::Order(args) => order::run(args, &ctx).await,
            Commands::Newsletter(args) => newsletter::run(args, &ctx).await,
            Commands::FanPhoto(args) => fan_photo::run(args, &ctx).await,
            Commands::Share(args) => share::run(args, &ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_cart_add() -> TestResult {
        let cli = Cli::try_parse_from([
            "skywalker",
            "--store",
            "merch",
            "cart",
            "add",
            "debut-lp",
            "--sku",
            "LP-DEBUT-SPLT",
            "--quantity",
            "2",
        ])?;

        assert!(matches!(cli.command, Commands::Cart(_)));
        assert_eq!(cli.config.store.name, "merch");

        Ok(())
    }

    #[test]
    fn discount_takes_a_code_or_remove() {
        assert!(Cli::try_parse_from(["skywalker", "checkout", "discount", "tour15"]).is_ok());
        assert!(Cli::try_parse_from(["skywalker", "checkout", "discount", "--remove"]).is_ok());
        assert!(Cli::try_parse_from(["skywalker", "checkout", "discount"]).is_err());
        assert!(
            Cli::try_parse_from(["skywalker", "checkout", "discount", "tour15", "--remove"])
                .is_err()
        );
    }

    #[test]
    fn billing_address_needs_a_name() {
        let result = Cli::try_parse_from([
            "skywalker",
            "checkout",
            "pay",
            "--token",
            "tok_visa",
            "--brand",
            "Visa",
            "--last4",
            "4242",
            "--billing-line1",
            "1 Main St",
        ]);

        assert!(result.is_err());
    }
}
