use clap::{Args, Subcommand, ValueEnum};
use skywalker::{
    address::AddressForm,
    checkout::{BillingInput, CardSummary, CheckoutStep, PaymentDetails},
};
use skywalker_app::{context::AppContext, errors::AppError};

use super::render;

#[derive(Debug, Args)]
pub(crate) struct CheckoutCommand {
    #[command(subcommand)]
    command: CheckoutSubcommand,
}

#[derive(Debug, Subcommand)]
enum CheckoutSubcommand {
    /// Start or resume checkout for the cart
    Begin,
    /// Show the checkout in progress
    Status,
    /// Enter contact email and shipping address
    Shipping(ShippingArgs),
    /// Choose a shipping method by id
    Method(MethodArgs),
    /// Apply a discount code, or drop it with --remove
    Discount(DiscountArgs),
    /// Enter payment and place the order
    Pay(PayArgs),
    /// Jump to a step
    Step(StepArgs),
    /// Go back one step
    Back,
    /// Forget the checkout in progress
    Abandon,
}

#[derive(Debug, Args)]
struct ShippingArgs {
    /// Contact email for the receipt
    #[arg(long)]
    email: String,

    /// Recipient name
    #[arg(long)]
    name: String,

    /// Street address
    #[arg(long)]
    line1: String,

    /// Apartment, suite or unit
    #[arg(long, default_value = "")]
    line2: String,

    #[arg(long)]
    city: String,

    /// State, province or territory code
    #[arg(long, default_value = "")]
    state: String,

    /// ZIP or postal code
    #[arg(long)]
    postal_code: String,

    /// ISO country code
    #[arg(long, default_value = "US")]
    country: String,

    #[arg(long, default_value = "")]
    phone: String,
}

#[derive(Debug, Args)]
struct MethodArgs {
    /// Shipping method id as listed by `checkout status`
    id: String,
}

#[derive(Debug, Args)]
struct DiscountArgs {
    /// Discount code, e.g. TOUR15
    #[arg(required_unless_present = "remove", conflicts_with = "remove")]
    code: Option<String>,

    /// Remove the applied code
    #[arg(long)]
    remove: bool,
}

#[derive(Debug, Args)]
struct PayArgs {
    /// Card token from the payment widget
    #[arg(long, env = "SKYWALKER_PAYMENT_TOKEN", hide_env_values = true)]
    token: String,

    /// Card brand
    #[arg(long)]
    brand: String,

    /// Last four card digits
    #[arg(long)]
    last4: String,

    /// Accept the terms and conditions
    #[arg(long)]
    accept_terms: bool,

    #[command(flatten)]
    billing: BillingArgs,
}

/// Billing address, when it differs from the shipping address.
#[derive(Debug, Args)]
struct BillingArgs {
    #[arg(long)]
    billing_name: Option<String>,

    #[arg(long, requires = "billing_name")]
    billing_line1: Option<String>,

    #[arg(long)]
    billing_line2: Option<String>,

    #[arg(long, requires = "billing_name")]
    billing_city: Option<String>,

    #[arg(long)]
    billing_state: Option<String>,

    #[arg(long, requires = "billing_name")]
    billing_postal_code: Option<String>,

    #[arg(long, requires = "billing_name")]
    billing_country: Option<String>,
}

impl BillingArgs {
    fn into_input(self) -> BillingInput {
        let Some(full_name) = self.billing_name else {
            return BillingInput::SameAsShipping;
        };

        BillingInput::Address(AddressForm {
            full_name,
            line1: self.billing_line1.unwrap_or_default(),
            line2: self.billing_line2.unwrap_or_default(),
            city: self.billing_city.unwrap_or_default(),
            state: self.billing_state.unwrap_or_default(),
            postal_code: self.billing_postal_code.unwrap_or_default(),
            country: self.billing_country.unwrap_or_default(),
            phone: String::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Step {
    Cart,
    Shipping,
    Payment,
}

impl From<Step> for CheckoutStep {
    fn from(step: Step) -> Self {
        match step {
            Step::Cart => Self::Cart,
            Step::Shipping => Self::Shipping,
            Step::Payment => Self::Payment,
        }
    }
}

#[derive(Debug, Args)]
struct StepArgs {
    #[arg(value_enum)]
    step: Step,
}

pub(crate) async fn run(command: CheckoutCommand, ctx: &AppContext) -> Result<String, AppError> {
    let view = match command.command {
        CheckoutSubcommand::Begin => ctx.checkout.begin().await?,
        CheckoutSubcommand::Status => match ctx.checkout.status().await? {
            Some(view) => view,
            None => return Ok("no checkout in progress".to_string()),
        },
        CheckoutSubcommand::Shipping(args) => {
            let form = AddressForm {
                full_name: args.name,
                line1: args.line1,
                line2: args.line2,
                city: args.city,
                state: args.state,
                postal_code: args.postal_code,
                country: args.country,
                phone: args.phone,
            };

            ctx.checkout.submit_shipping(&args.email, &form).await?
        }
        CheckoutSubcommand::Method(args) => ctx.checkout.select_shipping_method(&args.id).await?,
        CheckoutSubcommand::Discount(args) => match args.code {
            Some(code) if !args.remove => ctx.checkout.apply_discount(&code).await?,
            _ => ctx.checkout.remove_discount().await?,
        },
        CheckoutSubcommand::Pay(args) => {
            let details = PaymentDetails {
                token: args.token,
                card: CardSummary {
                    brand: args.brand,
                    last4: args.last4,
                },
                billing: args.billing.into_input(),
                accept_terms: args.accept_terms,
            };

            let confirmation = ctx.checkout.submit_payment(&details).await?;

            return Ok(render::confirmation(&confirmation));
        }
        CheckoutSubcommand::Step(args) => ctx.checkout.go_to_step(args.step.into()).await?,
        CheckoutSubcommand::Back => ctx.checkout.back().await?,
        CheckoutSubcommand::Abandon => {
            ctx.checkout.abandon().await?;

            return Ok("checkout abandoned; your cart is unchanged".to_string());
        }
    };

    Ok(render::checkout(&view))
}
