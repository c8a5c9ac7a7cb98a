use clap::Args;
use skywalker_app::{context::AppContext, errors::AppError};

#[derive(Debug, Args)]
pub(crate) struct NewsletterArgs {
    /// Email to subscribe
    email: String,

    /// First name for the greeting
    #[arg(long)]
    name: Option<String>,
}

pub(crate) async fn run(args: NewsletterArgs, ctx: &AppContext) -> Result<String, AppError> {
    ctx.engagement
        .newsletter_signup(&args.email, args.name)
        .await?;

    Ok(format!("subscribed {}", args.email.trim()))
}
