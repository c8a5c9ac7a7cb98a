use clap::{Args, ValueEnum};
use skywalker_app::{api::SharePlatform, context::AppContext, errors::AppError};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Platform {
    Instagram,
    Tiktok,
    Discord,
    Facebook,
    X,
    Email,
}

impl From<Platform> for SharePlatform {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Instagram => Self::Instagram,
            Platform::Tiktok => Self::Tiktok,
            Platform::Discord => Self::Discord,
            Platform::Facebook => Self::Facebook,
            Platform::X => Self::X,
            Platform::Email => Self::Email,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct ShareArgs {
    /// Where the link is shared
    #[arg(value_enum)]
    platform: Platform,

    /// Link being shared
    url: String,
}

pub(crate) async fn run(args: ShareArgs, ctx: &AppContext) -> Result<String, AppError> {
    ctx.engagement.share(args.platform.into(), &args.url).await?;

    Ok(format!("shared {}", args.url.trim()))
}
