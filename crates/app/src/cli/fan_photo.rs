use clap::Args;
use skywalker_app::{context::AppContext, domain::engagement::FanPhotoForm, errors::AppError};

#[derive(Debug, Args)]
pub(crate) struct FanPhotoArgs {
    /// Link to the hosted image
    image_url: String,

    /// Name to credit
    #[arg(long)]
    name: String,

    /// Contact email, never published
    #[arg(long)]
    email: String,

    /// Caption shown under the photo
    #[arg(long, default_value = "")]
    caption: String,

    /// Allow the band to publish the photo
    #[arg(long)]
    consent: bool,
}

pub(crate) async fn run(args: FanPhotoArgs, ctx: &AppContext) -> Result<String, AppError> {
    ctx.engagement
        .submit_fan_photo(&FanPhotoForm {
            name: args.name,
            email: args.email,
            image_url: args.image_url,
            caption: args.caption,
            consent: args.consent,
        })
        .await?;

    Ok("thanks! your photo is waiting for review".to_string())
}
