use color_eyre::Result;
use poise::serenity_prelude as serenity;

use crate::{
    bot::CommandContext,
    embed::{Embed, ImageSource},
    languages::translate,
};

/// Show a user's avatar.
#[poise::command(slash_command)]
pub async fn avatar(
    ctx: CommandContext<'_>,
    #[description = "The user whose avatar to show (defaults to you)"] user: Option<
        serenity::User,
    >,
) -> Result<()> {
    if user.is_none() && ctx.guild_id().is_none() {
        ctx.say(translate(ctx.guild_id(), "MISSING_MEMBER")).await?;
        return Ok(());
    }

    let user = user.unwrap_or_else(|| ctx.author().clone());
    let name = format!("{}#{:04}", user.name, user.discriminator);

    let mut embed = Embed::new();
    embed
        .set_author(&name, Some(ImageSource::User(&user)), None)
        .set_image(ImageSource::User(&user));

    ctx.send(|reply| reply.embed(|e| embed.build(e))).await?;

    Ok(())
}
