use color_eyre::Result;

use crate::{bot::CommandContext, languages::translate};

/// Check bot liveness.
#[poise::command(slash_command)]
pub async fn ping(ctx: CommandContext<'_>) -> Result<()> {
    ctx.say(translate(ctx.guild_id(), "PING_RESPONSE")).await?;
    Ok(())
}
