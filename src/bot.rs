use color_eyre::{eyre::ErrReport, Result};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::{commands, config, languages::translate};

/// Shared data handed to every command invocation.
pub struct Bot;

pub type CommandContext<'a> = poise::Context<'a, Bot, ErrReport>;

async fn event_handler(
    _ctx: &serenity::Context,
    event: &poise::Event<'_>,
    _framework: poise::FrameworkContext<'_, Bot, ErrReport>,
    _bot: &Bot,
) -> Result<()> {
    match event {
        poise::Event::Ready {
            data_about_bot: ready,
        } => {
            info!("{} connected successfully", ready.user.name);
        }
        poise::Event::Resume { event: _ } => {
            info!("Gateway session resumed");
        }
        _ => {}
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Bot, ErrReport>) {
    match error {
        poise::FrameworkError::Command { error, ctx } => {
            error!("Command '{}' failed: {error}", ctx.command().name);
            if let Err(e) = ctx.say(translate(ctx.guild_id(), "ERROR_GENERIC")).await {
                error!("Failed to send error response: {e}");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

pub async fn run(token: &str) -> Result<()> {
    let intents = serenity::GatewayIntents::non_privileged();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::commands(),
            event_handler: |ctx, event, framework, bot| {
                Box::pin(event_handler(ctx, event, framework, bot))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .token(token)
        .intents(intents)
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                if let Some(guild_id) = config::testing_guild() {
                    info!("Setting up slash commands for testing guild {guild_id}");
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        guild_id,
                    )
                    .await?;
                } else {
                    info!("Setting up global slash commands");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }
                Ok(Bot)
            })
        });

    framework.run().await?;

    Ok(())
}
