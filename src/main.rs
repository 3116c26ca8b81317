mod bot;
mod commands;
mod config;
mod embed;
mod languages;

use color_eyre::Result;
use tracing::instrument;

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let token = config::discord_token()?;
    bot::run(&token).await
}
