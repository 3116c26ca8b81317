use color_eyre::eyre::ErrReport;

use crate::bot::Bot;

mod avatar;
mod ping;

/// Every slash command the bot registers.
pub fn commands() -> Vec<poise::Command<Bot, ErrReport>> {
    vec![avatar::avatar(), ping::ping()]
}
