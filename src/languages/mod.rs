use std::{collections::HashMap, sync::RwLock};

use lazy_static::lazy_static;
use poise::serenity_prelude as serenity;
use tracing::warn;

mod english;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    English,
}

impl Language {
    fn strings(self) -> &'static HashMap<&'static str, &'static str> {
        match self {
            Self::English => &english::STRINGS,
        }
    }
}

lazy_static! {
    static ref GUILD_LANGUAGES: RwLock<HashMap<serenity::GuildId, Language>> =
        RwLock::new(HashMap::new());
}

/// Set the language used for a guild's responses.
pub fn set_language(guild_id: serenity::GuildId, language: Language) {
    if let Ok(mut languages) = GUILD_LANGUAGES.write() {
        languages.insert(guild_id, language);
    }
}

fn language_for(guild_id: Option<serenity::GuildId>) -> Language {
    guild_id
        .and_then(|id| GUILD_LANGUAGES.read().ok()?.get(&id).copied())
        .unwrap_or(Language::English)
}

/// Look up a response string in the guild's configured language, falling back
/// to English. An unknown key is echoed back so a missing translation shows
/// up in the response instead of silently breaking it.
pub fn translate(guild_id: Option<serenity::GuildId>, key: &str) -> String {
    let language = language_for(guild_id);
    match language.strings().get(key) {
        Some(text) => (*text).to_owned(),
        None => {
            warn!("Missing translation for key '{key}'");
            key.to_owned()
        }
    }
}
