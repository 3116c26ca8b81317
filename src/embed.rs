use chrono::{DateTime, SecondsFormat, Utc};
use color_eyre::Result;
use poise::serenity_prelude as serenity;
use rand::Rng;

/// Discord's documented embed limits.
mod limits {
    pub const TITLE: usize = 256;
    pub const DESCRIPTION: usize = 2048;
    pub const FIELD_NAME: usize = 256;
    pub const FIELD_VALUE: usize = 1024;
    pub const FOOTER_TEXT: usize = 2048;
    pub const AUTHOR_NAME: usize = 256;
    pub const FIELDS: usize = 25;
    pub const TOTAL: usize = 6000;
}

const DEFAULT_COLOR: u32 = 0x41_EBF4;

// Discord renders an empty field as an error, a zero-width space as a blank.
const BLANK: &str = "\u{200B}";

const AUTHOR_ICON_SIZE: u16 = 128;
const IMAGE_SIZE: u16 = 2048;

/// Either a ready-made URL or a user to derive one from.
pub enum ImageSource<'a> {
    Url(String),
    User(&'a serenity::User),
}

impl From<&str> for ImageSource<'_> {
    fn from(url: &str) -> Self {
        Self::Url(url.to_owned())
    }
}

impl From<String> for ImageSource<'_> {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl<'a> From<&'a serenity::User> for ImageSource<'a> {
    fn from(user: &'a serenity::User) -> Self {
        Self::User(user)
    }
}

impl ImageSource<'_> {
    fn resolve(&self, size: u16) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::User(user) => {
                avatar_url(user.id.0, user.discriminator, user.avatar.as_deref(), size)
            }
        }
    }
}

/// Derive a CDN avatar URL for a user. Animated avatars (hash prefixed with
/// `a_`) resolve to a gif; a user without an avatar hash falls back to one of
/// the five default avatars rather than failing.
pub fn avatar_url(user_id: u64, discriminator: u16, avatar: Option<&str>, size: u16) -> String {
    match avatar {
        Some(hash) => {
            let ext = if hash.starts_with("a_") { "gif" } else { "webp" };
            format!("https://cdn.discordapp.com/avatars/{user_id}/{hash}.{ext}?size={size}")
        }
        None => format!(
            "https://cdn.discordapp.com/embed/avatars/{}.png",
            discriminator % 5
        ),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Clone, Debug)]
pub struct EmbedFile {
    pub data: Vec<u8>,
    pub name: String,
}

/// Incrementally builds a rich-message payload while keeping it inside
/// Discord's embed limits: each text field is truncated against its own cap,
/// and everything counts against the shared 6000-character budget.
///
/// One instance per outgoing message; build it up with chained setters, then
/// hand it to [`Embed::build`] when constructing the reply.
#[derive(Clone, Debug)]
pub struct Embed {
    pub color: u32,
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub author: Option<EmbedAuthor>,
    pub footer: Option<EmbedFooter>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub fields: Vec<EmbedField>,
    pub timestamp: Option<String>,
    pub file: Option<EmbedFile>,
    current_total: usize,
    enforce_limits: bool,
}

impl Default for Embed {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            title: None,
            url: None,
            description: None,
            author: None,
            footer: None,
            image: None,
            thumbnail: None,
            fields: Vec::new(),
            timestamp: None,
            file: None,
            current_total: 0,
            enforce_limits: true,
        }
    }
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    /// An embed that skips all truncation and budget accounting. The caller
    /// takes responsibility for staying inside Discord's limits.
    pub fn without_limits() -> Self {
        Self {
            enforce_limits: false,
            ..Self::default()
        }
    }

    /// Characters committed so far against the 6000-character budget.
    pub fn current_total(&self) -> usize {
        self.current_total
    }

    /// Fit `data` into its field: cut to the field's own `max` first, then to
    /// whatever is left of the global budget. Once the budget is spent this
    /// returns an empty string. Counts are in characters, not bytes.
    fn fit_data(&mut self, data: &str, max: usize) -> String {
        if !self.enforce_limits {
            return data.to_owned();
        }

        let mut data: String = if data.chars().count() > max {
            data.chars().take(max).collect()
        } else {
            data.to_owned()
        };

        let available = limits::TOTAL - self.current_total;
        if available == 0 {
            return String::new();
        }
        if data.chars().count() > available {
            data = data.chars().take(available).collect();
        }

        self.current_total += data.chars().count();
        data
    }

    /// Set the author block. The icon is either a literal URL or a user whose
    /// avatar URL gets derived; without an icon source the author is left
    /// unset.
    pub fn set_author(
        &mut self,
        name: &str,
        icon: Option<ImageSource<'_>>,
        url: Option<&str>,
    ) -> &mut Self {
        let name = self.fit_data(name, limits::AUTHOR_NAME);
        if let Some(icon) = icon {
            self.author = Some(EmbedAuthor {
                name,
                icon_url: Some(icon.resolve(AUTHOR_ICON_SIZE)),
                url: url.map(ToOwned::to_owned),
            });
        }
        self
    }

    /// Set the accent color from either the literal `random` or a hex string
    /// with an optional leading `#`. A malformed hex string is an error.
    pub fn set_color(&mut self, color: &str) -> Result<&mut Self> {
        self.color = if color.eq_ignore_ascii_case("random") {
            rand::thread_rng().gen_range(0..=0xFF_FFFF)
        } else {
            u32::from_str_radix(color.trim_start_matches('#'), 16)?
        };
        Ok(self)
    }

    pub fn set_description(&mut self, description: &str) -> &mut Self {
        self.description = Some(self.fit_data(description, limits::DESCRIPTION));
        self
    }

    /// Join lines with newlines and store them as the description.
    pub fn set_description_lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let description = lines
            .into_iter()
            .map(|line| line.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\n");
        self.set_description(&description)
    }

    /// Append a field. Once 25 fields are present this silently drops the
    /// new field; callers that care must check `fields.len()` themselves.
    pub fn add_field(&mut self, name: &str, value: &str, inline: bool) -> &mut Self {
        if self.fields.len() >= limits::FIELDS {
            return self;
        }

        let name = self.fit_data(name, limits::FIELD_NAME);
        let value = self.fit_data(value, limits::FIELD_VALUE);
        self.fields.push(EmbedField {
            name,
            value,
            inline,
        });
        self
    }

    pub fn add_blank_field(&mut self, inline: bool) -> &mut Self {
        self.add_field(BLANK, BLANK, inline)
    }

    /// Attach a file to the message and point the embed image at it, so the
    /// preview shows the upload instead of a remote URL.
    pub fn attach_file(&mut self, data: Vec<u8>, name: &str) -> &mut Self {
        self.file = Some(EmbedFile {
            data,
            name: name.to_owned(),
        });
        self.set_image(ImageSource::Url(format!("attachment://{name}")))
    }

    pub fn set_footer(&mut self, text: &str, icon_url: Option<&str>) -> &mut Self {
        self.footer = Some(EmbedFooter {
            text: self.fit_data(text, limits::FOOTER_TEXT),
            icon_url: icon_url.map(ToOwned::to_owned),
        });
        self
    }

    /// Set the embed image to a literal URL or a user's full-size avatar.
    pub fn set_image(&mut self, source: ImageSource<'_>) -> &mut Self {
        self.image = Some(source.resolve(IMAGE_SIZE));
        self
    }

    /// Record a timestamp, defaulting to the time of the call.
    pub fn set_timestamp(&mut self, time: Option<DateTime<Utc>>) -> &mut Self {
        let time = time.unwrap_or_else(Utc::now);
        self.timestamp = Some(time.to_rfc3339_opts(SecondsFormat::Millis, true));
        self
    }

    pub fn set_title(&mut self, title: &str, url: Option<&str>) -> &mut Self {
        self.title = Some(self.fit_data(title, limits::TITLE));
        if let Some(url) = url {
            self.url = Some(url.to_owned());
        }
        self
    }

    pub fn set_thumbnail(&mut self, url: &str) -> &mut Self {
        self.thumbnail = Some(url.to_owned());
        self
    }

    /// Map the accumulated state onto serenity's embed builder.
    pub fn build<'a>(
        &self,
        e: &'a mut serenity::CreateEmbed,
    ) -> &'a mut serenity::CreateEmbed {
        e.color(self.color);
        if let Some(title) = &self.title {
            e.title(title);
        }
        if let Some(url) = &self.url {
            e.url(url);
        }
        if let Some(description) = &self.description {
            e.description(description);
        }
        if let Some(author) = &self.author {
            e.author(|a| {
                a.name(&author.name);
                if let Some(icon_url) = &author.icon_url {
                    a.icon_url(icon_url);
                }
                if let Some(url) = &author.url {
                    a.url(url);
                }
                a
            });
        }
        if let Some(footer) = &self.footer {
            e.footer(|f| {
                f.text(&footer.text);
                if let Some(icon_url) = &footer.icon_url {
                    f.icon_url(icon_url);
                }
                f
            });
        }
        if let Some(image) = &self.image {
            e.image(image);
        }
        if let Some(thumbnail) = &self.thumbnail {
            e.thumbnail(thumbnail);
        }
        for field in &self.fields {
            e.field(&field.name, &field.value, field.inline);
        }
        if let Some(timestamp) = &self.timestamp {
            if let Ok(timestamp) = serenity::Timestamp::parse(timestamp) {
                e.timestamp(timestamp);
            }
        }
        e
    }

    /// The attached file, if any, ready to go on the outgoing reply.
    pub fn attachment(&self) -> Option<serenity::AttachmentType<'_>> {
        self.file.as_ref().map(|file| serenity::AttachmentType::Bytes {
            data: file.data.as_slice().into(),
            filename: file.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_title_is_cut_to_exactly_the_limit() {
        let mut embed = Embed::new();
        embed.set_title(&"x".repeat(300), None);
        assert_eq!(embed.title.as_ref().unwrap().chars().count(), 256);
        assert_eq!(embed.current_total(), 256);
    }

    #[test]
    fn title_url_only_stored_when_given() {
        let mut embed = Embed::new();
        embed.set_title("hello", None);
        assert_eq!(embed.url, None);
        embed.set_title("hello", Some("https://example.com"));
        assert_eq!(embed.url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn field_caps_apply_before_the_global_budget() {
        // Room for 100 characters left; a 300-character title is first cut to
        // the 256 field cap, then to the remaining budget.
        let mut embed = Embed::new();
        for _ in 0..5 {
            embed.add_field(&"n".repeat(256), &"v".repeat(924), false);
        }
        assert_eq!(embed.current_total(), 5900);
        embed.set_title(&"x".repeat(300), None);
        assert_eq!(embed.title.as_ref().unwrap().chars().count(), 100);
        assert_eq!(embed.current_total(), 6000);
    }

    #[test]
    fn exhausted_budget_yields_empty_strings() {
        let mut embed = Embed::new();
        embed.set_description(&"d".repeat(2048));
        embed.add_field(&"n".repeat(256), &"v".repeat(1024), false);
        embed.set_title(&"t".repeat(300), None);
        embed.set_author(&"a".repeat(400), Some("https://i.example".into()), None);
        assert_eq!(embed.author.as_ref().unwrap().name.chars().count(), 256);
        embed.set_footer(&"f".repeat(2048), None);
        assert_eq!(embed.current_total(), 5888);
        // 112 left; an oversized footer is cut to exactly fill the budget.
        embed.set_footer(&"f".repeat(200), None);
        assert_eq!(embed.footer.as_ref().unwrap().text.chars().count(), 112);
        assert_eq!(embed.current_total(), 6000);
        // Nothing fits any more.
        embed.set_description("more");
        assert_eq!(embed.description.as_deref(), Some(""));
    }

    #[test]
    fn twenty_sixth_field_is_silently_dropped() {
        let mut embed = Embed::new();
        for i in 0..26 {
            embed.add_field(&format!("field {i}"), "value", false);
        }
        assert_eq!(embed.fields.len(), 25);
        assert_eq!(embed.fields.last().unwrap().name, "field 24");
    }

    #[test]
    fn blank_field_uses_zero_width_spaces() {
        let mut embed = Embed::new();
        embed.add_blank_field(true);
        assert_eq!(embed.fields[0].name, "\u{200B}");
        assert_eq!(embed.fields[0].value, "\u{200B}");
        assert!(embed.fields[0].inline);
    }

    #[test]
    fn hex_color_parses_with_and_without_hash() {
        let mut embed = Embed::new();
        embed.set_color("#FF00FF").unwrap();
        assert_eq!(embed.color, 16_711_935);
        embed.set_color("41ebf4").unwrap();
        assert_eq!(embed.color, 0x41_EBF4);
    }

    #[test]
    fn malformed_color_is_an_error() {
        let mut embed = Embed::new();
        assert!(embed.set_color("not a color").is_err());
    }

    #[test]
    fn random_color_stays_in_the_rgb_range_and_varies() {
        let mut embed = Embed::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            embed.set_color("RANDOM").unwrap();
            assert!(embed.color <= 0xFF_FFFF);
            seen.insert(embed.color);
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn without_limits_stores_text_unmodified() {
        let long = "y".repeat(10_000);
        let mut embed = Embed::without_limits();
        embed.set_description(&long);
        assert_eq!(embed.description.as_deref(), Some(long.as_str()));
        assert_eq!(embed.current_total(), 0);
    }

    #[test]
    fn description_lines_join_with_newlines() {
        let mut embed = Embed::new();
        embed.set_description_lines(["one", "two", "three"]);
        assert_eq!(embed.description.as_deref(), Some("one\ntwo\nthree"));
        assert_eq!(embed.current_total(), 13);
    }

    #[test]
    fn budget_is_cumulative_across_calls() {
        let mut embed = Embed::new();
        embed.set_title(&"x".repeat(300), None);
        assert_eq!(embed.title.as_ref().unwrap().chars().count(), 256);

        for _ in 0..25 {
            embed.add_field(&"n".repeat(130), &"v".repeat(97), false);
        }
        assert_eq!(embed.fields.len(), 25);
        embed.add_field("dropped", "dropped", false);
        assert_eq!(embed.fields.len(), 25);
        assert_eq!(embed.current_total(), 5931);

        embed.set_footer(&"f".repeat(19), None);
        assert_eq!(embed.current_total(), 5950);

        // 50 characters left out of 6000; the description is cut to fit.
        embed.set_description(&"y".repeat(100));
        assert_eq!(embed.description.as_ref().unwrap().chars().count(), 50);
        assert_eq!(embed.current_total(), 6000);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let mut embed = Embed::new();
        embed.set_title(&"é".repeat(300), None);
        assert_eq!(embed.title.as_ref().unwrap().chars().count(), 256);
        assert_eq!(embed.current_total(), 256);
    }

    #[test]
    fn attaching_a_file_rewrites_the_image() {
        let mut embed = Embed::new();
        embed.set_image("https://example.com/remote.png".into());
        embed.attach_file(vec![1, 2, 3], "pic.png");
        assert_eq!(embed.image.as_deref(), Some("attachment://pic.png"));
        assert!(embed.attachment().is_some());
    }

    #[test]
    fn author_is_unset_without_an_icon_source() {
        let mut embed = Embed::new();
        embed.set_author("someone", None, None);
        assert!(embed.author.is_none());
    }

    #[test]
    fn thumbnail_carries_no_character_cost() {
        let mut embed = Embed::new();
        embed.set_thumbnail("https://example.com/thumb.png");
        assert_eq!(embed.current_total(), 0);
    }

    #[test]
    fn timestamp_serializes_as_iso_8601() {
        use chrono::TimeZone;

        let mut embed = Embed::new();
        let time = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        embed.set_timestamp(Some(time));
        assert_eq!(embed.timestamp.as_deref(), Some("2023-01-02T03:04:05.000Z"));
    }

    #[test]
    fn avatar_urls_handle_animated_and_missing_hashes() {
        assert_eq!(
            avatar_url(123, 4567, Some("abc"), 2048),
            "https://cdn.discordapp.com/avatars/123/abc.webp?size=2048"
        );
        assert_eq!(
            avatar_url(123, 4567, Some("a_abc"), 128),
            "https://cdn.discordapp.com/avatars/123/a_abc.gif?size=128"
        );
        // No avatar hash falls back to a default avatar instead of panicking.
        assert_eq!(
            avatar_url(123, 4567, None, 128),
            "https://cdn.discordapp.com/embed/avatars/2.png"
        );
    }
}
