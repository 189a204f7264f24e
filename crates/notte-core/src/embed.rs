//! Platform-neutral rich message view models.
//!
//! An [`Embed`] mirrors what chat platforms render as a card: a title, an
//! optional link, a body, named fields, and a footer. Hosts translate it to
//! their own format; [`fmt::Display`] gives a plain-text rendering for
//! terminals and logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named block of text inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field heading.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether hosts may lay this field out beside its neighbours.
    pub inline: bool,
}

/// A rich card attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Card title.
    pub title: Option<String>,
    /// Link target of the title.
    pub url: Option<String>,
    /// Main body text.
    pub description: Option<String>,
    /// Accent colour as `0xRRGGBB`.
    pub color: Option<u32>,
    /// Small header line above the title.
    pub author: Option<String>,
    /// Small trailer line below the body.
    pub footer: Option<String>,
    /// URL of a large image.
    pub image: Option<String>,
    /// Named fields.
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// An empty embed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the title link.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the body text. Blank text leaves the body unset.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.trim().is_empty() {
            self.description = Some(description);
        }
        self
    }

    /// Set the accent colour.
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the author line.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the footer line.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Set the image URL.
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Append a field. Blank values are skipped.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.fields.push(EmbedField {
                name: name.into(),
                value,
                inline,
            });
        }
        self
    }

    /// True when the embed carries nothing a host could display.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.fields.is_empty()
    }
}

impl fmt::Display for Embed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        if let Some(author) = &self.author {
            lines.push(author.clone());
        }
        match (&self.title, &self.url) {
            (Some(title), Some(url)) => lines.push(format!("{title} <{url}>")),
            (Some(title), None) => lines.push(title.clone()),
            (None, Some(url)) => lines.push(format!("<{url}>")),
            (None, None) => {}
        }
        if let Some(description) = &self.description {
            lines.push(description.clone());
        }
        for field in &self.fields {
            lines.push(format!("{}: {}", field.name, field.value));
        }
        if let Some(image) = &self.image {
            lines.push(format!("[image] {image}"));
        }
        if let Some(footer) = &self.footer {
            lines.push(format!("-- {footer}"));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

/// An outgoing message: optional text plus any number of embeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Plain text content.
    pub content: Option<String>,
    /// Rich cards.
    pub embeds: Vec<Embed>,
}

impl Message {
    /// A plain text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Vec::new(),
        }
    }

    /// A message carrying a single embed.
    pub fn embed(embed: Embed) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }

    /// Attach an embed.
    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(content) = &self.content {
            parts.push(content.clone());
        }
        parts.extend(self.embeds.iter().map(|e| e.to_string()));
        write!(f, "{}", parts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_embed() {
        assert!(Embed::new().is_empty());
        assert!(Embed::new().color(0xFF0000).is_empty());
        assert!(!Embed::new().title("x").is_empty());
        assert!(Embed::new().description("   ").is_empty());
    }

    #[test]
    fn blank_fields_skipped() {
        let e = Embed::new().field("A", "", false).field("B", "b", true);
        assert_eq!(e.fields.len(), 1);
        assert_eq!(e.fields[0].name, "B");
    }

    #[test]
    fn display_plain_text() {
        let e = Embed::new()
            .title("Gala Leonidas")
            .url("https://example.com")
            .description("5★ Shadow Sword")
            .field("Skills", "Dark Fervor", false)
            .footer("Gala");
        assert_eq!(
            e.to_string(),
            "Gala Leonidas <https://example.com>\n5★ Shadow Sword\nSkills: Dark Fervor\n-- Gala"
        );
    }

    #[test]
    fn message_display_joins_parts() {
        let m = Message::text("hello").with_embed(Embed::new().title("T"));
        assert_eq!(m.to_string(), "hello\n\nT");
    }
}
